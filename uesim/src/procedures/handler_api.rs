use async_trait::async_trait;
use ngap::NgapPdu;
use xxap::TransportError;

/// Trait representing the collection of services needed by UE sessions.
#[async_trait]
pub trait HandlerApi: Send + Sync + Clone + 'static {
    async fn send_ngap(&self, pdu: NgapPdu) -> Result<(), TransportError>;

    fn delete_ue_channel(&self, ran_ue_ngap_id: u32);

    /// Why the transport went down, once it has.
    fn transport_error(&self) -> Option<TransportError>;
}
