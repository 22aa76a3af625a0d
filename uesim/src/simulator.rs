use crate::procedures::{DeregistrationFlow, HandlerApi, Outcome, RegistrationFlow, UeSession};
use crate::{Profile, RegistrationInput, UeContext};
use anyhow::{Result, bail};
use async_channel::{Receiver, Sender};
use async_std::task::JoinHandle;
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use ngap::NgapPdu;
use slog::{Logger, info, o, warn};
use std::sync::{Arc, OnceLock};
use xxap::{Transport, TransportError, TransportHandler};

// Stream 0 is reserved for non UE-associated signalling.
const UE_ASSOCIATED_STREAM: u16 = 1;

type IdleUe = (UeContext, Receiver<NgapPdu>);

/// Runs UE sessions over one transport to the AMF.  Each UE has its own task and inbox, and
/// inbound PDUs are routed to the inbox by RAN-UE-NGAP-ID.
pub struct UeSimulator<T: Transport> {
    transport: Arc<T>,
    logger: Logger,
    ue_tasks: Arc<DashMap<u32, Sender<NgapPdu>>>,
    // Registered UEs that have no procedure running.
    idle_ues: Arc<DashMap<u32, IdleUe>>,
    transport_error: Arc<OnceLock<TransportError>>,
}

impl<T: Transport> Clone for UeSimulator<T> {
    fn clone(&self) -> Self {
        UeSimulator {
            transport: self.transport.clone(),
            logger: self.logger.clone(),
            ue_tasks: self.ue_tasks.clone(),
            idle_ues: self.idle_ues.clone(),
            transport_error: self.transport_error.clone(),
        }
    }
}

impl<T: Transport> UeSimulator<T> {
    pub async fn start(transport: T, logger: Logger) -> Result<Self> {
        transport.start().await?;
        let sim = UeSimulator {
            transport: Arc::new(transport),
            logger,
            ue_tasks: Arc::new(DashMap::new()),
            idle_ues: Arc::new(DashMap::new()),
            transport_error: Arc::new(OnceLock::new()),
        };

        let receiver = sim.clone();
        async_std::task::spawn(async move {
            let e = match receiver.transport.receive_loop(&receiver).await {
                Ok(()) => TransportError::Closed,
                Err(e) => e,
            };
            info!(receiver.logger, "Receive loop ended - {e}");
            receiver.transport_down(e);
        });

        Ok(sim)
    }

    /// Spawns a task that registers the UE described by `profile`.  Once registered the UE stays
    /// known to the simulator until it is deregistered.
    pub fn register(&self, profile: &Profile) -> Result<JoinHandle<Outcome>> {
        if let Some(e) = self.transport_error.get() {
            bail!("Can't register - {e}");
        }
        let input = RegistrationInput::try_from(profile)?;
        let ran_ue_ngap_id = input.ran_ue_ngap_id;
        if self.idle_ues.contains_key(&ran_ue_ngap_id) {
            bail!("UE {ran_ue_ngap_id} already registered");
        }

        let (sender, receiver) = async_channel::unbounded();
        match self.ue_tasks.entry(ran_ue_ngap_id) {
            Entry::Occupied(_) => bail!("RAN-UE-NGAP-ID {ran_ue_ngap_id} already in use"),
            Entry::Vacant(entry) => {
                entry.insert(sender);
            }
        }

        let logger = self.logger.new(o!("ue" => input.supi.clone()));
        info!(logger, "Register UE {}", ran_ue_ngap_id);
        let mut session = UeSession::new(UeContext::new(input), receiver, self.clone(), logger);
        let sim = self.clone();
        Ok(async_std::task::spawn(async move {
            let outcome = session.run(RegistrationFlow).await;
            if outcome == Outcome::Completed {
                sim.idle_ues.insert(ran_ue_ngap_id, session.into_parts());
            } else {
                sim.delete_ue_channel(ran_ue_ngap_id);
            }
            outcome
        }))
    }

    /// Runs a deregistration for a registered UE and forgets the UE, whatever the outcome.
    pub async fn deregister(&self, ran_ue_ngap_id: u32) -> Result<Outcome> {
        let Some((_, (ue, receiver))) = self.idle_ues.remove(&ran_ue_ngap_id) else {
            bail!("UE {ran_ue_ngap_id} is not registered");
        };
        let logger = self.logger.new(o!("ue" => ue.profile.supi.clone()));
        info!(logger, "Deregister UE {}", ran_ue_ngap_id);
        let mut session = UeSession::new(ue, receiver, self.clone(), logger);
        let outcome = session.run(DeregistrationFlow).await;
        self.delete_ue_channel(ran_ue_ngap_id);
        Ok(outcome)
    }

    pub fn is_registered(&self, ran_ue_ngap_id: u32) -> bool {
        self.idle_ues.contains_key(&ran_ue_ngap_id)
    }

    /// Tears down the transport.  Procedures in progress fail with "transport aborted".
    pub fn abort(&self) {
        info!(self.logger, "Aborting transport");
        self.transport_down(TransportError::Aborted);
        self.transport.abort();
    }

    pub fn close(&self) {
        info!(self.logger, "Closing transport");
        self.transport_down(TransportError::Closed);
        self.transport.close();
    }

    async fn dispatch_ue_message(&self, ran_ue_ngap_id: u32, pdu: NgapPdu) -> Result<()> {
        let Some(sender) = self.ue_tasks.get(&ran_ue_ngap_id).map(|s| s.clone()) else {
            bail!("UE {ran_ue_ngap_id} not found");
        };
        sender.send(pdu).await?;
        Ok(())
    }

    // The first reason recorded wins.  Dropping the senders closes every session's inbox.
    fn transport_down(&self, e: TransportError) {
        let _ = self.transport_error.set(e);
        self.ue_tasks.clear();
    }
}

#[async_trait]
impl<T: Transport> TransportHandler for UeSimulator<T> {
    async fn handle(&self, _stream: u16, bytes: Vec<u8>) {
        let pdu = match NgapPdu::from_bytes(&bytes) {
            Ok(pdu) => pdu,
            Err(e) => {
                warn!(self.logger, "Failed to decode NGAP PDU - {e}");
                return;
            }
        };
        let name = pdu.name();
        let Some(ran_ue_ngap_id) = pdu.ran_ue_ngap_id() else {
            warn!(self.logger, "Ignoring {name} with no RAN-UE-NGAP-ID");
            return;
        };
        if let Err(e) = self.dispatch_ue_message(ran_ue_ngap_id, pdu).await {
            warn!(self.logger, "Dropping {name} - {e}");
        }
    }
}

#[async_trait]
impl<T: Transport> HandlerApi for UeSimulator<T> {
    async fn send_ngap(&self, pdu: NgapPdu) -> Result<(), TransportError> {
        let bytes = pdu
            .to_bytes()
            .map_err(|e| TransportError::Other(e.to_string()))?;
        self.transport
            .send(UE_ASSOCIATED_STREAM, bytes)
            .await
            .map_err(|e| self.transport_error.get().cloned().unwrap_or(e))
    }

    fn delete_ue_channel(&self, ran_ue_ngap_id: u32) {
        self.ue_tasks.remove(&ran_ue_ngap_id);
    }

    fn transport_error(&self) -> Option<TransportError> {
        self.transport_error.get().cloned()
    }
}
