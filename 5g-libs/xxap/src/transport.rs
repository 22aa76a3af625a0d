use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Transport closed")]
    Closed,

    #[error("Transport aborted")]
    Aborted,

    #[error("No such stream {0}")]
    NoSuchStream(u16),

    #[error("Transport failure - {0}")]
    Other(String),
}

/// Receives each message that arrives on a transport.
#[async_trait]
pub trait TransportHandler: Send + Sync {
    async fn handle(&self, stream: u16, bytes: Vec<u8>);
}

/// An ordered, reliable, multi-stream message transport.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn start(&self) -> Result<(), TransportError>;

    async fn send(&self, stream: u16, bytes: Vec<u8>) -> Result<(), TransportError>;

    /// Passes each received message to `handler` until the peer closes (`Closed`) or
    /// [`abort`](Self::abort) is called (`Aborted`).
    async fn receive_loop<H: TransportHandler>(&self, handler: &H) -> Result<(), TransportError>;

    /// Graceful close.  The peer's receive loop ends with `Closed`.
    fn close(&self);

    /// Makes any pending receive return `Aborted` straight away.
    fn abort(&self);

    fn is_open(&self) -> bool;
}
