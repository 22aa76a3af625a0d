//! xxap - the transport seam beneath an NGAP style application protocol, and an in-memory
//! implementation of it

mod channel_transport;
mod transport;

pub use channel_transport::ChannelTransport;
pub use transport::{Transport, TransportError, TransportHandler};
