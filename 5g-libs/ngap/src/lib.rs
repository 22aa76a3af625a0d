//! ngap - NGAP style container of ordered (id, criticality, value) IEs, carrying the NAS PDUs
//! exchanged between a UE simulator and an AMF.  The framing is a simple length prefixed
//! stand in for APER.

mod error;
mod extract;
mod ies;
mod messages;
mod pdu;

pub use error::NgapError;
pub use ies::*;
pub use messages::*;
pub use pdu::*;
