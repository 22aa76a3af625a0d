//! nas - 5GS NAS (TS24.501) information element codec, 5GMM / 5GSM messages, EAP and the NAS security envelope

mod bcd;
pub mod eap;
mod error;
mod header;
pub mod ie;
pub mod message;
mod security_context;

pub use error::*;
pub use header::*;
pub use message::{MmMessage, PlainNasMessage, SmHeader, SmMessage};
pub use security_context::*;

