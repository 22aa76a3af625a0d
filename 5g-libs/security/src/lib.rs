//! security - 5G NAS security: 5G-AKA and EAP-AKA', key derivation, and the NEA/NIA algorithm families

mod aka;
mod eap_aka;
mod error;
mod keygen;
mod nea;
mod nia;
mod nia2;
pub mod snow3g;
pub mod zuc;

pub use aka::*;
pub use eap_aka::*;
pub use error::*;
pub use keygen::*;
pub use nea::*;
pub use nia::*;
pub use nia2::calculate_nia2_mac;

// TS33.501, A.7.1: ABBA parameter value used on initial registration.
pub const NAS_ABBA: [u8; 2] = [0x00, 0x00];

/// NAS connection identifier used as the BEARER input for 3GPP access (TS33.501, 6.4.3.1).
pub const NAS_BEARER_3GPP: u8 = 0x01;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Direction {
    Uplink = 0,
    Downlink = 1,
}
