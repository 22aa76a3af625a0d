use crate::{Direction, snow3g, zuc};
use aes::Aes128;
use ctr::cipher::{KeyIvInit, StreamCipher};
use num_enum::{IntoPrimitive, TryFromPrimitive};

type Aes128Ctr = ctr::Ctr128BE<Aes128>;

/// Ciphering algorithm identities (TS33.501, 5.11.1.1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum CipheringAlgorithm {
    Nea0 = 0,
    Nea1 = 1,
    Nea2 = 2,
    Nea3 = 3,
}

/// Ciphers or deciphers `data` in place.
pub fn apply_cipher(
    algorithm: CipheringAlgorithm,
    key: &[u8; 16],
    count: u32,
    bearer: u8,
    direction: Direction,
    data: &mut [u8],
) {
    let direction = direction as u8;
    match algorithm {
        CipheringAlgorithm::Nea0 => (),
        CipheringAlgorithm::Nea1 => snow3g::f8(key, count, bearer, direction, data),
        CipheringAlgorithm::Nea2 => nea2(key, count, bearer, direction, data),
        CipheringAlgorithm::Nea3 => zuc::eea3(key, count, bearer, direction, data),
    }
}

// TS33.401, B.1.3: AES-128 in counter mode.  The initial counter block is
// COUNT || BEARER || DIRECTION || 0^26 || 0^64.
fn nea2(key: &[u8; 16], count: u32, bearer: u8, direction: u8, data: &mut [u8]) {
    let iv = ((count as u128) << 96)
        | (((bearer & 0x1f) as u128) << 91)
        | (((direction & 1) as u128) << 90);
    let mut cipher = Aes128Ctr::new(key.into(), &iv.to_be_bytes().into());
    cipher.apply_keystream(data);
}
