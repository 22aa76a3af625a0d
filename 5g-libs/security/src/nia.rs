use crate::{Direction, SecurityError, calculate_nia2_mac, snow3g, zuc};
use bitvec::prelude::*;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Integrity algorithm identities (TS33.501, 5.11.1.2).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum IntegrityAlgorithm {
    Nia0 = 0,
    Nia1 = 1,
    Nia2 = 2,
    Nia3 = 3,
}

/// Computes the 32-bit MAC of `message` (any number of bits) under the given algorithm.
///
/// NIA2 is defined over octet strings here, so a message that does not end on an octet
/// boundary is rejected for that algorithm.
pub fn compute_mac(
    algorithm: IntegrityAlgorithm,
    key: &[u8; 16],
    count: u32,
    bearer: u8,
    direction: Direction,
    message: &BitSlice<u8, Msb0>,
) -> Result<[u8; 4], SecurityError> {
    let direction = direction as u8;
    Ok(match algorithm {
        IntegrityAlgorithm::Nia0 => [0; 4],
        // TS33.401, B.2.2: FRESH is BEARER followed by 27 zero bits.
        IntegrityAlgorithm::Nia1 => {
            snow3g::f9(key, count, ((bearer & 0x1f) as u32) << 27, direction, message)
        }
        IntegrityAlgorithm::Nia2 => {
            if message.len() % 8 != 0 {
                return Err(SecurityError::UnalignedMessage("NIA2", message.len()));
            }
            let mut octets = message.to_bitvec();
            octets.force_align();
            calculate_nia2_mac(key, count, bearer, direction, octets.as_raw_slice())
        }
        IntegrityAlgorithm::Nia3 => zuc::eia3(key, count, bearer, direction, message),
    })
}
