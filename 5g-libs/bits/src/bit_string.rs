use crate::BitsError;
use bitvec::prelude::*;
use std::fmt;

/// Fixed length, immutable sequence of bits, most significant bit first.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct BitString(BitVec<u8, Msb0>);

impl BitString {
    pub fn from_octets(octets: &[u8]) -> Self {
        BitString(BitVec::from_slice(octets))
    }

    /// Takes the first `bit_len` bits of `octets`.
    pub fn from_octets_with_len(octets: &[u8], bit_len: usize) -> Result<Self, BitsError> {
        let available = octets.len() * 8;
        if bit_len > available {
            return Err(BitsError::OutOfRange {
                index: bit_len,
                len: available,
            });
        }
        let mut bits = BitVec::from_slice(octets);
        bits.truncate(bit_len);
        Ok(BitString(bits))
    }

    pub fn from_hex(s: &str) -> Result<Self, BitsError> {
        let octets = hex::decode(s).map_err(|_| BitsError::InvalidHex(s.to_string()))?;
        Ok(Self::from_octets(&octets))
    }

    /// Hex of the zero-padded octets.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_octets())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn bit(&self, index: usize) -> Result<bool, BitsError> {
        self.0
            .get(index)
            .map(|b| *b)
            .ok_or(BitsError::OutOfRange {
                index,
                len: self.len(),
            })
    }

    pub fn substring(&self, start: usize, len: usize) -> Result<Self, BitsError> {
        let end = start.saturating_add(len);
        if end > self.len() {
            return Err(BitsError::OutOfRange {
                index: end,
                len: self.len(),
            });
        }
        Ok(BitString(self.0[start..end].to_bitvec()))
    }

    pub fn concat(&self, other: &BitString) -> Self {
        let mut bits = self.0.clone();
        bits.extend_from_bitslice(&other.0);
        BitString(bits)
    }

    pub fn xor(&self, other: &BitString) -> Result<Self, BitsError> {
        if self.len() != other.len() {
            return Err(BitsError::LengthMismatch {
                left: self.len(),
                right: other.len(),
            });
        }
        Ok(BitString(
            self.0
                .iter()
                .by_vals()
                .zip(other.0.iter().by_vals())
                .map(|(a, b)| a ^ b)
                .collect(),
        ))
    }

    /// The bits packed into octets, with the final octet padded with zero bits.
    pub fn to_octets(&self) -> Vec<u8> {
        self.0
            .chunks(8)
            .map(|chunk| {
                chunk
                    .iter()
                    .by_vals()
                    .enumerate()
                    .fold(0u8, |acc, (i, bit)| if bit { acc | (0x80 >> i) } else { acc })
            })
            .collect()
    }

    pub fn as_bitslice(&self) -> &BitSlice<u8, Msb0> {
        &self.0
    }
}

impl From<&[u8]> for BitString {
    fn from(octets: &[u8]) -> Self {
        Self::from_octets(octets)
    }
}

impl fmt::Debug for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitString({} bits, {})", self.len(), self.to_hex())
    }
}
