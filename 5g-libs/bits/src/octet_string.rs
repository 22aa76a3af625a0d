use crate::{BitString, BitsError};
use std::fmt;

/// Fixed length, immutable sequence of octets.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct OctetString(Vec<u8>);

impl OctetString {
    pub fn new(octets: Vec<u8>) -> Self {
        OctetString(octets)
    }

    pub fn from_hex(s: &str) -> Result<Self, BitsError> {
        let octets = hex::decode(s).map_err(|_| BitsError::InvalidHex(s.to_string()))?;
        Ok(OctetString(octets))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<u8, BitsError> {
        self.0.get(index).copied().ok_or(BitsError::OutOfRange {
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
        Ok(OctetString(self.0[start..end].to_vec()))
    }

    pub fn concat(&self, other: &OctetString) -> Self {
        OctetString([self.0.as_slice(), other.0.as_slice()].concat())
    }

    pub fn xor(&self, other: &OctetString) -> Result<Self, BitsError> {
        if self.len() != other.len() {
            return Err(BitsError::LengthMismatch {
                left: self.len(),
                right: other.len(),
            });
        }
        Ok(OctetString(
            self.0.iter().zip(other.0.iter()).map(|(a, b)| a ^ b).collect(),
        ))
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    pub fn to_bit_string(&self) -> BitString {
        BitString::from_octets(&self.0)
    }
}

impl From<Vec<u8>> for OctetString {
    fn from(octets: Vec<u8>) -> Self {
        OctetString(octets)
    }
}

impl From<&[u8]> for OctetString {
    fn from(octets: &[u8]) -> Self {
        OctetString(octets.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for OctetString {
    fn from(octets: [u8; N]) -> Self {
        OctetString(octets.to_vec())
    }
}

impl AsRef<[u8]> for OctetString {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for OctetString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OctetString({})", self.to_hex())
    }
}

impl fmt::Display for OctetString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
