use crate::{Bits, BitsError};

/// Output octet sink.  Half octets are paired low nibble first.
#[derive(Default, Debug)]
pub struct OctetWriter {
    buf: Vec<u8>,
    pending_low_nibble: Option<u8>,
}

impl OctetWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn has_pending_half_octet(&self) -> bool {
        self.pending_low_nibble.is_some()
    }

    pub fn write_octet(&mut self, octet: u8) {
        self.buf.push(octet)
    }

    pub fn write_octets(&mut self, octets: &[u8]) {
        self.buf.extend_from_slice(octets)
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_be_bytes())
    }

    pub fn write_bits<const W: u8>(&mut self, value: Bits<W>) {
        self.buf.extend_from_slice(&value.to_be_octets())
    }

    pub fn write_half_octet(&mut self, nibble: u8) {
        let nibble = nibble & 0x0f;
        match self.pending_low_nibble.take() {
            None => self.pending_low_nibble = Some(nibble),
            Some(low) => self.buf.push((nibble << 4) | low),
        }
    }

    pub fn into_octets(self) -> Result<Vec<u8>, BitsError> {
        if self.pending_low_nibble.is_some() {
            return Err(BitsError::DanglingHalfOctet);
        }
        Ok(self.buf)
    }
}
