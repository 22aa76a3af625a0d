use crate::{Bits, BitsError};

/// Cursor over an input octet buffer.  Half octets are consumed low nibble first.
pub struct OctetReader<'a> {
    data: &'a [u8],
    offset: usize,
    pending_high_nibble: Option<u8>,
}

impl<'a> OctetReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        OctetReader {
            data,
            offset: 0,
            pending_high_nibble: None,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn has_pending_half_octet(&self) -> bool {
        self.pending_high_nibble.is_some()
    }

    pub fn peek_octet(&self) -> Option<u8> {
        self.data.get(self.offset).copied()
    }

    pub fn read_octet(&mut self) -> Result<u8, BitsError> {
        let octet = self.peek_octet().ok_or(self.truncated(1))?;
        self.offset += 1;
        Ok(octet)
    }

    pub fn read_octets(&mut self, n: usize) -> Result<&'a [u8], BitsError> {
        if n > self.remaining() {
            return Err(self.truncated(n));
        }
        let data = self.data;
        let octets = &data[self.offset..self.offset + n];
        self.offset += n;
        Ok(octets)
    }

    pub fn read_u16(&mut self) -> Result<u16, BitsError> {
        let octets = self.read_octets(2)?;
        Ok(u16::from_be_bytes([octets[0], octets[1]]))
    }

    /// Reads a big endian value occupying `ceil(W/8)` octets.
    pub fn read_bits<const W: u8>(&mut self) -> Result<Bits<W>, BitsError> {
        let octets = self.read_octets(Bits::<W>::OCTETS)?;
        Bits::from_be_octets(octets)
    }

    /// The first call returns the low nibble of the next octet, the second its high nibble.
    pub fn read_half_octet(&mut self) -> Result<u8, BitsError> {
        if let Some(high) = self.pending_high_nibble.take() {
            return Ok(high);
        }
        let octet = self.read_octet()?;
        self.pending_high_nibble = Some(octet >> 4);
        Ok(octet & 0x0f)
    }

    /// Consumes everything left.
    pub fn read_rest(&mut self) -> &'a [u8] {
        let data = self.data;
        let rest = &data[self.offset..];
        self.offset = data.len();
        rest
    }

    fn truncated(&self, needed: usize) -> BitsError {
        BitsError::Truncated {
            offset: self.offset,
            needed,
            remaining: self.remaining(),
        }
    }
}
