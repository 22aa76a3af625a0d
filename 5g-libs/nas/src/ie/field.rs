use super::{IeShape, InformationElement, RawIe};
use crate::{DecodeError, DecodeErrorKind, NasError};
use bits::{BitsError, OctetReader, OctetWriter};

/// Reads a message's IEs in field table order.
pub struct FieldDecoder<'a> {
    reader: OctetReader<'a>,
}

impl<'a> FieldDecoder<'a> {
    pub fn new(reader: OctetReader<'a>) -> Self {
        FieldDecoder { reader }
    }

    pub fn offset(&self) -> usize {
        self.reader.offset()
    }

    pub fn mandatory<T: InformationElement>(
        &mut self,
        name: &'static str,
    ) -> Result<T, DecodeError> {
        let start = self.reader.offset();
        let raw = match T::SHAPE {
            IeShape::HalfOctet => RawIe::Nibble(
                self.reader
                    .read_half_octet()
                    .map_err(|e| truncated(name, None, e))?,
            ),
            IeShape::TagOnly => RawIe::Present,
            shape => {
                self.check_aligned(name, None)?;
                RawIe::Octets(self.read_value(name, None, shape)?)
            }
        };
        T::from_raw(raw).map_err(|kind| DecodeError::new(name, start, kind))
    }

    /// Absent unless the next octet carries `iei`, in which case nothing is consumed.
    pub fn optional<T: InformationElement>(
        &mut self,
        name: &'static str,
        iei: u8,
    ) -> Result<Option<T>, DecodeError> {
        self.check_aligned(name, Some(iei))?;
        let Some(next) = self.reader.peek_octet() else {
            return Ok(None);
        };
        let start = self.reader.offset();
        let raw = match T::SHAPE {
            IeShape::HalfOctet => {
                if next & 0xf0 != iei {
                    return Ok(None);
                }
                self.skip(1);
                RawIe::Nibble(next & 0x0f)
            }
            shape => {
                if next != iei {
                    return Ok(None);
                }
                self.skip(1);
                if shape == IeShape::TagOnly {
                    RawIe::Present
                } else {
                    RawIe::Octets(self.read_value(name, Some(iei), shape)?)
                }
            }
        };
        T::from_raw(raw)
            .map(Some)
            .map_err(|kind| DecodeError::new(name, start, kind).with_iei(Some(iei)))
    }

    /// Skips any trailing IEs the message table does not know (TS24.007, 11.2.4) and checks
    /// that the message ends on an octet boundary.
    pub fn finish(mut self) -> Result<(), DecodeError> {
        self.check_aligned("end of message", None)?;
        while let Some(iei) = self.reader.peek_octet() {
            self.skip(1);
            let shape = if iei & 0x80 != 0 {
                continue;
            } else if iei & 0xf0 == 0x70 {
                IeShape::Lve {
                    min: 0,
                    max: u16::MAX as usize,
                }
            } else {
                IeShape::Lv {
                    min: 0,
                    max: u8::MAX as usize,
                }
            };
            self.read_value("unknown IE", Some(iei), shape)?;
        }
        Ok(())
    }

    fn skip(&mut self, n: usize) {
        let _ = self.reader.read_octets(n);
    }

    fn check_aligned(&self, name: &'static str, iei: Option<u8>) -> Result<(), DecodeError> {
        if self.reader.has_pending_half_octet() {
            Err(
                DecodeError::new(name, self.reader.offset(), DecodeErrorKind::MandatoryFieldOrder)
                    .with_iei(iei),
            )
        } else {
            Ok(())
        }
    }

    fn read_value(
        &mut self,
        name: &'static str,
        iei: Option<u8>,
        shape: IeShape,
    ) -> Result<Vec<u8>, DecodeError> {
        let (length, min, max) = match shape {
            IeShape::Fixed(n) => (n, n, n),
            IeShape::Lv { min, max } => (
                self.reader
                    .read_octet()
                    .map_err(|e| truncated(name, iei, e))? as usize,
                min,
                max,
            ),
            IeShape::Lve { min, max } => (
                self.reader
                    .read_u16()
                    .map_err(|e| truncated(name, iei, e))? as usize,
                min,
                max,
            ),
            IeShape::HalfOctet | IeShape::TagOnly => (0, 0, 0),
        };
        let value_offset = self.reader.offset();
        let value = self
            .reader
            .read_octets(length)
            .map_err(|e| truncated(name, iei, e))?;
        if length < min || length > max {
            return Err(DecodeError::new(
                name,
                value_offset,
                DecodeErrorKind::LengthOutOfRange { length, min, max },
            )
            .with_iei(iei));
        }
        Ok(value.to_vec())
    }
}

fn truncated(name: &'static str, iei: Option<u8>, e: BitsError) -> DecodeError {
    let (offset, kind) = match e {
        BitsError::Truncated {
            offset,
            needed,
            remaining,
        } => (
            offset,
            DecodeErrorKind::Truncated {
                expected: needed,
                actual: remaining,
            },
        ),
        other => (0, DecodeErrorKind::InvalidValue(other.to_string())),
    };
    DecodeError::new(name, offset, kind).with_iei(iei)
}

/// Writes a message's IEs; the mirror of [`FieldDecoder`].
#[derive(Default)]
pub struct FieldEncoder {
    writer: OctetWriter,
}

impl FieldEncoder {
    pub fn new(writer: OctetWriter) -> Self {
        FieldEncoder { writer }
    }

    pub fn mandatory<T: InformationElement>(
        &mut self,
        name: &'static str,
        ie: &T,
    ) -> Result<(), NasError> {
        match (T::SHAPE, ie.to_raw()) {
            (IeShape::HalfOctet, RawIe::Nibble(n)) => self.writer.write_half_octet(n),
            (IeShape::TagOnly, RawIe::Present) => (),
            (shape, RawIe::Octets(value)) => {
                self.check_aligned(name)?;
                self.write_value(name, shape, &value)?
            }
            (shape, raw) => return Err(mismatch(name, shape, raw)),
        }
        Ok(())
    }

    pub fn optional<T: InformationElement>(
        &mut self,
        name: &'static str,
        iei: u8,
        ie: &Option<T>,
    ) -> Result<(), NasError> {
        let Some(ie) = ie else {
            return Ok(());
        };
        self.check_aligned(name)?;
        match (T::SHAPE, ie.to_raw()) {
            (IeShape::HalfOctet, RawIe::Nibble(n)) => self.writer.write_octet(iei | (n & 0x0f)),
            (IeShape::TagOnly, RawIe::Present) => self.writer.write_octet(iei),
            (shape, RawIe::Octets(value)) => {
                self.writer.write_octet(iei);
                self.write_value(name, shape, &value)?
            }
            (shape, raw) => return Err(mismatch(name, shape, raw)),
        }
        Ok(())
    }

    /// Raw octets outside any IE, such as headers.
    pub fn write_octets(&mut self, octets: &[u8]) {
        self.writer.write_octets(octets)
    }

    pub fn finish(self) -> Result<Vec<u8>, NasError> {
        self.writer
            .into_octets()
            .map_err(|e| NasError::Encode(e.to_string()))
    }

    fn check_aligned(&self, name: &'static str) -> Result<(), NasError> {
        if self.writer.has_pending_half_octet() {
            Err(NasError::Encode(format!(
                "{name} would follow an unpaired half octet"
            )))
        } else {
            Ok(())
        }
    }

    fn write_value(
        &mut self,
        name: &'static str,
        shape: IeShape,
        value: &[u8],
    ) -> Result<(), NasError> {
        let len = value.len();
        let out_of_range = |min: usize, max: usize| {
            NasError::Encode(format!("{name} length {len} outside {min}..={max}"))
        };
        match shape {
            IeShape::Fixed(n) if len != n => return Err(out_of_range(n, n)),
            IeShape::Lv { min, max } if len < min || len > max || len > u8::MAX as usize => {
                return Err(out_of_range(min, max));
            }
            IeShape::Lve { min, max } if len < min || len > max || len > u16::MAX as usize => {
                return Err(out_of_range(min, max));
            }
            IeShape::Lv { .. } => self.writer.write_octet(len as u8),
            IeShape::Lve { .. } => self.writer.write_u16(len as u16),
            _ => (),
        }
        self.writer.write_octets(value);
        Ok(())
    }
}

fn mismatch(name: &'static str, shape: IeShape, raw: RawIe) -> NasError {
    NasError::Encode(format!("{name} produced {raw:?} for shape {shape:?}"))
}
