use crate::BitsError;
use std::fmt;

/// Unsigned value that is exactly `W` bits wide (1 to 64).  Immutable - the `set_*` operations
/// return a new value.  Bit index 0 is the least significant bit.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Bits<const W: u8>(u64);

pub type Bit = Bits<1>;
pub type Bit2 = Bits<2>;
pub type Bit3 = Bits<3>;
pub type Bit4 = Bits<4>;
pub type Bit5 = Bits<5>;
pub type Bit6 = Bits<6>;
pub type Bit7 = Bits<7>;
pub type Octet = Bits<8>;
pub type Bit10 = Bits<10>;
pub type Octet2 = Bits<16>;
pub type Octet3 = Bits<24>;
pub type Octet4 = Bits<32>;
pub type Bit36 = Bits<36>;

const fn mask(width: u8) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

impl<const W: u8> Bits<W> {
    pub const WIDTH: u8 = {
        assert!(W >= 1 && W <= 64, "bit width must be between 1 and 64");
        W
    };
    pub const MAX: u64 = mask(Self::WIDTH);
    pub const OCTETS: usize = (Self::WIDTH as usize).div_ceil(8);
    pub const ZERO: Self = Bits(0);

    /// Rejects values that need more than `W` bits.
    pub fn new(value: u64) -> Result<Self, BitsError> {
        if value > Self::MAX {
            Err(BitsError::ValueTooWide { value, width: W })
        } else {
            Ok(Bits(value))
        }
    }

    /// Keeps the low `W` bits of `value`.
    pub const fn truncating(value: u64) -> Self {
        Bits(value & Self::MAX)
    }

    pub fn from_hex(s: &str) -> Result<Self, BitsError> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let value = u64::from_str_radix(digits, 16)
            .map_err(|_| BitsError::InvalidHex(s.to_string()))?;
        Self::new(value)
    }

    /// Builds a value from its bits, most significant first.
    pub fn from_bits(bits: &[bool]) -> Result<Self, BitsError> {
        if bits.len() != W as usize {
            return Err(BitsError::LengthMismatch {
                left: bits.len(),
                right: W as usize,
            });
        }
        Ok(Bits(
            bits.iter().fold(0, |acc, bit| (acc << 1) | (*bit as u64)),
        ))
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    pub fn as_u8(self) -> u8 {
        const { assert!(W <= 8, "value does not fit in an octet") };
        self.0 as u8
    }

    pub fn bit(self, index: u8) -> Result<bool, BitsError> {
        Self::check_index(index)?;
        Ok((self.0 >> index) & 1 == 1)
    }

    pub fn set_bit(self, index: u8, bit: bool) -> Result<Self, BitsError> {
        Self::check_index(index)?;
        let m = 1u64 << index;
        Ok(Bits(if bit { self.0 | m } else { self.0 & !m }))
    }

    /// Bits `start..=end`, shifted down to bit 0.
    pub fn bit_range(self, start: u8, end: u8) -> Result<u64, BitsError> {
        Self::check_range(start, end)?;
        Ok((self.0 >> start) & mask(end - start + 1))
    }

    /// Replaces bits `start..=end` with `value`, leaving the others untouched.
    pub fn set_bit_range(self, start: u8, end: u8, value: u64) -> Result<Self, BitsError> {
        Self::check_range(start, end)?;
        let width = end - start + 1;
        let m = mask(width);
        if value > m {
            return Err(BitsError::ValueTooWide { value, width });
        }
        Ok(Bits((self.0 & !(m << start)) | (value << start)))
    }

    /// Joins two fields into one, `self` taking the most significant bits.  The widths are
    /// checked at compile time.
    pub fn concat<const V: u8, const R: u8>(self, low: Bits<V>) -> Bits<R> {
        // Bits::<R>::WIDTH also rejects results wider than 64 bits.
        const {
            assert!(
                Bits::<R>::WIDTH as u16 == W as u16 + V as u16,
                "concatenated width must be the sum of the operand widths"
            )
        };
        Bits((self.0 << V) | low.0)
    }

    /// Big endian, right aligned in `ceil(W/8)` octets.
    pub fn to_be_octets(self) -> Vec<u8> {
        self.0.to_be_bytes()[8 - Self::OCTETS..].to_vec()
    }

    pub fn from_be_octets(octets: &[u8]) -> Result<Self, BitsError> {
        if octets.len() != Self::OCTETS {
            return Err(BitsError::LengthMismatch {
                left: octets.len(),
                right: Self::OCTETS,
            });
        }
        Self::new(
            octets
                .iter()
                .fold(0u64, |acc, octet| (acc << 8) | *octet as u64),
        )
    }

    fn check_index(index: u8) -> Result<(), BitsError> {
        if index >= W {
            Err(BitsError::OutOfRange {
                index: index as usize,
                len: W as usize,
            })
        } else {
            Ok(())
        }
    }

    fn check_range(start: u8, end: u8) -> Result<(), BitsError> {
        Self::check_index(end)?;
        if start > end {
            return Err(BitsError::OutOfRange {
                index: start as usize,
                len: end as usize + 1,
            });
        }
        Ok(())
    }
}

impl<const W: u8> TryFrom<u64> for Bits<W> {
    type Error = BitsError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<const W: u8> From<Bits<W>> for u64 {
    fn from(b: Bits<W>) -> u64 {
        b.0
    }
}

impl<const W: u8> fmt::Debug for Bits<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bit{}({:#x})", W, self.0)
    }
}

impl<const W: u8> fmt::Display for Bits<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
