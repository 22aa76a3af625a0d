//! ie - information element shapes (TS24.007, 11.2.1.1) and the field level codec driven by them

mod field;
mod mobile_identity;
mod octets;
mod plmn;
mod types;

pub use field::{FieldDecoder, FieldEncoder};
pub use mobile_identity::*;
pub use octets::*;
pub use plmn::Plmn;
pub use types::*;

use crate::DecodeErrorKind;

/// The wire format of an IE.  Lengths are of the value part only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IeShape {
    /// Type 1.  V is a half octet; as TV the IEI takes the high nibble.
    HalfOctet,
    /// Type 2.  T only.
    TagOnly,
    /// Type 3.  Fixed length value.
    Fixed(usize),
    /// Type 4.  One octet length.
    Lv { min: usize, max: usize },
    /// Type 6.  Two octet length.
    Lve { min: usize, max: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presence {
    Mandatory,
    /// Optional, introduced by this IEI.  Type 1 IEIs are given with the value nibble zeroed,
    /// e.g. 0xb0.
    Optional(u8),
}

/// One row of a message's field table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub shape: IeShape,
    pub presence: Presence,
}

/// The value of an IE before typed interpretation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawIe {
    Nibble(u8),
    Present,
    Octets(Vec<u8>),
}

pub trait InformationElement: Sized {
    const SHAPE: IeShape;

    fn from_raw(raw: RawIe) -> Result<Self, DecodeErrorKind>;
    fn to_raw(&self) -> RawIe;
}

// Helpers for from_raw implementations.
pub(crate) fn invalid<T>(s: impl Into<String>) -> Result<T, DecodeErrorKind> {
    Err(DecodeErrorKind::InvalidValue(s.into()))
}

pub(crate) fn nibble(raw: RawIe) -> Result<u8, DecodeErrorKind> {
    match raw {
        RawIe::Nibble(n) => Ok(n),
        other => invalid(format!("{other:?} where a half octet was expected")),
    }
}

pub(crate) fn octets(raw: RawIe) -> Result<Vec<u8>, DecodeErrorKind> {
    match raw {
        RawIe::Octets(o) => Ok(o),
        other => invalid(format!("{other:?} where octets were expected")),
    }
}

pub(crate) fn single(raw: RawIe) -> Result<u8, DecodeErrorKind> {
    match octets(raw)?.as_slice() {
        [o] => Ok(*o),
        other => invalid(format!("{other:02x?} where one octet was expected")),
    }
}
