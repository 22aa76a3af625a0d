use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NasError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("NAS integrity check failed - {reason}, MAC expected {}, received {}", hex::encode(.expected), hex::encode(.received))]
    Authentication {
        reason: &'static str,
        expected: [u8; 4],
        received: [u8; 4],
    },

    #[error("Unsupported - {0}")]
    UnsupportedField(String),

    #[error("Protocol violation - {0}")]
    ProtocolViolation(String),

    #[error("Encode failure - {0}")]
    Encode(String),

    #[error("No NAS security context")]
    NoSecurityContext,
}

/// Where and why decoding stopped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    pub field: &'static str,
    pub iei: Option<u8>,
    pub offset: usize,
    pub kind: DecodeErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeErrorKind {
    Truncated { expected: usize, actual: usize },
    LengthOutOfRange { length: usize, min: usize, max: usize },
    InvalidValue(String),
    UnknownMessageType(u8),
    UnknownProtocolDiscriminator(u8),
    MandatoryFieldOrder,
}

impl DecodeError {
    pub fn new(field: &'static str, offset: usize, kind: DecodeErrorKind) -> Self {
        DecodeError {
            field,
            iei: None,
            offset,
            kind,
        }
    }

    pub fn with_iei(mut self, iei: Option<u8>) -> Self {
        self.iei = iei;
        self
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to decode {}", self.field)?;
        if let Some(iei) = self.iei {
            write!(f, " (IEI {iei:#04x})")?;
        }
        write!(f, " at offset {} - ", self.offset)?;
        match &self.kind {
            DecodeErrorKind::Truncated { expected, actual } => {
                write!(f, "needed {expected} octets but only {actual} remain")
            }
            DecodeErrorKind::LengthOutOfRange { length, min, max } => {
                write!(f, "length {length} outside {min}..={max}")
            }
            DecodeErrorKind::InvalidValue(s) => write!(f, "invalid value {s}"),
            DecodeErrorKind::UnknownMessageType(t) => write!(f, "unknown message type {t:#04x}"),
            DecodeErrorKind::UnknownProtocolDiscriminator(d) => {
                write!(f, "unknown extended protocol discriminator {d:#04x}")
            }
            DecodeErrorKind::MandatoryFieldOrder => {
                write!(f, "full octet field follows an unpaired half octet")
            }
        }
    }
}
