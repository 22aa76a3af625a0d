use crate::{PduDescription, ProcedureCode};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NgapError {
    #[error("NGAP decode failure - {0}")]
    Decode(String),

    #[error("NGAP encode failure - {0}")]
    Encode(String),

    #[error("Missing mandatory IE {name} (id {id})")]
    MissingIe { id: u16, name: &'static str },

    #[error("Expected {expected:?} {expected_description:?}, got {received:?} {received_description:?}")]
    UnexpectedProcedure {
        expected: ProcedureCode,
        expected_description: PduDescription,
        received: ProcedureCode,
        received_description: PduDescription,
    },

    #[error("Protocol violation - {count} instances of IE {name} (id {id})")]
    MultipleIes {
        id: u16,
        name: &'static str,
        count: usize,
    },
}

impl From<bits::BitsError> for NgapError {
    fn from(e: bits::BitsError) -> Self {
        NgapError::Decode(e.to_string())
    }
}
