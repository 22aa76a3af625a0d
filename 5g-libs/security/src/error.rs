use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AkaError {
    #[error("AUTN MAC check failed")]
    MacFailure,

    #[error("AMF separation bit not set")]
    SeparationBit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SecurityError {
    #[error("{0} requires a whole number of octets, got {1} bits")]
    UnalignedMessage(&'static str, usize),

    #[error("Unknown algorithm identifier {0}")]
    UnknownAlgorithm(u8),
}
