use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BitsError {
    #[error("Index {index} out of range for length {len}")]
    OutOfRange { index: usize, len: usize },

    #[error("Value {value:#x} does not fit in {width} bits")]
    ValueTooWide { value: u64, width: u8 },

    #[error("Invalid hex string {0:?}")]
    InvalidHex(String),

    #[error("Length mismatch - {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("Truncated at offset {offset} - needed {needed} octets but {remaining} remain")]
    Truncated {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("Half octet still pending at end of output")]
    DanglingHalfOctet,
}
