//! bits - fixed width values, bit and octet strings, and the octet cursor and sink used by the 3GPP codecs

mod bit_string;
mod bits;
mod error;
mod octet_string;
mod reader;
mod writer;

pub use bit_string::BitString;
pub use bits::*;
pub use error::BitsError;
pub use octet_string::OctetString;
pub use reader::OctetReader;
pub use writer::OctetWriter;

pub use bitvec::prelude::{BitSlice, Msb0};
