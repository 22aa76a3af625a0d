mod mock_amf;
pub mod framework;

pub use mock_amf::{AmfUeContext, MockAmf};
