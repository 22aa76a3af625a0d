mod nas_context;
mod ue_context;
pub mod profiles;

pub use nas_context::*;
pub use ue_context::*;
