mod deregistration;
mod flow;
mod flow_context;
mod handler_api;
mod registration;
mod ue_session;

pub use deregistration::{DeregistrationFlow, DeregistrationState};
pub use flow::{Event, Flow, FlowEngine, Outcome, Status, Transition};
pub use flow_context::FlowContext;
pub use handler_api::HandlerApi;
pub use registration::{RegistrationFlow, RegistrationState};
pub use ue_session::UeSession;
