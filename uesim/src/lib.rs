//! uesim - the UE side of 5G registration: per-UE sessions that run NAS procedures over NGAP
//! against an AMF

mod data;
mod procedures;
mod protocols;
mod simulator;

#[cfg(test)]
mod test_fixtures;

use data::*;
use protocols::*;

pub use data::profiles::{self, Profile, ProfileTable, RegistrationInput, SliceConfig};
pub use procedures::{
    DeregistrationFlow, DeregistrationState, Event, Flow, FlowContext, FlowEngine, Outcome,
    RegistrationFlow, RegistrationState, Status, Transition,
};
pub use simulator::UeSimulator;
