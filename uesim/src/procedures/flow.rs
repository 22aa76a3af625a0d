//! flow - a procedure written as a state machine that reacts to one event at a time
//!
//! Reactions are synchronous.  Anything a reaction sends is queued in the [`FlowContext`]
//! outbox and the session sends it once the reaction has returned.

use super::FlowContext;
use anyhow::{Result, bail};
use nas::PlainNasMessage;
use ngap::NgapPdu;
use slog::{Logger, debug, info};
use std::fmt::Debug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Nas(PlainNasMessage),
    Ngap(NgapPdu),
}

impl Event {
    pub fn name(&self) -> String {
        match self {
            Event::Nas(m) => format!("Nas {}", m.name()),
            Event::Ngap(pdu) => format!("Ngap {}", pdu.name()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition<S> {
    Next(S),
    Complete,
    Fail(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status<S> {
    NotStarted,
    Running(S),
    Finished(Outcome),
}

pub trait Flow {
    type State: Copy + Debug + PartialEq;
    const NAME: &'static str;

    fn start(&mut self, cx: &mut FlowContext) -> Transition<Self::State>;

    fn react(
        &mut self,
        state: Self::State,
        event: &Event,
        cx: &mut FlowContext,
    ) -> Transition<Self::State>;
}

pub struct FlowEngine<F: Flow> {
    flow: F,
    status: Status<F::State>,
}

impl<F: Flow> FlowEngine<F> {
    pub fn new(flow: F) -> Self {
        FlowEngine {
            flow,
            status: Status::NotStarted,
        }
    }

    pub fn status(&self) -> &Status<F::State> {
        &self.status
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        match &self.status {
            Status::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn start(&mut self, cx: &mut FlowContext) -> Result<()> {
        if self.status != Status::NotStarted {
            bail!("{} procedure already started", F::NAME)
        }
        debug!(cx.logger, "Start {} procedure", F::NAME);
        let transition = self.flow.start(cx);
        self.apply(transition, cx.logger);
        Ok(())
    }

    pub fn handle(&mut self, event: &Event, cx: &mut FlowContext) -> Result<()> {
        let state = match &self.status {
            Status::Running(state) => *state,
            Status::NotStarted => bail!("{} procedure not started", F::NAME),
            Status::Finished(_) => bail!("procedure already terminated"),
        };
        let transition = self.flow.react(state, event, cx);
        self.apply(transition, cx.logger);
        Ok(())
    }

    /// Ends a procedure that is still running with `Failed(reason)`.
    pub fn abort(&mut self, reason: impl Into<String>, logger: &Logger) {
        if self.outcome().is_none() {
            self.apply(Transition::Fail(reason.into()), logger);
        }
    }

    fn apply(&mut self, transition: Transition<F::State>, logger: &Logger) {
        self.status = match transition {
            Transition::Next(next) => {
                if let Status::Running(previous) = &self.status {
                    if *previous != next {
                        debug!(logger, "{} {:?} -> {:?}", F::NAME, previous, next);
                    }
                }
                Status::Running(next)
            }
            Transition::Complete => {
                info!(logger, "{} procedure completed", F::NAME);
                Status::Finished(Outcome::Completed)
            }
            Transition::Fail(reason) => {
                info!(logger, "{} procedure failed - {reason}", F::NAME);
                Status::Finished(Outcome::Failed(reason))
            }
        }
    }
}
