//! deregistration - UE originating deregistration of a registered UE

use super::{Event, Flow, FlowContext, Transition};
use crate::nas::build;
use nas::ie::{MobileIdentity, NasKeySetIdentifier};
use nas::message::DeregistrationAcceptUeOriginating;
use nas::{MmMessage, PlainNasMessage};
use ngap::UeContextReleaseCommand;
use slog::{info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeregistrationState {
    AwaitingAccept,
}

pub struct DeregistrationFlow;

impl Flow for DeregistrationFlow {
    type State = DeregistrationState;
    const NAME: &'static str = "Deregistration";

    fn start(&mut self, cx: &mut FlowContext) -> Transition<DeregistrationState> {
        let ngksi = cx.ue.nas.ngksi().unwrap_or_else(NasKeySetIdentifier::no_key);
        let mobile_identity = match cx.ue.guti {
            Some(guti) => MobileIdentity::Guti(guti),
            None => MobileIdentity::Suci(cx.ue.profile.suci.clone()),
        };
        match cx.send_nas(build::deregistration_request(ngksi, mobile_identity)) {
            Ok(()) => Transition::Next(DeregistrationState::AwaitingAccept),
            Err(e) => Transition::Fail(e.to_string()),
        }
    }

    fn react(
        &mut self,
        state: DeregistrationState,
        event: &Event,
        cx: &mut FlowContext,
    ) -> Transition<DeregistrationState> {
        match event {
            Event::Nas(PlainNasMessage::Mm(MmMessage::DeregistrationAcceptUeOriginating(
                DeregistrationAcceptUeOriginating {},
            ))) => {
                info!(cx.logger, "Deregistered {}", cx.ue.profile.supi);
                Transition::Complete
            }
            Event::Ngap(pdu) if pdu.is::<UeContextReleaseCommand>() => {
                let amf_ue_ngap_id = match pdu.parse::<UeContextReleaseCommand>() {
                    Ok(command) => command.amf_ue_ngap_id.0,
                    Err(e) => return Transition::Fail(e.to_string()),
                };
                cx.send_ngap(crate::ngap::build::ue_context_release_complete(
                    amf_ue_ngap_id,
                    cx.ue.ran_ue_ngap_id,
                ));
                info!(cx.logger, "UE context released for {}", cx.ue.profile.supi);
                Transition::Complete
            }
            _ => {
                warn!(cx.logger, "Unhandled {} in state {:?}", event.name(), state);
                Transition::Next(state)
            }
        }
    }
}
