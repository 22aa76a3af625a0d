//! registration - initial registration, from RegistrationRequest to RegistrationComplete

use super::{Event, Flow, FlowContext, Transition};
use crate::nas::build;
use anyhow::Result;
use nas::ie::{FiveGmmCause, IdentityType, ImeisvRequest, MobileIdentity};
use nas::eap::{AkaSubtype, AttributeType, EapAkaPrime, EapCode, EapPacket};
use nas::message::{
    AuthenticationRequest, AuthenticationResult, IdentityRequest, RegistrationAccept,
    SecurityModeCommand,
};
use nas::{MmMessage, MmMessageType, NasError, PlainNasMessage};
use ngap::{AmfUeNgapId, InitialContextSetupRequest, IeValue, NasPdu, NgapPdu, ProcedureCode};
use security::{AkaError, EapAkaPrimeKeys};
use slog::{info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistrationState {
    AwaitingAuthentication,
    AwaitingSecurityMode,
    AwaitingAccept,
}

/// The message a reaction is keyed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    Nas(MmMessageType),
    Ngap(ProcedureCode),
}

impl Trigger {
    fn of(event: &Event) -> Option<Trigger> {
        match event {
            Event::Nas(PlainNasMessage::Mm(m)) => Some(Trigger::Nas(m.message_type())),
            Event::Nas(PlainNasMessage::Sm(..)) => None,
            Event::Ngap(pdu) => Some(Trigger::Ngap(pdu.procedure)),
        }
    }
}

/// Where a successful reaction leads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Next {
    Stay,
    To(RegistrationState),
    Complete,
    Fail,
}

enum Reaction {
    // Follow the transition table.
    Done,
    Stay,
    Fail(String),
    Then(Transition<RegistrationState>),
}

pub struct RegistrationFlow;

impl RegistrationFlow {
    /// (state, trigger, next).  A state of `None` matches every waiting state.  A reaction that
    /// does not succeed, such as an AUTN that fails verification, stays in its state.
    pub const TRANSITIONS: &'static [(Option<RegistrationState>, Trigger, Next)] = &[
        (
            None,
            Trigger::Nas(MmMessageType::AuthenticationRequest),
            Next::To(RegistrationState::AwaitingSecurityMode),
        ),
        (
            None,
            Trigger::Nas(MmMessageType::IdentityRequest),
            Next::Stay,
        ),
        (
            None,
            Trigger::Nas(MmMessageType::SecurityModeCommand),
            Next::To(RegistrationState::AwaitingAccept),
        ),
        (
            None,
            Trigger::Nas(MmMessageType::RegistrationAccept),
            Next::Complete,
        ),
        (
            None,
            Trigger::Ngap(ProcedureCode::InitialContextSetup),
            Next::Complete,
        ),
        (
            None,
            Trigger::Nas(MmMessageType::AuthenticationResult),
            Next::Stay,
        ),
        (
            None,
            Trigger::Nas(MmMessageType::RegistrationReject),
            Next::Fail,
        ),
        (
            None,
            Trigger::Nas(MmMessageType::AuthenticationReject),
            Next::Fail,
        ),
    ];

    fn lookup(state: RegistrationState, trigger: Trigger) -> Option<Next> {
        Self::TRANSITIONS
            .iter()
            .find(|(s, t, _)| s.is_none_or(|s| s == state) && *t == trigger)
            .map(|(_, _, next)| *next)
    }

    fn on_initial_context_setup(
        &mut self,
        state: RegistrationState,
        pdu: &NgapPdu,
        cx: &mut FlowContext,
    ) -> Result<Reaction> {
        if !pdu.is::<InitialContextSetupRequest>() {
            warn!(cx.logger, "Unhandled Ngap {} in state {:?}", pdu.name(), state);
            return Ok(Reaction::Stay);
        }
        let AmfUeNgapId(amf_ue_ngap_id) = pdu.extract_ie()?;
        cx.ue.amf_ue_ngap_id = Some(amf_ue_ngap_id);
        cx.send_ngap(crate::ngap::build::initial_context_setup_response(
            amf_ue_ngap_id,
            cx.ue.ran_ue_ngap_id,
        ));

        let nas_pdu_count = pdu.ies.with_id(NasPdu::ID).count();
        let Some(nas_bytes) = pdu.extract_nas_pdu(cx.logger) else {
            if nas_pdu_count > 0 {
                return Ok(Reaction::Stay);
            }
            // No piggybacked RegistrationAccept, so context setup itself confirms registration.
            cx.send_nas(build::registration_complete())?;
            info!(cx.logger, "Registered {}", cx.ue.profile.supi);
            return Ok(Reaction::Done);
        };

        match cx.ue.nas.decode(&nas_bytes) {
            Ok(nas) => {
                cx.log_message(&format!(">> Nas {}", nas.name()));
                Ok(Reaction::Then(self.react(state, &Event::Nas(nas), cx)))
            }
            Err(e @ NasError::Authentication { .. }) => Ok(Reaction::Fail(e.to_string())),
            Err(e) => {
                warn!(cx.logger, "Dropping NAS PDU from InitialContextSetupRequest - {e}");
                Ok(Reaction::Stay)
            }
        }
    }
}

impl Flow for RegistrationFlow {
    type State = RegistrationState;
    const NAME: &'static str = "Registration";

    fn start(&mut self, cx: &mut FlowContext) -> Transition<RegistrationState> {
        let request = build::registration_request(&cx.ue.profile);
        match cx.send_initial_nas(request) {
            Ok(()) => Transition::Next(RegistrationState::AwaitingAuthentication),
            Err(e) => Transition::Fail(e.to_string()),
        }
    }

    fn react(
        &mut self,
        state: RegistrationState,
        event: &Event,
        cx: &mut FlowContext,
    ) -> Transition<RegistrationState> {
        let Some(next) = Trigger::of(event).and_then(|t| Self::lookup(state, t)) else {
            warn!(cx.logger, "Unhandled {} in state {:?}", event.name(), state);
            return Transition::Next(state);
        };

        let reaction = match event {
            Event::Nas(PlainNasMessage::Mm(m)) => on_nas(m, cx),
            Event::Ngap(pdu) => self.on_initial_context_setup(state, pdu, cx),
            Event::Nas(PlainNasMessage::Sm(..)) => Ok(Reaction::Stay),
        };

        match reaction {
            Ok(Reaction::Done) => match next {
                Next::Stay => Transition::Next(state),
                Next::To(next) => Transition::Next(next),
                Next::Complete => Transition::Complete,
                Next::Fail => Transition::Fail(format!("{} in state {state:?}", event.name())),
            },
            Ok(Reaction::Stay) => Transition::Next(state),
            Ok(Reaction::Fail(reason)) => Transition::Fail(reason),
            Ok(Reaction::Then(transition)) => transition,
            Err(e) => match e.downcast_ref::<NasError>() {
                Some(NasError::Authentication { .. }) => Transition::Fail(e.to_string()),
                _ => {
                    warn!(cx.logger, "Dropping {} in state {state:?} - {e}", event.name());
                    Transition::Next(state)
                }
            },
        }
    }
}

fn on_nas(m: &MmMessage, cx: &mut FlowContext) -> Result<Reaction> {
    match m {
        MmMessage::AuthenticationRequest(r) => on_authentication_request(r, cx),
        MmMessage::IdentityRequest(r) => on_identity_request(r, cx),
        MmMessage::SecurityModeCommand(r) => on_security_mode_command(r, cx),
        MmMessage::RegistrationAccept(r) => on_registration_accept(r, cx),
        MmMessage::AuthenticationResult(r) => on_authentication_result(r, cx),
        MmMessage::RegistrationReject(r) => Ok(Reaction::Fail(format!(
            "registration rejected: cause #{} ({})",
            r.cause.0,
            r.cause.description()
        ))),
        MmMessage::AuthenticationReject(_) => {
            Ok(Reaction::Fail("authentication rejected".to_string()))
        }
        _ => Ok(Reaction::Stay),
    }
}

// TS33.501, 6.1.3.2.0
fn on_authentication_request(r: &AuthenticationRequest, cx: &mut FlowContext) -> Result<Reaction> {
    if let Some(eap) = &r.eap_message {
        return on_eap_challenge(r, &eap.0, cx);
    }
    let (Some(rand), Some(autn)) = (&r.rand, &r.autn) else {
        warn!(cx.logger, "AuthenticationRequest has no RAND and AUTN - ignoring");
        return Ok(Reaction::Stay);
    };
    let rand: [u8; 16] = rand.0.as_slice().try_into()?;
    let autn: [u8; 16] = autn.0.as_slice().try_into()?;
    let key = cx.ue.profile.key;
    let op = cx.ue.profile.operator_key;

    let aka = match security::verify_autn(&key, &op, &rand, &autn) {
        Ok(aka) => aka,
        Err(e) => {
            let cause = match e {
                AkaError::MacFailure => FiveGmmCause::MAC_FAILURE,
                AkaError::SeparationBit => FiveGmmCause::NON_5G_AUTHENTICATION_UNACCEPTABLE,
            };
            warn!(cx.logger, "Authentication failure - {e}");
            cx.send_nas(build::authentication_failure(cause, None))?;
            return Ok(Reaction::Stay);
        }
    };

    let sqn_ms = security::sqn_to_u64(&cx.ue.sqn_ms);
    if aka.sqn_value() <= sqn_ms {
        warn!(
            cx.logger,
            "SQN {:#x} is not fresh (SQNms {sqn_ms:#x}) - resynchronizing",
            aka.sqn_value()
        );
        let auts = security::build_auts(&key, &op, &rand, &cx.ue.sqn_ms);
        cx.send_nas(build::authentication_failure(
            FiveGmmCause::SYNCH_FAILURE,
            Some(auts),
        ))?;
        return Ok(Reaction::Stay);
    }

    let snn = cx.ue.profile.serving_network_name.as_bytes();
    let res_star = security::derive_res_star(&aka.ck, &aka.ik, snn, &rand, &aka.res);
    let kausf = security::derive_kausf(&aka.ck, &aka.ik, snn, &aka.sqn_xor_ak);
    let kseaf = security::derive_kseaf(&kausf, snn);
    let kamf = security::derive_kamf(&kseaf, cx.ue.profile.supi.as_bytes(), &r.abba.0);
    cx.ue.nas.set_kamf(r.ngksi, kamf);
    cx.ue.sqn_ms = aka.sqn;

    info!(cx.logger, "Network authenticated with SQN {:#x}", aka.sqn_value());
    cx.send_nas(build::authentication_response(&res_star))?;
    Ok(Reaction::Done)
}

// TS33.501, 6.1.3.1 and RFC5448
fn on_eap_challenge(
    r: &AuthenticationRequest,
    eap: &[u8],
    cx: &mut FlowContext,
) -> Result<Reaction> {
    let EapPacket::AkaPrime(request) = EapPacket::decode(eap)? else {
        warn!(cx.logger, "EAP method other than EAP-AKA' - ignoring AuthenticationRequest");
        return Ok(Reaction::Stay);
    };
    if request.code != EapCode::Request || request.subtype != AkaSubtype::Challenge {
        warn!(
            cx.logger,
            "Unexpected EAP-AKA' {:?} {:?} - ignoring", request.code, request.subtype
        );
        return Ok(Reaction::Stay);
    }
    let reply = |subtype| EapAkaPrime::new(EapCode::Response, request.id, subtype);
    let client_error = || {
        let mut error = reply(AkaSubtype::ClientError);
        error.push(AttributeType::AT_CLIENT_ERROR_CODE, vec![0, 0]);
        error
    };

    let (Some(rand), Some(autn)) = (request.rand(), request.autn()) else {
        warn!(cx.logger, "EAP-AKA' challenge without AT_RAND and AT_AUTN");
        send_eap(cx, client_error())?;
        return Ok(Reaction::Stay);
    };

    // RFC5448, 3.2: KDF 1 is the only one defined.
    if request.kdfs().next() != Some(1) {
        warn!(cx.logger, "EAP-AKA' challenge does not offer KDF 1");
        send_eap(cx, client_error())?;
        return Ok(Reaction::Stay);
    }
    let snn = cx.ue.profile.serving_network_name.clone();
    if request.kdf_input() != Some(snn.as_bytes()) {
        warn!(
            cx.logger,
            "EAP-AKA' network name {:?} is not {snn}",
            request.kdf_input().map(String::from_utf8_lossy)
        );
        send_eap(cx, reply(AkaSubtype::AuthenticationReject))?;
        return Ok(Reaction::Stay);
    }

    let key = cx.ue.profile.key;
    let op = cx.ue.profile.operator_key;
    let aka = match security::verify_autn(&key, &op, &rand, &autn) {
        Ok(aka) => aka,
        Err(e) => {
            warn!(cx.logger, "EAP-AKA' authentication failure - {e}");
            send_eap(cx, reply(AkaSubtype::AuthenticationReject))?;
            return Ok(Reaction::Stay);
        }
    };

    let sqn_ms = security::sqn_to_u64(&cx.ue.sqn_ms);
    if aka.sqn_value() <= sqn_ms {
        warn!(
            cx.logger,
            "SQN {:#x} is not fresh (SQNms {sqn_ms:#x}) - resynchronizing",
            aka.sqn_value()
        );
        let mut failure = reply(AkaSubtype::SynchronizationFailure);
        failure.push(
            AttributeType::AT_AUTS,
            security::build_auts(&key, &op, &rand, &cx.ue.sqn_ms).to_vec(),
        );
        send_eap(cx, failure)?;
        return Ok(Reaction::Stay);
    }

    let supi = cx.ue.profile.supi.clone();
    let (ck_prime, ik_prime) =
        security::derive_ck_ik_prime(&aka.ck, &aka.ik, snn.as_bytes(), &aka.sqn_xor_ak);
    let keys = EapAkaPrimeKeys::derive(&ck_prime, &ik_prime, supi.as_bytes());
    if !request.mac_matches(|packet| keys.mac(packet))? {
        warn!(cx.logger, "EAP-AKA' AT_MAC check failed");
        send_eap(cx, client_error())?;
        return Ok(Reaction::Stay);
    }

    let kseaf = security::derive_kseaf(&keys.kausf(), snn.as_bytes());
    let kamf = security::derive_kamf(&kseaf, supi.as_bytes(), &r.abba.0);
    cx.ue.nas.set_kamf(r.ngksi, kamf);
    cx.ue.sqn_ms = aka.sqn;

    info!(cx.logger, "Network authenticated by EAP-AKA' with SQN {:#x}", aka.sqn_value());
    let mut response = reply(AkaSubtype::Challenge);
    response.push_res(&aka.res);
    response.sign(|packet| keys.mac(packet))?;
    send_eap(cx, response)?;
    Ok(Reaction::Done)
}

fn send_eap(cx: &mut FlowContext, packet: EapAkaPrime) -> Result<()> {
    cx.send_nas(build::eap_authentication_response(&EapPacket::from(packet))?)
}

fn on_authentication_result(
    r: &AuthenticationResult,
    cx: &mut FlowContext,
) -> Result<Reaction> {
    match EapPacket::decode(&r.eap_message.0)? {
        EapPacket::Success { .. } => info!(cx.logger, "EAP-AKA' authentication succeeded"),
        EapPacket::Failure { .. } => warn!(cx.logger, "EAP authentication failed"),
        other => warn!(cx.logger, "Authentication result carries EAP {:?}", other.code()),
    }
    Ok(Reaction::Done)
}

fn on_identity_request(r: &IdentityRequest, cx: &mut FlowContext) -> Result<Reaction> {
    let profile = &cx.ue.profile;
    let identity = match r.identity_type {
        IdentityType::Suci => MobileIdentity::Suci(profile.suci.clone()),
        IdentityType::Imei => MobileIdentity::Imei(profile.imei.clone()),
        IdentityType::Imeisv => {
            let Some(imeisv) = &profile.imeisv else {
                warn!(cx.logger, "IMEISV requested but not available");
                return Ok(Reaction::Stay);
            };
            MobileIdentity::Imeisv(imeisv.clone())
        }
        other => {
            warn!(cx.logger, "Identity request for {other:?} not implemented");
            return Ok(Reaction::Stay);
        }
    };
    cx.send_nas(build::identity_response(identity))?;
    Ok(Reaction::Done)
}

fn on_security_mode_command(r: &SecurityModeCommand, cx: &mut FlowContext) -> Result<Reaction> {
    let imeisv = match (r.imeisv_request, &cx.ue.profile.imeisv) {
        (Some(ImeisvRequest(true)), Some(imeisv)) => Some(MobileIdentity::Imeisv(imeisv.clone())),
        (Some(ImeisvRequest(true)), None) => {
            warn!(cx.logger, "IMEISV requested but not available");
            None
        }
        _ => None,
    };
    let initial_message = build::registration_request(&cx.ue.profile).encode()?;
    info!(
        cx.logger,
        "NAS security activated with {:?} / {:?}",
        r.selected_algorithms.ciphering,
        r.selected_algorithms.integrity
    );
    cx.send_nas(build::security_mode_complete(imeisv, initial_message))?;
    Ok(Reaction::Done)
}

fn on_registration_accept(r: &RegistrationAccept, cx: &mut FlowContext) -> Result<Reaction> {
    if let Some(MobileIdentity::Guti(guti)) = &r.guti {
        cx.ue.guti = Some(*guti);
    }
    cx.send_nas(build::registration_complete())?;
    info!(cx.logger, "Registered {}", cx.ue.profile.supi);
    Ok(Reaction::Done)
}
