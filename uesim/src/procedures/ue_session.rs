//! ue_session - runs one flow at a time for a UE, feeding it the PDUs routed to this UE

use super::{Event, Flow, FlowContext, FlowEngine, HandlerApi, Outcome};
use crate::UeContext;
use async_channel::Receiver;
use nas::NasError;
use ngap::{AmfUeNgapId, DownlinkNasTransport, NgapPdu};
use slog::{Logger, debug, warn};
use xxap::TransportError;

pub struct UeSession<A: HandlerApi> {
    ue: UeContext,
    receiver: Receiver<NgapPdu>,
    api: A,
    logger: Logger,
}

impl<A: HandlerApi> UeSession<A> {
    pub fn new(ue: UeContext, receiver: Receiver<NgapPdu>, api: A, logger: Logger) -> Self {
        UeSession {
            ue,
            receiver,
            api,
            logger,
        }
    }

    pub fn into_parts(self) -> (UeContext, Receiver<NgapPdu>) {
        (self.ue, self.receiver)
    }

    /// Runs `flow` to its outcome.  Inbound PDUs are processed strictly one at a time, and
    /// whatever a reaction queues is sent before the next PDU is taken from the inbox.
    pub async fn run<F: Flow>(&mut self, flow: F) -> Outcome {
        let mut engine = FlowEngine::new(flow);
        let mut outbox = Vec::new();
        if let Err(e) = engine.start(&mut FlowContext::new(&mut self.ue, &self.logger, &mut outbox))
        {
            return Outcome::Failed(e.to_string());
        }

        loop {
            for pdu in outbox.drain(..) {
                if let Err(e) = self.api.send_ngap(pdu).await {
                    engine.abort(transport_failure(&e), &self.logger);
                    break;
                }
            }

            if let Some(outcome) = engine.outcome() {
                return outcome.clone();
            }

            let Ok(pdu) = self.receiver.recv().await else {
                let reason = self
                    .api
                    .transport_error()
                    .map(|e| transport_failure(&e))
                    .unwrap_or_else(|| "transport closed".to_string());
                engine.abort(reason, &self.logger);
                continue;
            };

            match event_from_pdu(&mut self.ue, pdu, &self.logger) {
                Ok(Some(event)) => {
                    let mut cx = FlowContext::new(&mut self.ue, &self.logger, &mut outbox);
                    if let Err(e) = engine.handle(&event, &mut cx) {
                        warn!(self.logger, "Dropping {} - {e}", event.name());
                    }
                }
                Ok(None) => {}
                Err(e @ NasError::Authentication { .. }) => {
                    engine.abort(e.to_string(), &self.logger);
                }
                Err(e) => warn!(self.logger, "Dropping downlink NAS - {e}"),
            }
        }
    }
}

fn transport_failure(e: &TransportError) -> String {
    match e {
        TransportError::Aborted => "transport aborted".to_string(),
        TransportError::Closed => "transport closed".to_string(),
        TransportError::Other(reason) => format!("transport failure - {reason}"),
        e => format!("transport failure - {e}"),
    }
}

/// Turns an inbound PDU into an event for the running flow.  The NAS of a DownlinkNasTransport
/// is passed through the UE's security context and decoded.
fn event_from_pdu(
    ue: &mut UeContext,
    pdu: NgapPdu,
    logger: &Logger,
) -> Result<Option<Event>, NasError> {
    if let Ok(AmfUeNgapId(amf_ue_ngap_id)) = pdu.extract_ie() {
        ue.amf_ue_ngap_id = Some(amf_ue_ngap_id);
    }

    if !pdu.is::<DownlinkNasTransport>() {
        debug!(logger, ">> Ngap {}", pdu.name());
        return Ok(Some(Event::Ngap(pdu)));
    }

    let Some(nas_bytes) = pdu.extract_nas_pdu(logger) else {
        warn!(logger, "DownlinkNasTransport without a usable NAS PDU");
        return Ok(None);
    };
    let nas = ue.nas.decode(&nas_bytes)?;
    debug!(logger, ">> Nas {}", nas.name());
    Ok(Some(Event::Nas(nas)))
}
