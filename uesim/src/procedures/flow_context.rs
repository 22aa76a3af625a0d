use crate::UeContext;
use anyhow::{Result, bail};
use nas::PlainNasMessage;
use ngap::NgapPdu;
use slog::{Logger, debug};

/// What a reaction can see and do: the UE's context and an outbox of NGAP PDUs to send.
pub struct FlowContext<'a> {
    pub ue: &'a mut UeContext,
    pub logger: &'a Logger,
    pub outbox: &'a mut Vec<NgapPdu>,
}

impl<'a> FlowContext<'a> {
    pub fn new(ue: &'a mut UeContext, logger: &'a Logger, outbox: &'a mut Vec<NgapPdu>) -> Self {
        FlowContext { ue, logger, outbox }
    }

    pub fn log_message(&self, s: &str) {
        debug!(self.logger, "{}", s)
    }

    /// Sends the first NAS message of a connection in an InitialUeMessage.
    pub fn send_initial_nas(&mut self, nas: PlainNasMessage) -> Result<()> {
        self.log_message(&format!("<< Nas {}", nas.name()));
        let nas_pdu = self.ue.nas.encode(&nas)?;
        let pdu = crate::ngap::build::initial_ue_message(self.ue, nas_pdu);
        self.send_ngap(pdu);
        Ok(())
    }

    /// Sends a NAS message in an UplinkNasTransport, protected if security is active.
    pub fn send_nas(&mut self, nas: PlainNasMessage) -> Result<()> {
        let Some(amf_ue_ngap_id) = self.ue.amf_ue_ngap_id else {
            bail!("Can't send {} before the AMF has assigned an AMF-UE-NGAP-ID", nas.name())
        };
        self.log_message(&format!("<< Nas {}", nas.name()));
        let nas_pdu = self.ue.nas.encode(&nas)?;
        let pdu = crate::ngap::build::uplink_nas_transport(amf_ue_ngap_id, self.ue, nas_pdu);
        self.send_ngap(pdu);
        Ok(())
    }

    pub fn send_ngap(&mut self, pdu: NgapPdu) {
        self.log_message(&format!("<< Ngap {}", pdu.name()));
        self.outbox.push(pdu);
    }
}
