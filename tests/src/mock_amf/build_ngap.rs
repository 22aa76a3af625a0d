use super::AmfUeContext;
use bits::{Bit6, Bit10, Octet};
use ngap::*;

fn ids(ue: &AmfUeContext) -> (AmfUeNgapId, RanUeNgapId) {
    (
        AmfUeNgapId(ue.amf_ue_ngap_id),
        RanUeNgapId(ue.ran_ue_ngap_id),
    )
}

pub fn downlink_nas_transport(ue: &AmfUeContext, nas_pdu: Vec<u8>) -> NgapPdu {
    let (amf_ue_ngap_id, ran_ue_ngap_id) = ids(ue);
    build(&DownlinkNasTransport {
        amf_ue_ngap_id,
        ran_ue_ngap_id,
        nas_pdu: NasPdu(nas_pdu),
    })
}

pub fn initial_context_setup_request(ue: &AmfUeContext, nas_pdu: Option<Vec<u8>>) -> NgapPdu {
    let (amf_ue_ngap_id, ran_ue_ngap_id) = ids(ue);
    build(&InitialContextSetupRequest {
        amf_ue_ngap_id,
        ran_ue_ngap_id,
        guami: Guami {
            plmn: [0x00, 0xf1, 0x10],
            amf_region_id: Octet::truncating(0x01),
            amf_set_id: Bit10::truncating(0x001),
            amf_pointer: Bit6::truncating(0),
        },
        allowed_nssai: AllowedNssai(vec![Snssai { sst: 1, sd: None }]),
        ue_security_capabilities: UeSecurityCapabilities::default(),
        security_key: SecurityKey(ue.kgnb()),
        nas_pdu: nas_pdu.map(NasPdu),
    })
}

pub fn ue_context_release_command(ue: &AmfUeContext) -> NgapPdu {
    let (amf_ue_ngap_id, ran_ue_ngap_id) = ids(ue);
    build(&UeContextReleaseCommand {
        amf_ue_ngap_id,
        ran_ue_ngap_id,
        cause: Cause::NAS_NORMAL_RELEASE,
    })
}
