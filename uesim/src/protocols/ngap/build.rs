use crate::UeContext;
use ngap::{
    AmfUeNgapId, InitialContextSetupResponse, InitialUeMessage, NasPdu, NgapPdu, RanUeNgapId,
    UeContextReleaseComplete, UplinkNasTransport,
};

pub fn initial_ue_message(ue: &UeContext, nas_pdu: Vec<u8>) -> NgapPdu {
    let five_g_s_tmsi = ue.guti.map(|guti| {
        let s_tmsi = guti.s_tmsi();
        ngap::FiveGSTmsi {
            amf_set_id: s_tmsi.amf_set_id,
            amf_pointer: s_tmsi.amf_pointer,
            tmsi: s_tmsi.tmsi,
        }
    });
    ngap::build(&InitialUeMessage {
        ran_ue_ngap_id: RanUeNgapId(ue.ran_ue_ngap_id),
        nas_pdu: NasPdu(nas_pdu),
        user_location_information: ue.profile.user_location,
        rrc_establishment_cause: ue.profile.rrc_establishment_cause,
        five_g_s_tmsi,
    })
}

pub fn uplink_nas_transport(amf_ue_ngap_id: u64, ue: &UeContext, nas_pdu: Vec<u8>) -> NgapPdu {
    ngap::build(&UplinkNasTransport {
        amf_ue_ngap_id: AmfUeNgapId(amf_ue_ngap_id),
        ran_ue_ngap_id: RanUeNgapId(ue.ran_ue_ngap_id),
        nas_pdu: NasPdu(nas_pdu),
        user_location_information: ue.profile.user_location,
    })
}

pub fn initial_context_setup_response(amf_ue_ngap_id: u64, ran_ue_ngap_id: u32) -> NgapPdu {
    ngap::build(&InitialContextSetupResponse {
        amf_ue_ngap_id: AmfUeNgapId(amf_ue_ngap_id),
        ran_ue_ngap_id: RanUeNgapId(ran_ue_ngap_id),
    })
}

pub fn ue_context_release_complete(amf_ue_ngap_id: u64, ran_ue_ngap_id: u32) -> NgapPdu {
    ngap::build(&UeContextReleaseComplete {
        amf_ue_ngap_id: AmfUeNgapId(amf_ue_ngap_id),
        ran_ue_ngap_id: RanUeNgapId(ran_ue_ngap_id),
    })
}
