use bits::{Bit6, Bit10, Octet, Octet4};
use nas::ie::*;
use nas::message::*;
use nas::eap::EapPacket;
use nas::{MmMessage, NasError, PlainNasMessage};
use security::{CipheringAlgorithm, IntegrityAlgorithm, NAS_ABBA};

pub const NGKSI: u8 = 1;

pub fn algorithms() -> NasSecurityAlgorithms {
    NasSecurityAlgorithms {
        ciphering: CipheringAlgorithm::Nea2,
        integrity: IntegrityAlgorithm::Nia2,
    }
}

pub fn authentication_request(rand: &[u8; 16], autn: &[u8; 16]) -> PlainNasMessage {
    MmMessage::AuthenticationRequest(AuthenticationRequest {
        ngksi: NasKeySetIdentifier::native(NGKSI),
        spare: Spare::default(),
        abba: Abba(NAS_ABBA.to_vec()),
        rand: Some(AuthenticationParameterRand(rand.to_vec())),
        autn: Some(AuthenticationParameterAutn(autn.to_vec())),
        eap_message: None,
    })
    .into()
}

pub fn eap_authentication_request(eap: &EapPacket) -> Result<PlainNasMessage, NasError> {
    Ok(MmMessage::AuthenticationRequest(AuthenticationRequest {
        ngksi: NasKeySetIdentifier::native(NGKSI),
        spare: Spare::default(),
        abba: Abba(NAS_ABBA.to_vec()),
        rand: None,
        autn: None,
        eap_message: Some(EapMessage(eap.encode()?)),
    })
    .into())
}

pub fn authentication_result(eap: &EapPacket) -> Result<PlainNasMessage, NasError> {
    Ok(MmMessage::AuthenticationResult(AuthenticationResult {
        ngksi: NasKeySetIdentifier::native(NGKSI),
        spare: Spare::default(),
        eap_message: EapMessage(eap.encode()?),
        abba: None,
    })
    .into())
}

pub fn security_mode_command() -> PlainNasMessage {
    MmMessage::SecurityModeCommand(SecurityModeCommand {
        selected_algorithms: algorithms(),
        ngksi: NasKeySetIdentifier::native(NGKSI),
        spare: Spare::default(),
        replayed_ue_security_capability: UeSecurityCapability::all_nr(),
        imeisv_request: Some(ImeisvRequest(true)),
        selected_eps_algorithms: None,
        additional_security_information: None,
        eap_message: None,
        abba: None,
        replayed_s1_ue_security_capabilities: None,
    })
    .into()
}

pub fn guti(tmsi: u32) -> FiveGGuti {
    FiveGGuti {
        plmn: Plmn([0x00, 0xf1, 0x10]),
        amf_region_id: Octet::truncating(0x01),
        amf_set_id: Bit10::truncating(0x001),
        amf_pointer: Bit6::truncating(0),
        tmsi: Octet4::truncating(tmsi as u64),
    }
}

pub fn registration_accept(guti: FiveGGuti) -> PlainNasMessage {
    MmMessage::RegistrationAccept(RegistrationAccept {
        registration_result: FiveGsRegistrationResult {
            sms_allowed: false,
            access_type: AccessType::ThreeGpp,
        },
        guti: Some(MobileIdentity::Guti(guti)),
        equivalent_plmns: None,
        tai_list: None,
        allowed_nssai: Some(Nssai(vec![SNssai::new(1, None)])),
        rejected_nssai: None,
        configured_nssai: None,
        network_feature_support: None,
        pdu_session_status: None,
        pdu_session_reactivation_result: None,
        pdu_session_reactivation_result_error_cause: None,
        ladn_information: None,
        mico_indication: None,
        network_slicing_indication: None,
        service_area_list: None,
        t3512_value: Some(GprsTimer3(0x21)),
        non_3gpp_deregistration_timer_value: None,
        t3502_value: None,
        emergency_number_list: None,
        sor_transparent_container: None,
        eap_message: None,
        nssai_inclusion_mode: None,
        negotiated_drx_parameters: None,
        non_3gpp_nw_policies: None,
    })
    .into()
}

pub fn registration_reject(cause: FiveGmmCause) -> PlainNasMessage {
    MmMessage::RegistrationReject(RegistrationReject::new(cause)).into()
}

pub fn identity_request(identity_type: IdentityType) -> PlainNasMessage {
    MmMessage::IdentityRequest(IdentityRequest::new(identity_type)).into()
}

pub fn deregistration_accept() -> PlainNasMessage {
    MmMessage::DeregistrationAcceptUeOriginating(DeregistrationAcceptUeOriginating {}).into()
}
