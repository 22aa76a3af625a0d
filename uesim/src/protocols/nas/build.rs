use crate::RegistrationInput;
use nas::ie::{
    AccessType, AuthenticationFailureParameter, AuthenticationResponseParameter,
    DeregistrationType, EapMessage, FiveGmmCause, MobileIdentity, NasKeySetIdentifier,
    NasMessageContainer, RegistrationType, RegistrationTypeValue, UeSecurityCapability,
};
use nas::message::{
    AuthenticationFailure, AuthenticationResponse, DeregistrationRequestUeOriginating,
    IdentityResponse, RegistrationComplete, RegistrationRequest, SecurityModeComplete,
};
use nas::eap::EapPacket;
use nas::{MmMessage, NasError, PlainNasMessage};

pub fn registration_request(profile: &RegistrationInput) -> PlainNasMessage {
    MmMessage::RegistrationRequest(RegistrationRequest {
        registration_type: RegistrationType {
            follow_on_request: false,
            value: RegistrationTypeValue::InitialRegistration,
        },
        ngksi: profile.ngksi,
        mobile_identity: MobileIdentity::Suci(profile.suci.clone()),
        non_current_native_nas_ksi: None,
        fgmm_capability: None,
        ue_security_capability: Some(UeSecurityCapability::all_nr()),
        requested_nssai: (!profile.requested_nssai.0.is_empty())
            .then(|| profile.requested_nssai.clone()),
        last_visited_registered_tai: None,
        s1_ue_network_capability: None,
        uplink_data_status: None,
        pdu_session_status: None,
        mico_indication: None,
        additional_guti: None,
        allowed_pdu_session_status: None,
        ues_usage_setting: None,
        requested_drx_parameters: None,
        eps_nas_message_container: None,
        payload_container_type: None,
        payload_container: None,
        network_slicing_indication: None,
        update_type: None,
        nas_message_container: None,
    })
    .into()
}

pub fn authentication_response(res_star: &[u8; 16]) -> PlainNasMessage {
    MmMessage::AuthenticationResponse(AuthenticationResponse {
        response_parameter: Some(AuthenticationResponseParameter(res_star.to_vec())),
        eap_message: None,
    })
    .into()
}

/// An AuthenticationResponse that carries an EAP-Response instead of RES* (TS24.501, 5.4.1.2.2).
pub fn eap_authentication_response(eap: &EapPacket) -> Result<PlainNasMessage, NasError> {
    Ok(MmMessage::AuthenticationResponse(AuthenticationResponse {
        response_parameter: None,
        eap_message: Some(EapMessage(eap.encode()?)),
    })
    .into())
}

/// `auts` goes with a synch failure (TS24.501, 5.4.1.3.7).
pub fn authentication_failure(cause: FiveGmmCause, auts: Option<[u8; 14]>) -> PlainNasMessage {
    MmMessage::AuthenticationFailure(AuthenticationFailure {
        cause,
        failure_parameter: auts.map(|a| AuthenticationFailureParameter(a.to_vec())),
    })
    .into()
}

pub fn identity_response(mobile_identity: MobileIdentity) -> PlainNasMessage {
    MmMessage::IdentityResponse(IdentityResponse { mobile_identity }).into()
}

/// TS24.501, 4.4.6: the UE retransmits its entire initial message in the NAS message container.
pub fn security_mode_complete(
    imeisv: Option<MobileIdentity>,
    initial_nas_message: Vec<u8>,
) -> PlainNasMessage {
    MmMessage::SecurityModeComplete(SecurityModeComplete {
        imeisv,
        nas_message_container: Some(NasMessageContainer(initial_nas_message)),
        non_imeisv_pei: None,
    })
    .into()
}

pub fn registration_complete() -> PlainNasMessage {
    MmMessage::RegistrationComplete(RegistrationComplete {
        sor_transparent_container: None,
    })
    .into()
}

pub fn deregistration_request(
    ngksi: NasKeySetIdentifier,
    mobile_identity: MobileIdentity,
) -> PlainNasMessage {
    MmMessage::DeregistrationRequestUeOriginating(DeregistrationRequestUeOriginating {
        deregistration_type: DeregistrationType::normal(AccessType::ThreeGpp),
        ngksi,
        mobile_identity,
    })
    .into()
}
