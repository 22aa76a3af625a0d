//! 5GS mobility management messages

use super::nas_message;
use crate::ie::*;

nas_message! {
    /// TS24.501, 8.2.6
    RegistrationRequest {
        registration_type: RegistrationType => mandatory,
        ngksi: NasKeySetIdentifier => mandatory,
        mobile_identity: MobileIdentity => mandatory,
        non_current_native_nas_ksi: NasKeySetIdentifier => optional(0xc0),
        fgmm_capability: FiveGmmCapability => optional(0x10),
        ue_security_capability: UeSecurityCapability => optional(0x2e),
        requested_nssai: Nssai => optional(0x2f),
        last_visited_registered_tai: Tai => optional(0x52),
        s1_ue_network_capability: S1UeNetworkCapability => optional(0x17),
        uplink_data_status: UplinkDataStatus => optional(0x40),
        pdu_session_status: PduSessionStatus => optional(0x50),
        mico_indication: MicoIndication => optional(0xb0),
        additional_guti: MobileIdentity => optional(0x77),
        allowed_pdu_session_status: AllowedPduSessionStatus => optional(0x25),
        ues_usage_setting: UesUsageSetting => optional(0x18),
        requested_drx_parameters: DrxParameters => optional(0x51),
        eps_nas_message_container: EpsNasMessageContainer => optional(0x70),
        payload_container_type: PayloadContainerType => optional(0x80),
        payload_container: PayloadContainer => optional(0x7b),
        network_slicing_indication: NetworkSlicingIndication => optional(0x90),
        update_type: UpdateType => optional(0x53),
        nas_message_container: NasMessageContainer => optional(0x71),
    }
}

nas_message! {
    /// TS24.501, 8.2.7
    RegistrationAccept {
        registration_result: FiveGsRegistrationResult => mandatory,
        guti: MobileIdentity => optional(0x77),
        equivalent_plmns: EquivalentPlmns => optional(0x4a),
        tai_list: TaiList => optional(0x54),
        allowed_nssai: Nssai => optional(0x15),
        rejected_nssai: RejectedNssai => optional(0x11),
        configured_nssai: Nssai => optional(0x31),
        network_feature_support: NetworkFeatureSupport => optional(0x21),
        pdu_session_status: PduSessionStatus => optional(0x50),
        pdu_session_reactivation_result: PduSessionReactivationResult => optional(0x26),
        pdu_session_reactivation_result_error_cause: PduSessionReactivationResultErrorCause => optional(0x72),
        ladn_information: LadnInformation => optional(0x79),
        mico_indication: MicoIndication => optional(0xb0),
        network_slicing_indication: NetworkSlicingIndication => optional(0x90),
        service_area_list: ServiceAreaList => optional(0x27),
        t3512_value: GprsTimer3 => optional(0x5e),
        non_3gpp_deregistration_timer_value: GprsTimer2 => optional(0x5d),
        t3502_value: GprsTimer2 => optional(0x16),
        emergency_number_list: EmergencyNumberList => optional(0x34),
        sor_transparent_container: SorTransparentContainer => optional(0x73),
        eap_message: EapMessage => optional(0x78),
        nssai_inclusion_mode: NssaiInclusionMode => optional(0xa0),
        negotiated_drx_parameters: DrxParameters => optional(0x51),
        non_3gpp_nw_policies: Non3gppNwProvidedPolicies => optional(0xd0),
    }
}

nas_message! {
    /// TS24.501, 8.2.8
    RegistrationComplete {
        sor_transparent_container: SorTransparentContainer => optional(0x73),
    }
}

nas_message! {
    /// TS24.501, 8.2.9
    RegistrationReject {
        cause: FiveGmmCause => mandatory,
        t3346_value: GprsTimer2 => optional(0x5f),
        t3502_value: GprsTimer2 => optional(0x16),
        eap_message: EapMessage => optional(0x78),
        rejected_nssai: RejectedNssai => optional(0x69),
        cag_information_list: CagInformationList => optional(0x75),
    }
}

nas_message! {
    /// TS24.501, 8.2.12
    DeregistrationRequestUeOriginating {
        deregistration_type: DeregistrationType => mandatory,
        ngksi: NasKeySetIdentifier => mandatory,
        mobile_identity: MobileIdentity => mandatory,
    }
}

nas_message! {
    /// TS24.501, 8.2.13
    DeregistrationAcceptUeOriginating {}
}

nas_message! {
    /// TS24.501, 8.2.14
    DeregistrationRequestUeTerminated {
        deregistration_type: DeregistrationType => mandatory,
        spare: Spare => mandatory,
        cause: FiveGmmCause => optional(0x58),
        t3346_value: GprsTimer2 => optional(0x5f),
        rejected_nssai: RejectedNssai => optional(0x6d),
        cag_information_list: CagInformationList => optional(0x75),
    }
}

nas_message! {
    /// TS24.501, 8.2.15
    DeregistrationAcceptUeTerminated {}
}

nas_message! {
    /// TS24.501, 8.2.1
    AuthenticationRequest {
        ngksi: NasKeySetIdentifier => mandatory,
        spare: Spare => mandatory,
        abba: Abba => mandatory,
        rand: AuthenticationParameterRand => optional(0x21),
        autn: AuthenticationParameterAutn => optional(0x20),
        eap_message: EapMessage => optional(0x78),
    }
}

nas_message! {
    /// TS24.501, 8.2.2
    AuthenticationResponse {
        response_parameter: AuthenticationResponseParameter => optional(0x2d),
        eap_message: EapMessage => optional(0x78),
    }
}

nas_message! {
    /// TS24.501, 8.2.5
    AuthenticationReject {
        eap_message: EapMessage => optional(0x78),
    }
}

nas_message! {
    /// TS24.501, 8.2.4
    AuthenticationFailure {
        cause: FiveGmmCause => mandatory,
        failure_parameter: AuthenticationFailureParameter => optional(0x30),
    }
}

nas_message! {
    /// TS24.501, 8.2.3
    AuthenticationResult {
        ngksi: NasKeySetIdentifier => mandatory,
        spare: Spare => mandatory,
        eap_message: EapMessage => mandatory,
        abba: Abba => optional(0x38),
    }
}

nas_message! {
    /// TS24.501, 8.2.21
    IdentityRequest {
        identity_type: IdentityType => mandatory,
        spare: Spare => mandatory,
    }
}

nas_message! {
    /// TS24.501, 8.2.22
    IdentityResponse {
        mobile_identity: MobileIdentity => mandatory,
    }
}

nas_message! {
    /// TS24.501, 8.2.25
    SecurityModeCommand {
        selected_algorithms: NasSecurityAlgorithms => mandatory,
        ngksi: NasKeySetIdentifier => mandatory,
        spare: Spare => mandatory,
        replayed_ue_security_capability: UeSecurityCapability => mandatory,
        imeisv_request: ImeisvRequest => optional(0xe0),
        selected_eps_algorithms: SelectedEpsNasSecurityAlgorithms => optional(0x57),
        additional_security_information: AdditionalSecurityInformation => optional(0x36),
        eap_message: EapMessage => optional(0x78),
        abba: Abba => optional(0x38),
        replayed_s1_ue_security_capabilities: ReplayedS1UeSecurityCapabilities => optional(0x19),
    }
}

nas_message! {
    /// TS24.501, 8.2.26
    SecurityModeComplete {
        imeisv: MobileIdentity => optional(0x77),
        nas_message_container: NasMessageContainer => optional(0x71),
        non_imeisv_pei: MobileIdentity => optional(0x78),
    }
}

nas_message! {
    /// TS24.501, 8.2.27
    SecurityModeReject {
        cause: FiveGmmCause => mandatory,
    }
}

nas_message! {
    /// TS24.501, 8.2.29
    FiveGmmStatus {
        cause: FiveGmmCause => mandatory,
    }
}

nas_message! {
    /// TS24.501, 8.2.10
    UlNasTransport {
        payload_container_type: PayloadContainerType => mandatory,
        spare: Spare => mandatory,
        payload_container: PayloadContainer => mandatory,
        pdu_session_id: PduSessionIdentity2 => optional(0x12),
        old_pdu_session_id: PduSessionIdentity2 => optional(0x59),
        request_type: RequestType => optional(0x80),
        s_nssai: SNssai => optional(0x22),
        dnn: Dnn => optional(0x25),
        additional_information: AdditionalInformation => optional(0x24),
    }
}

nas_message! {
    /// TS24.501, 8.2.11
    DlNasTransport {
        payload_container_type: PayloadContainerType => mandatory,
        spare: Spare => mandatory,
        payload_container: PayloadContainer => mandatory,
        pdu_session_id: PduSessionIdentity2 => optional(0x12),
        additional_information: AdditionalInformation => optional(0x24),
        cause: FiveGmmCause => optional(0x58),
        back_off_timer_value: GprsTimer3 => optional(0x37),
    }
}

impl RegistrationReject {
    pub fn new(cause: FiveGmmCause) -> Self {
        RegistrationReject {
            cause,
            t3346_value: None,
            t3502_value: None,
            eap_message: None,
            rejected_nssai: None,
            cag_information_list: None,
        }
    }
}

impl IdentityRequest {
    pub fn new(identity_type: IdentityType) -> Self {
        IdentityRequest {
            identity_type,
            spare: Spare,
        }
    }
}
