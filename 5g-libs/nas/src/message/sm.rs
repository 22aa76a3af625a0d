//! 5GS session management messages

use super::nas_message;
use crate::ie::*;

nas_message! {
    /// TS24.501, 8.3.1
    PduSessionEstablishmentRequest {
        integrity_protection_maximum_data_rate: IntegrityProtectionMaximumDataRate => mandatory,
        pdu_session_type: PduSessionType => optional(0x90),
        ssc_mode: SscMode => optional(0xa0),
        fgsm_capability: FiveGsmCapability => optional(0x28),
        maximum_number_of_supported_packet_filters: MaximumNumberOfSupportedPacketFilters => optional(0x55),
        always_on_pdu_session_requested: AlwaysOnPduSessionRequested => optional(0xb0),
        sm_pdu_dn_request_container: SmPduDnRequestContainer => optional(0x39),
        extended_protocol_configuration_options: ExtendedProtocolConfigurationOptions => optional(0x7b),
    }
}

nas_message! {
    /// TS24.501, 8.3.3
    PduSessionEstablishmentReject {
        cause: FiveGsmCause => mandatory,
        back_off_timer_value: GprsTimer3 => optional(0x37),
        allowed_ssc_mode: SscMode => optional(0xf0),
        eap_message: EapMessage => optional(0x78),
        extended_protocol_configuration_options: ExtendedProtocolConfigurationOptions => optional(0x7b),
    }
}

nas_message! {
    /// TS24.501, 8.3.16
    FiveGsmStatus {
        cause: FiveGsmCause => mandatory,
    }
}
