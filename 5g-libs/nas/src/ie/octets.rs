//! Opaque IEs - carried as octets or as a bare half octet with no further interpretation

use super::{IeShape, InformationElement, RawIe, nibble, octets};
use crate::DecodeErrorKind;

macro_rules! octets_ie {
    ($($(#[$meta:meta])* $name:ident => $shape:expr;)*) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Debug, PartialEq, Eq, Default)]
            pub struct $name(pub Vec<u8>);

            impl InformationElement for $name {
                const SHAPE: IeShape = $shape;

                fn from_raw(raw: RawIe) -> Result<Self, DecodeErrorKind> {
                    octets(raw).map($name)
                }

                fn to_raw(&self) -> RawIe {
                    RawIe::Octets(self.0.clone())
                }
            }
        )*
    };
}

macro_rules! nibble_ie {
    ($($(#[$meta:meta])* $name:ident;)*) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
            pub struct $name(pub u8);

            impl InformationElement for $name {
                const SHAPE: IeShape = IeShape::HalfOctet;

                fn from_raw(raw: RawIe) -> Result<Self, DecodeErrorKind> {
                    nibble(raw).map($name)
                }

                fn to_raw(&self) -> RawIe {
                    RawIe::Nibble(self.0 & 0x0f)
                }
            }
        )*
    };
}

const fn lv(min: usize, max: usize) -> IeShape {
    IeShape::Lv { min, max }
}

const fn lve(min: usize, max: usize) -> IeShape {
    IeShape::Lve { min, max }
}

octets_ie! {
    /// TS24.501, 9.11.3.10
    Abba => lv(2, 255);
    /// RAND, TS24.501, 9.11.3.16
    AuthenticationParameterRand => IeShape::Fixed(16);
    /// AUTN, TS24.501, 9.11.3.15
    AuthenticationParameterAutn => lv(16, 16);
    /// RES*, TS24.501, 9.11.3.17
    AuthenticationResponseParameter => lv(16, 16);
    /// AUTS, TS24.501, 9.11.3.14
    AuthenticationFailureParameter => lv(14, 14);
    /// TS24.501, 9.11.2.2
    EapMessage => lve(4, 1500);
    /// TS24.501, 9.11.3.33
    NasMessageContainer => lve(1, 65535);
    /// TS24.501, 9.11.3.39
    PayloadContainer => lve(1, 65535);
    /// TS24.501, 9.11.3.1
    FiveGmmCapability => lv(1, 13);
    /// TS24.501, 9.11.3.48
    S1UeNetworkCapability => lv(2, 13);
    /// TS24.501, 9.11.3.57
    UplinkDataStatus => lv(2, 32);
    /// TS24.501, 9.11.3.44
    PduSessionStatus => lv(2, 32);
    /// TS24.501, 9.11.3.13
    AllowedPduSessionStatus => lv(2, 32);
    /// TS24.501, 9.11.3.55
    UesUsageSetting => lv(1, 1);
    /// TS24.501, 9.11.3.2A
    DrxParameters => lv(1, 1);
    /// TS24.501, 9.11.3.24
    EpsNasMessageContainer => lve(1, 65535);
    /// TS24.501, 9.11.3.9A
    UpdateType => lv(1, 1);
    /// TS24.501, 9.11.3.45
    EquivalentPlmns => lv(3, 45);
    /// TS24.501, 9.11.3.9
    TaiList => lv(7, 112);
    /// TS24.501, 9.11.3.46
    RejectedNssai => lv(2, 40);
    /// TS24.501, 9.11.3.5
    NetworkFeatureSupport => lv(1, 3);
    /// TS24.501, 9.11.3.42
    PduSessionReactivationResult => lv(2, 32);
    /// TS24.501, 9.11.3.43
    PduSessionReactivationResultErrorCause => lve(2, 512);
    /// TS24.501, 9.11.3.30
    LadnInformation => lve(0, 1712);
    /// TS24.501, 9.11.3.49
    ServiceAreaList => lv(4, 112);
    /// TS24.008, 10.5.3.13
    EmergencyNumberList => lv(3, 48);
    /// TS24.501, 9.11.3.51
    SorTransparentContainer => lve(17, 65535);
    /// TS24.501, 9.11.3.18B
    CagInformationList => lve(0, 65535);
    /// TS24.501, 9.11.3.12A
    AdditionalSecurityInformation => lv(1, 1);
    /// TS24.301, 9.9.3.23
    SelectedEpsNasSecurityAlgorithms => IeShape::Fixed(1);
    /// TS24.501, 9.11.3.48A
    ReplayedS1UeSecurityCapabilities => lv(2, 5);
    /// TS24.501, 9.11.2.1A
    Dnn => lv(1, 100);
    /// TS24.501, 9.11.2.1
    AdditionalInformation => lv(1, 255);
    /// TS24.501, 9.11.4.7
    IntegrityProtectionMaximumDataRate => IeShape::Fixed(2);
    /// TS24.501, 9.11.4.1
    FiveGsmCapability => lv(1, 13);
    /// TS24.501, 9.11.4.9
    MaximumNumberOfSupportedPacketFilters => IeShape::Fixed(2);
    /// TS24.501, 9.11.4.15
    SmPduDnRequestContainer => lv(1, 253);
    /// TS24.501, 9.11.4.6
    ExtendedProtocolConfigurationOptions => lve(1, 65535);
}

nibble_ie! {
    /// TS24.501, 9.11.3.31
    MicoIndication;
    /// TS24.501, 9.11.3.36
    NetworkSlicingIndication;
    /// TS24.501, 9.11.3.37A
    NssaiInclusionMode;
    /// TS24.501, 9.11.3.58
    Non3gppNwProvidedPolicies;
    /// TS24.501, 9.11.3.47
    RequestType;
    /// TS24.501, 9.11.4.11
    PduSessionType;
    /// TS24.501, 9.11.4.16
    SscMode;
    /// TS24.501, 9.11.4.3
    AlwaysOnPduSessionRequested;
}
