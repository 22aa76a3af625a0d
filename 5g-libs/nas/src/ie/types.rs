//! Typed IEs with semantic content

use super::{IeShape, InformationElement, Plmn, RawIe, invalid, nibble, octets, single};
use crate::DecodeErrorKind;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use security::{CipheringAlgorithm, IntegrityAlgorithm};

/// TS24.501, 9.11.3.7
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum RegistrationTypeValue {
    InitialRegistration = 1,
    MobilityRegistrationUpdating = 2,
    PeriodicRegistrationUpdating = 3,
    EmergencyRegistration = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistrationType {
    pub follow_on_request: bool,
    pub value: RegistrationTypeValue,
}

impl InformationElement for RegistrationType {
    const SHAPE: IeShape = IeShape::HalfOctet;

    fn from_raw(raw: RawIe) -> Result<Self, DecodeErrorKind> {
        let n = nibble(raw)?;
        // "All other values are interpreted as initial registration in this version of the protocol."
        let value = RegistrationTypeValue::try_from(n & 0x7)
            .unwrap_or(RegistrationTypeValue::InitialRegistration);
        Ok(RegistrationType {
            follow_on_request: n & 0x8 != 0,
            value,
        })
    }

    fn to_raw(&self) -> RawIe {
        RawIe::Nibble(((self.follow_on_request as u8) << 3) | u8::from(self.value))
    }
}

/// TS24.501, 9.11.3.32
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NasKeySetIdentifier {
    /// Type of security context flag.  False for a native context.
    pub mapped: bool,
    pub ksi: u8,
}

impl NasKeySetIdentifier {
    pub const NO_KEY_AVAILABLE: u8 = 0b111;

    pub fn native(ksi: u8) -> Self {
        NasKeySetIdentifier {
            mapped: false,
            ksi: ksi & 0x7,
        }
    }

    pub fn no_key() -> Self {
        Self::native(Self::NO_KEY_AVAILABLE)
    }
}

impl InformationElement for NasKeySetIdentifier {
    const SHAPE: IeShape = IeShape::HalfOctet;

    fn from_raw(raw: RawIe) -> Result<Self, DecodeErrorKind> {
        let n = nibble(raw)?;
        Ok(NasKeySetIdentifier {
            mapped: n & 0x8 != 0,
            ksi: n & 0x7,
        })
    }

    fn to_raw(&self) -> RawIe {
        RawIe::Nibble(((self.mapped as u8) << 3) | (self.ksi & 0x7))
    }
}

/// TS24.501, 9.11.3.3
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum IdentityType {
    NoIdentity = 0,
    Suci = 1,
    Guti = 2,
    Imei = 3,
    STmsi = 4,
    Imeisv = 5,
    MacAddress = 6,
    Eui64 = 7,
}

impl InformationElement for IdentityType {
    const SHAPE: IeShape = IeShape::HalfOctet;

    fn from_raw(raw: RawIe) -> Result<Self, DecodeErrorKind> {
        // Bits 1-3 only, so every value maps.
        Ok(IdentityType::try_from(nibble(raw)? & 0x7).unwrap_or(IdentityType::Suci))
    }

    fn to_raw(&self) -> RawIe {
        RawIe::Nibble((*self).into())
    }
}

/// Spare half octet.  Ignored on receipt, sent as zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Spare;

impl InformationElement for Spare {
    const SHAPE: IeShape = IeShape::HalfOctet;

    fn from_raw(_raw: RawIe) -> Result<Self, DecodeErrorKind> {
        Ok(Spare)
    }

    fn to_raw(&self) -> RawIe {
        RawIe::Nibble(0)
    }
}

/// TS24.501, 9.11.2.1B
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum AccessType {
    ThreeGpp = 1,
    NonThreeGpp = 2,
    Both = 3,
}

/// TS24.501, 9.11.3.20
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeregistrationType {
    pub switch_off: bool,
    /// Network to UE only.
    pub re_registration_required: bool,
    pub access_type: AccessType,
}

impl DeregistrationType {
    pub fn normal(access_type: AccessType) -> Self {
        DeregistrationType {
            switch_off: false,
            re_registration_required: false,
            access_type,
        }
    }
}

impl InformationElement for DeregistrationType {
    const SHAPE: IeShape = IeShape::HalfOctet;

    fn from_raw(raw: RawIe) -> Result<Self, DecodeErrorKind> {
        let n = nibble(raw)?;
        let Ok(access_type) = AccessType::try_from(n & 0x3) else {
            return invalid(format!("access type {}", n & 0x3));
        };
        Ok(DeregistrationType {
            switch_off: n & 0x8 != 0,
            re_registration_required: n & 0x4 != 0,
            access_type,
        })
    }

    fn to_raw(&self) -> RawIe {
        RawIe::Nibble(
            ((self.switch_off as u8) << 3)
                | ((self.re_registration_required as u8) << 2)
                | u8::from(self.access_type),
        )
    }
}

/// TS24.008, 10.5.5.10
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImeisvRequest(pub bool);

impl InformationElement for ImeisvRequest {
    const SHAPE: IeShape = IeShape::HalfOctet;

    fn from_raw(raw: RawIe) -> Result<Self, DecodeErrorKind> {
        Ok(ImeisvRequest(nibble(raw)? & 0x7 == 1))
    }

    fn to_raw(&self) -> RawIe {
        RawIe::Nibble(self.0 as u8)
    }
}

/// TS24.501, 9.11.3.40
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum PayloadContainerType {
    N1SmInformation = 1,
    Sms = 2,
    Lpp = 3,
    SorTransparentContainer = 4,
    UePolicyContainer = 5,
    UeParametersUpdate = 6,
    LocationServices = 7,
    CiotUserData = 8,
    Multiple = 15,
}

impl InformationElement for PayloadContainerType {
    const SHAPE: IeShape = IeShape::HalfOctet;

    fn from_raw(raw: RawIe) -> Result<Self, DecodeErrorKind> {
        let n = nibble(raw)?;
        PayloadContainerType::try_from(n)
            .or_else(|_| invalid(format!("payload container type {n}")))
    }

    fn to_raw(&self) -> RawIe {
        RawIe::Nibble((*self).into())
    }
}

/// TS24.501, 9.11.3.2
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FiveGmmCause(pub u8);

impl FiveGmmCause {
    pub const ILLEGAL_UE: Self = FiveGmmCause(3);
    pub const PEI_NOT_ACCEPTED: Self = FiveGmmCause(5);
    pub const ILLEGAL_ME: Self = FiveGmmCause(6);
    pub const FIVEGS_SERVICES_NOT_ALLOWED: Self = FiveGmmCause(7);
    pub const UE_IDENTITY_CANNOT_BE_DERIVED: Self = FiveGmmCause(9);
    pub const PLMN_NOT_ALLOWED: Self = FiveGmmCause(11);
    pub const TRACKING_AREA_NOT_ALLOWED: Self = FiveGmmCause(12);
    pub const ROAMING_NOT_ALLOWED: Self = FiveGmmCause(13);
    pub const NO_SUITABLE_CELLS: Self = FiveGmmCause(15);
    pub const MAC_FAILURE: Self = FiveGmmCause(20);
    pub const SYNCH_FAILURE: Self = FiveGmmCause(21);
    pub const CONGESTION: Self = FiveGmmCause(22);
    pub const UE_SECURITY_CAPABILITIES_MISMATCH: Self = FiveGmmCause(23);
    pub const SECURITY_MODE_REJECTED_UNSPECIFIED: Self = FiveGmmCause(24);
    pub const NON_5G_AUTHENTICATION_UNACCEPTABLE: Self = FiveGmmCause(26);
    pub const SEMANTICALLY_INCORRECT_MESSAGE: Self = FiveGmmCause(95);
    pub const INVALID_MANDATORY_INFORMATION: Self = FiveGmmCause(96);
    pub const MESSAGE_TYPE_NON_EXISTENT: Self = FiveGmmCause(97);
    pub const PROTOCOL_ERROR_UNSPECIFIED: Self = FiveGmmCause(111);

    pub fn description(&self) -> &'static str {
        match self.0 {
            3 => "Illegal UE",
            5 => "PEI not accepted",
            6 => "Illegal ME",
            7 => "5GS services not allowed",
            9 => "UE identity cannot be derived by the network",
            10 => "Implicitly de-registered",
            11 => "PLMN not allowed",
            12 => "Tracking area not allowed",
            13 => "Roaming not allowed in this tracking area",
            15 => "No suitable cells in tracking area",
            20 => "MAC failure",
            21 => "Synch failure",
            22 => "Congestion",
            23 => "UE security capabilities mismatch",
            24 => "Security mode rejected, unspecified",
            26 => "Non-5G authentication unacceptable",
            27 => "N1 mode not allowed",
            62 => "No network slices available",
            95 => "Semantically incorrect message",
            96 => "Invalid mandatory information",
            97 => "Message type non-existent or not implemented",
            111 => "Protocol error, unspecified",
            _ => "unrecognized cause",
        }
    }
}

/// TS24.501, 9.11.4.2
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FiveGsmCause(pub u8);

impl FiveGsmCause {
    pub const INSUFFICIENT_RESOURCES: Self = FiveGsmCause(26);
    pub const MISSING_OR_UNKNOWN_DNN: Self = FiveGsmCause(27);
    pub const UNKNOWN_PDU_SESSION_TYPE: Self = FiveGsmCause(28);
    pub const USER_AUTHENTICATION_FAILED: Self = FiveGsmCause(29);
    pub const REQUEST_REJECTED_UNSPECIFIED: Self = FiveGsmCause(31);
    pub const PROTOCOL_ERROR_UNSPECIFIED: Self = FiveGsmCause(111);
}

macro_rules! single_octet_ie {
    ($($name:ident),*) => {
        $(
            impl InformationElement for $name {
                const SHAPE: IeShape = IeShape::Fixed(1);

                fn from_raw(raw: RawIe) -> Result<Self, DecodeErrorKind> {
                    Ok($name(single(raw)?))
                }

                fn to_raw(&self) -> RawIe {
                    RawIe::Octets(vec![self.0])
                }
            }
        )*
    };
}

single_octet_ie!(FiveGmmCause, FiveGsmCause, PduSessionIdentity2);

/// TS24.501, 9.11.3.34
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NasSecurityAlgorithms {
    pub ciphering: CipheringAlgorithm,
    pub integrity: IntegrityAlgorithm,
}

impl InformationElement for NasSecurityAlgorithms {
    const SHAPE: IeShape = IeShape::Fixed(1);

    fn from_raw(raw: RawIe) -> Result<Self, DecodeErrorKind> {
        let o = single(raw)?;
        let ciphering = CipheringAlgorithm::try_from((o >> 4) & 0x7);
        let integrity = IntegrityAlgorithm::try_from(o & 0x7);
        match (ciphering, integrity) {
            (Ok(ciphering), Ok(integrity)) => Ok(NasSecurityAlgorithms {
                ciphering,
                integrity,
            }),
            _ => invalid(format!("NAS security algorithms {o:#04x}")),
        }
    }

    fn to_raw(&self) -> RawIe {
        RawIe::Octets(vec![
            (u8::from(self.ciphering) << 4) | u8::from(self.integrity),
        ])
    }
}

/// TS24.501, 9.11.3.6
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FiveGsRegistrationResult {
    pub sms_allowed: bool,
    pub access_type: AccessType,
}

impl InformationElement for FiveGsRegistrationResult {
    const SHAPE: IeShape = IeShape::Lv { min: 1, max: 1 };

    fn from_raw(raw: RawIe) -> Result<Self, DecodeErrorKind> {
        let o = single(raw)?;
        let Ok(access_type) = AccessType::try_from(o & 0x7) else {
            return invalid(format!("5GS registration result {o:#04x}"));
        };
        Ok(FiveGsRegistrationResult {
            sms_allowed: o & 0x8 != 0,
            access_type,
        })
    }

    fn to_raw(&self) -> RawIe {
        RawIe::Octets(vec![
            ((self.sms_allowed as u8) << 3) | u8::from(self.access_type),
        ])
    }
}

/// TS24.501, 9.11.3.54.  Bit 8 of each octet is algorithm 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UeSecurityCapability {
    pub nr_ea: u8,
    pub nr_ia: u8,
    pub eps: Option<(u8, u8)>,
}

impl UeSecurityCapability {
    /// NEA0-3 and NIA0-3.
    pub fn all_nr() -> Self {
        UeSecurityCapability {
            nr_ea: 0xf0,
            nr_ia: 0xf0,
            eps: None,
        }
    }

    pub fn supports_ciphering(&self, alg: CipheringAlgorithm) -> bool {
        self.nr_ea & (0x80 >> u8::from(alg)) != 0
    }

    pub fn supports_integrity(&self, alg: IntegrityAlgorithm) -> bool {
        self.nr_ia & (0x80 >> u8::from(alg)) != 0
    }
}

impl InformationElement for UeSecurityCapability {
    const SHAPE: IeShape = IeShape::Lv { min: 2, max: 8 };

    fn from_raw(raw: RawIe) -> Result<Self, DecodeErrorKind> {
        let o = octets(raw)?;
        Ok(UeSecurityCapability {
            nr_ea: o[0],
            nr_ia: o[1],
            eps: (o.len() >= 4).then(|| (o[2], o[3])),
        })
    }

    fn to_raw(&self) -> RawIe {
        let mut o = vec![self.nr_ea, self.nr_ia];
        if let Some((ea, ia)) = self.eps {
            o.extend_from_slice(&[ea, ia]);
        }
        RawIe::Octets(o)
    }
}

/// S-NSSAI contents, TS24.501, 9.11.2.8.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SNssai {
    pub sst: u8,
    pub sd: Option<[u8; 3]>,
    pub mapped_sst: Option<u8>,
    pub mapped_sd: Option<[u8; 3]>,
}

impl SNssai {
    pub fn new(sst: u8, sd: Option<[u8; 3]>) -> Self {
        SNssai {
            sst,
            sd,
            ..Default::default()
        }
    }

    fn to_octets(self) -> Vec<u8> {
        let mut o = vec![self.sst];
        if let Some(sd) = self.sd {
            o.extend_from_slice(&sd);
        }
        if let Some(mapped_sst) = self.mapped_sst {
            o.push(mapped_sst);
        }
        if let Some(mapped_sd) = self.mapped_sd {
            o.extend_from_slice(&mapped_sd);
        }
        o
    }

    fn from_octets(o: &[u8]) -> Result<Self, DecodeErrorKind> {
        let sd = |i: usize| [o[i], o[i + 1], o[i + 2]];
        let (sd, mapped_sst, mapped_sd) = match o.len() {
            1 => (None, None, None),
            2 => (None, Some(o[1]), None),
            4 => (Some(sd(1)), None, None),
            5 => (Some(sd(1)), Some(o[4]), None),
            8 => (Some(sd(1)), Some(o[4]), Some(sd(5))),
            n => return invalid(format!("S-NSSAI of length {n}")),
        };
        Ok(SNssai {
            sst: o[0],
            sd,
            mapped_sst,
            mapped_sd,
        })
    }
}

impl InformationElement for SNssai {
    const SHAPE: IeShape = IeShape::Lv { min: 1, max: 8 };

    fn from_raw(raw: RawIe) -> Result<Self, DecodeErrorKind> {
        SNssai::from_octets(&octets(raw)?)
    }

    fn to_raw(&self) -> RawIe {
        RawIe::Octets(self.to_octets())
    }
}

/// TS24.501, 9.11.3.37
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Nssai(pub Vec<SNssai>);

impl InformationElement for Nssai {
    const SHAPE: IeShape = IeShape::Lv { min: 2, max: 144 };

    fn from_raw(raw: RawIe) -> Result<Self, DecodeErrorKind> {
        let o = octets(raw)?;
        let mut list = vec![];
        let mut rest = &o[..];
        while let Some((&len, tail)) = rest.split_first() {
            let len = len as usize;
            if len > tail.len() {
                return invalid(format!("S-NSSAI length {len} overruns NSSAI"));
            }
            list.push(SNssai::from_octets(&tail[..len])?);
            rest = &tail[len..];
        }
        Ok(Nssai(list))
    }

    fn to_raw(&self) -> RawIe {
        RawIe::Octets(
            self.0
                .iter()
                .flat_map(|s| {
                    let o = s.to_octets();
                    std::iter::once(o.len() as u8).chain(o)
                })
                .collect(),
        )
    }
}

/// TS24.008, 10.5.7.4.  Unit in bits 6-8, value in bits 1-5.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GprsTimer2(pub u8);

impl GprsTimer2 {
    pub fn seconds(&self) -> Option<u64> {
        let value = (self.0 & 0x1f) as u64;
        match self.0 >> 5 {
            0b000 => Some(value * 2),
            0b001 => Some(value * 60),
            0b010 => Some(value * 360),
            _ => None,
        }
    }
}

/// TS24.008, 10.5.7.4a
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GprsTimer3(pub u8);

impl GprsTimer3 {
    pub fn seconds(&self) -> Option<u64> {
        let value = (self.0 & 0x1f) as u64;
        match self.0 >> 5 {
            0b000 => Some(value * 600),
            0b001 => Some(value * 3600),
            0b010 => Some(value * 36000),
            0b011 => Some(value * 2),
            0b100 => Some(value * 30),
            0b101 => Some(value * 60),
            0b110 => Some(value * 1_152_000),
            _ => None,
        }
    }
}

macro_rules! timer_ie {
    ($($name:ident),*) => {
        $(
            impl InformationElement for $name {
                const SHAPE: IeShape = IeShape::Lv { min: 1, max: 1 };

                fn from_raw(raw: RawIe) -> Result<Self, DecodeErrorKind> {
                    Ok($name(single(raw)?))
                }

                fn to_raw(&self) -> RawIe {
                    RawIe::Octets(vec![self.0])
                }
            }
        )*
    };
}

timer_ie!(GprsTimer2, GprsTimer3);

/// TS24.501, 9.11.3.8
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tai {
    pub plmn: Plmn,
    pub tac: [u8; 3],
}

impl InformationElement for Tai {
    const SHAPE: IeShape = IeShape::Fixed(6);

    fn from_raw(raw: RawIe) -> Result<Self, DecodeErrorKind> {
        let o = octets(raw)?;
        Ok(Tai {
            plmn: Plmn([o[0], o[1], o[2]]),
            tac: [o[3], o[4], o[5]],
        })
    }

    fn to_raw(&self) -> RawIe {
        RawIe::Octets([self.plmn.0, self.tac].concat())
    }
}

/// TS24.007, 11.2.3.1b
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PduSessionIdentity2(pub u8);
