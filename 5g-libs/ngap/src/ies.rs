//! ies - typed values of the IEs that NGAP carries for a UE simulator (TS38.413, 9.3)

use crate::NgapError;
use bits::{Bit6, Bit10, Bit36, Octet, Octet4, OctetReader, OctetWriter};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// A typed IE value together with its protocol IE id.
pub trait IeValue: Sized {
    const ID: u16;
    const NAME: &'static str;

    fn encode(&self, w: &mut OctetWriter);
    fn decode(r: &mut OctetReader) -> Result<Self, NgapError>;

    fn to_bytes(&self) -> Vec<u8> {
        let mut w = OctetWriter::new();
        self.encode(&mut w);
        w.into_octets().unwrap_or_default()
    }

    /// The whole of `bytes` must be consumed.
    fn from_bytes(bytes: &[u8]) -> Result<Self, NgapError> {
        let mut r = OctetReader::new(bytes);
        let value = Self::decode(&mut r)?;
        if !r.is_empty() {
            return Err(NgapError::Decode(format!(
                "{} trailing octets in {}",
                r.remaining(),
                Self::NAME
            )));
        }
        Ok(value)
    }
}

macro_rules! ie_id {
    ($name:ident, $id:expr) => {
        const ID: u16 = $id;
        const NAME: &'static str = stringify!($name);
    };
}

fn read_array<const N: usize>(r: &mut OctetReader) -> Result<[u8; N], NgapError> {
    let mut a = [0; N];
    a.copy_from_slice(r.read_octets(N)?);
    Ok(a)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RanUeNgapId(pub u32);

impl IeValue for RanUeNgapId {
    ie_id!(RanUeNgapId, 85);

    fn encode(&self, w: &mut OctetWriter) {
        w.write_octets(&self.0.to_be_bytes());
    }

    fn decode(r: &mut OctetReader) -> Result<Self, NgapError> {
        Ok(RanUeNgapId(u32::from_be_bytes(read_array(r)?)))
    }
}

/// 40 bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AmfUeNgapId(pub u64);

impl IeValue for AmfUeNgapId {
    ie_id!(AmfUeNgapId, 10);

    fn encode(&self, w: &mut OctetWriter) {
        w.write_octets(&self.0.to_be_bytes()[3..]);
    }

    fn decode(r: &mut OctetReader) -> Result<Self, NgapError> {
        let mut b = [0; 8];
        b[3..].copy_from_slice(r.read_octets(5)?);
        Ok(AmfUeNgapId(u64::from_be_bytes(b)))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NasPdu(pub Vec<u8>);

impl IeValue for NasPdu {
    ie_id!(NasPdu, 38);

    fn encode(&self, w: &mut OctetWriter) {
        w.write_octets(&self.0);
    }

    fn decode(r: &mut OctetReader) -> Result<Self, NgapError> {
        Ok(NasPdu(r.read_rest().to_vec()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NrCgi {
    pub plmn: [u8; 3],
    pub nr_cell_identity: Bit36,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tai {
    pub plmn: [u8; 3],
    pub tac: [u8; 3],
}

/// UserLocationInformation, NR choice only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UserLocationInformationNr {
    pub nr_cgi: NrCgi,
    pub tai: Tai,
}

impl IeValue for UserLocationInformationNr {
    ie_id!(UserLocationInformationNr, 121);

    fn encode(&self, w: &mut OctetWriter) {
        w.write_octets(&self.nr_cgi.plmn);
        w.write_bits(self.nr_cgi.nr_cell_identity);
        w.write_octets(&self.tai.plmn);
        w.write_octets(&self.tai.tac);
    }

    fn decode(r: &mut OctetReader) -> Result<Self, NgapError> {
        Ok(UserLocationInformationNr {
            nr_cgi: NrCgi {
                plmn: read_array(r)?,
                nr_cell_identity: r.read_bits()?,
            },
            tai: Tai {
                plmn: read_array(r)?,
                tac: read_array(r)?,
            },
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum RrcEstablishmentCause {
    Emergency = 0,
    HighPriorityAccess = 1,
    MtAccess = 2,
    MoSignalling = 3,
    MoData = 4,
    MoVoiceCall = 5,
    MoVideoCall = 6,
    MoSms = 7,
    MpsPriorityAccess = 8,
    McsPriorityAccess = 9,
}

impl IeValue for RrcEstablishmentCause {
    ie_id!(RrcEstablishmentCause, 90);

    fn encode(&self, w: &mut OctetWriter) {
        w.write_octet((*self).into());
    }

    fn decode(r: &mut OctetReader) -> Result<Self, NgapError> {
        let v = r.read_octet()?;
        RrcEstablishmentCause::try_from(v)
            .map_err(|_| NgapError::Decode(format!("RRC establishment cause {v}")))
    }
}

/// TS38.413, 9.3.1.2.  The value is kept as the raw enumeration index within its group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cause {
    RadioNetwork(u8),
    Transport(u8),
    Nas(u8),
    Protocol(u8),
    Misc(u8),
}

impl Cause {
    pub const NAS_NORMAL_RELEASE: Cause = Cause::Nas(0);
    pub const NAS_DEREGISTER: Cause = Cause::Nas(2);
    pub const RADIO_NETWORK_UNSPECIFIED: Cause = Cause::RadioNetwork(0);
    pub const PROTOCOL_ABSTRACT_SYNTAX_ERROR: Cause = Cause::Protocol(2);
}

impl IeValue for Cause {
    ie_id!(Cause, 15);

    fn encode(&self, w: &mut OctetWriter) {
        let (group, value) = match *self {
            Cause::RadioNetwork(v) => (0, v),
            Cause::Transport(v) => (1, v),
            Cause::Nas(v) => (2, v),
            Cause::Protocol(v) => (3, v),
            Cause::Misc(v) => (4, v),
        };
        w.write_octets(&[group, value]);
    }

    fn decode(r: &mut OctetReader) -> Result<Self, NgapError> {
        let group = r.read_octet()?;
        let value = r.read_octet()?;
        Ok(match group {
            0 => Cause::RadioNetwork(value),
            1 => Cause::Transport(value),
            2 => Cause::Nas(value),
            3 => Cause::Protocol(value),
            4 => Cause::Misc(value),
            g => return Err(NgapError::Decode(format!("cause group {g}"))),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Guami {
    pub plmn: [u8; 3],
    pub amf_region_id: Octet,
    pub amf_set_id: Bit10,
    pub amf_pointer: Bit6,
}

impl IeValue for Guami {
    ie_id!(Guami, 28);

    fn encode(&self, w: &mut OctetWriter) {
        w.write_octets(&self.plmn);
        w.write_bits(self.amf_region_id);
        w.write_bits::<16>(self.amf_set_id.concat(self.amf_pointer));
    }

    fn decode(r: &mut OctetReader) -> Result<Self, NgapError> {
        let plmn = read_array(r)?;
        let amf_region_id = r.read_bits()?;
        let set_and_pointer = r.read_u16()? as u64;
        Ok(Guami {
            plmn,
            amf_region_id,
            amf_set_id: Bit10::truncating(set_and_pointer >> 6),
            amf_pointer: Bit6::truncating(set_and_pointer),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Snssai {
    pub sst: u8,
    pub sd: Option<[u8; 3]>,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AllowedNssai(pub Vec<Snssai>);

impl IeValue for AllowedNssai {
    ie_id!(AllowedNssai, 0);

    fn encode(&self, w: &mut OctetWriter) {
        w.write_octet(self.0.len() as u8);
        for s in self.0.iter() {
            match s.sd {
                Some(sd) => {
                    w.write_octets(&[4, s.sst]);
                    w.write_octets(&sd);
                }
                None => w.write_octets(&[1, s.sst]),
            }
        }
    }

    fn decode(r: &mut OctetReader) -> Result<Self, NgapError> {
        let count = r.read_octet()?;
        let mut list = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let snssai = match r.read_octet()? {
                1 => Snssai {
                    sst: r.read_octet()?,
                    sd: None,
                },
                4 => Snssai {
                    sst: r.read_octet()?,
                    sd: Some(read_array(r)?),
                },
                n => return Err(NgapError::Decode(format!("S-NSSAI length {n}"))),
            };
            list.push(snssai);
        }
        Ok(AllowedNssai(list))
    }
}

/// Bitmaps with the first algorithm (EA1 / IA1) in the most significant bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct UeSecurityCapabilities {
    pub nr_encryption: u16,
    pub nr_integrity: u16,
    pub eutra_encryption: u16,
    pub eutra_integrity: u16,
}

impl IeValue for UeSecurityCapabilities {
    ie_id!(UeSecurityCapabilities, 119);

    fn encode(&self, w: &mut OctetWriter) {
        w.write_u16(self.nr_encryption);
        w.write_u16(self.nr_integrity);
        w.write_u16(self.eutra_encryption);
        w.write_u16(self.eutra_integrity);
    }

    fn decode(r: &mut OctetReader) -> Result<Self, NgapError> {
        Ok(UeSecurityCapabilities {
            nr_encryption: r.read_u16()?,
            nr_integrity: r.read_u16()?,
            eutra_encryption: r.read_u16()?,
            eutra_integrity: r.read_u16()?,
        })
    }
}

/// KgNB.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SecurityKey(pub [u8; 32]);

impl std::fmt::Debug for SecurityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecurityKey(..)")
    }
}

impl IeValue for SecurityKey {
    ie_id!(SecurityKey, 94);

    fn encode(&self, w: &mut OctetWriter) {
        w.write_octets(&self.0);
    }

    fn decode(r: &mut OctetReader) -> Result<Self, NgapError> {
        Ok(SecurityKey(read_array(r)?))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FiveGSTmsi {
    pub amf_set_id: Bit10,
    pub amf_pointer: Bit6,
    pub tmsi: Octet4,
}

impl IeValue for FiveGSTmsi {
    ie_id!(FiveGSTmsi, 26);

    fn encode(&self, w: &mut OctetWriter) {
        w.write_bits::<16>(self.amf_set_id.concat(self.amf_pointer));
        w.write_bits(self.tmsi);
    }

    fn decode(r: &mut OctetReader) -> Result<Self, NgapError> {
        let set_and_pointer = r.read_u16()? as u64;
        Ok(FiveGSTmsi {
            amf_set_id: Bit10::truncating(set_and_pointer >> 6),
            amf_pointer: Bit6::truncating(set_and_pointer),
            tmsi: r.read_bits()?,
        })
    }
}
