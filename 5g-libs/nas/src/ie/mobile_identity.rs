//! 5GS mobile identity, TS24.501 9.11.3.4

use super::{IdentityType, IeShape, InformationElement, Plmn, RawIe, invalid, octets};
use crate::{DecodeErrorKind, bcd};
use bits::{Bit6, Bit10, Octet, Octet2, Octet4};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MobileIdentity {
    NoIdentity,
    Suci(Suci),
    Guti(FiveGGuti),
    Imei(String),
    Imeisv(String),
    STmsi(FiveGSTmsi),
    Other { identity_type: IdentityType, value: Vec<u8> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Suci {
    Imsi {
        plmn: Plmn,
        routing_indicator: String,
        protection_scheme: u8,
        home_network_public_key_id: u8,
        scheme_output: Vec<u8>,
    },
    Nai(String),
}

impl Suci {
    pub const NULL_SCHEME: u8 = 0;

    /// SUCI with the null protection scheme, which carries the MSIN in clear.
    pub fn null_scheme(plmn: Plmn, routing_indicator: &str, msin: &str) -> Result<Self, String> {
        if routing_indicator.is_empty() || routing_indicator.len() > 4 {
            return Err(format!("routing indicator {routing_indicator:?}"));
        }
        bcd::encode(routing_indicator)?;
        Ok(Suci::Imsi {
            plmn,
            routing_indicator: routing_indicator.to_string(),
            protection_scheme: Self::NULL_SCHEME,
            home_network_public_key_id: 0,
            scheme_output: bcd::encode(msin)?,
        })
    }

    /// MSIN, available only when the null scheme is used.
    pub fn msin(&self) -> Option<String> {
        match self {
            Suci::Imsi {
                protection_scheme: Self::NULL_SCHEME,
                scheme_output,
                ..
            } => bcd::decode(scheme_output).ok(),
            _ => None,
        }
    }

    /// IMSI digits, for key derivation and logging.
    pub fn imsi(&self) -> Option<String> {
        let Suci::Imsi { plmn, .. } = self else {
            return None;
        };
        Some(format!("{}{}{}", plmn.mcc(), plmn.mnc(), self.msin()?))
    }
}

/// TS23.003, 2.10.1
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FiveGGuti {
    pub plmn: Plmn,
    pub amf_region_id: Octet,
    pub amf_set_id: Bit10,
    pub amf_pointer: Bit6,
    pub tmsi: Octet4,
}

impl FiveGGuti {
    pub fn s_tmsi(&self) -> FiveGSTmsi {
        FiveGSTmsi {
            amf_set_id: self.amf_set_id,
            amf_pointer: self.amf_pointer,
            tmsi: self.tmsi,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FiveGSTmsi {
    pub amf_set_id: Bit10,
    pub amf_pointer: Bit6,
    pub tmsi: Octet4,
}

impl FiveGSTmsi {
    fn octets(&self) -> Vec<u8> {
        let set_and_pointer: Octet2 = self.amf_set_id.concat(self.amf_pointer);
        [set_and_pointer.to_be_octets(), self.tmsi.to_be_octets()].concat()
    }

    fn from_octets(o: &[u8]) -> Self {
        let set_and_pointer = u16::from_be_bytes([o[0], o[1]]) as u64;
        FiveGSTmsi {
            amf_set_id: Bit10::truncating(set_and_pointer >> 6),
            amf_pointer: Bit6::truncating(set_and_pointer),
            tmsi: Octet4::truncating(u32::from_be_bytes([o[2], o[3], o[4], o[5]]) as u64),
        }
    }
}

// Routing indicator: up to 4 BCD digits in 2 octets, unused digits set to 0xF.
fn encode_routing_indicator(ri: &str) -> Vec<u8> {
    let mut o = bcd::encode(ri).unwrap_or_default();
    if o.len() == 1 {
        o.push(0xff);
    }
    o
}

fn decode_routing_indicator(o: &[u8]) -> String {
    [o[0] & 0xf, o[0] >> 4, o[1] & 0xf, o[1] >> 4]
        .into_iter()
        .take_while(|d| *d <= 9)
        .map(|d| (b'0' + d) as char)
        .collect()
}

fn decode_digits(first: u8, rest: &[u8]) -> Result<String, DecodeErrorKind> {
    let rest = bcd::decode(rest).or_else(invalid)?;
    Ok(format!("{}{rest}", first >> 4))
}

fn encode_digits(identity_type: IdentityType, digits: &str) -> Vec<u8> {
    let mut chars = digits.chars();
    let first = chars.next().and_then(|c| bcd::digit(c).ok()).unwrap_or(0);
    let odd = (digits.len() % 2) as u8;
    let mut o = vec![(first << 4) | (odd << 3) | u8::from(identity_type)];
    o.extend(bcd::encode(chars.as_str()).unwrap_or_default());
    o
}

impl InformationElement for MobileIdentity {
    const SHAPE: IeShape = IeShape::Lve { min: 1, max: 65535 };

    fn from_raw(raw: RawIe) -> Result<Self, DecodeErrorKind> {
        let o = octets(raw)?;
        let identity_type = IdentityType::try_from(o[0] & 0x7).unwrap_or(IdentityType::NoIdentity);
        let needs = |n: usize| {
            if o.len() < n {
                invalid(format!("{identity_type:?} identity of {} octets", o.len()))
            } else {
                Ok(())
            }
        };
        Ok(match identity_type {
            IdentityType::NoIdentity => MobileIdentity::NoIdentity,
            IdentityType::Suci => match (o[0] >> 4) & 0x7 {
                0 => {
                    needs(8)?;
                    MobileIdentity::Suci(Suci::Imsi {
                        plmn: Plmn([o[1], o[2], o[3]]),
                        routing_indicator: decode_routing_indicator(&o[4..6]),
                        protection_scheme: o[6] & 0x0f,
                        home_network_public_key_id: o[7],
                        scheme_output: o[8..].to_vec(),
                    })
                }
                1 => MobileIdentity::Suci(Suci::Nai(
                    String::from_utf8(o[1..].to_vec()).or_else(|_| invalid("NAI is not UTF-8"))?,
                )),
                f => return invalid(format!("SUPI format {f}")),
            },
            IdentityType::Guti => {
                needs(11)?;
                let s_tmsi = FiveGSTmsi::from_octets(&o[5..11]);
                MobileIdentity::Guti(FiveGGuti {
                    plmn: Plmn([o[1], o[2], o[3]]),
                    amf_region_id: Octet::truncating(o[4] as u64),
                    amf_set_id: s_tmsi.amf_set_id,
                    amf_pointer: s_tmsi.amf_pointer,
                    tmsi: s_tmsi.tmsi,
                })
            }
            IdentityType::STmsi => {
                needs(7)?;
                MobileIdentity::STmsi(FiveGSTmsi::from_octets(&o[1..7]))
            }
            IdentityType::Imei => MobileIdentity::Imei(decode_digits(o[0], &o[1..])?),
            IdentityType::Imeisv => MobileIdentity::Imeisv(decode_digits(o[0], &o[1..])?),
            identity_type => MobileIdentity::Other {
                identity_type,
                value: o[1..].to_vec(),
            },
        })
    }

    fn to_raw(&self) -> RawIe {
        RawIe::Octets(match self {
            MobileIdentity::NoIdentity => vec![0x00],
            MobileIdentity::Suci(Suci::Imsi {
                plmn,
                routing_indicator,
                protection_scheme,
                home_network_public_key_id,
                scheme_output,
            }) => [
                &[0x01][..],
                &plmn.0[..],
                &encode_routing_indicator(routing_indicator)[..],
                &[*protection_scheme & 0x0f, *home_network_public_key_id][..],
                &scheme_output[..],
            ]
            .concat(),
            MobileIdentity::Suci(Suci::Nai(nai)) => [&[0x11][..], nai.as_bytes()].concat(),
            MobileIdentity::Guti(guti) => [
                &[0xf2][..],
                &guti.plmn.0[..],
                &[guti.amf_region_id.as_u8()][..],
                &guti.s_tmsi().octets()[..],
            ]
            .concat(),
            MobileIdentity::STmsi(s_tmsi) => [vec![0xf4], s_tmsi.octets()].concat(),
            MobileIdentity::Imei(digits) => encode_digits(IdentityType::Imei, digits),
            MobileIdentity::Imeisv(digits) => encode_digits(IdentityType::Imeisv, digits),
            MobileIdentity::Other {
                identity_type,
                value,
            } => [vec![u8::from(*identity_type)], value.clone()].concat(),
        })
    }
}
