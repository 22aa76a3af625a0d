//! eap - EAP packets (RFC3748) as carried in the EAP message IE, and the EAP-AKA' method (RFC5448)

use crate::{DecodeError, DecodeErrorKind, NasError};
use bits::{BitsError, OctetReader, OctetWriter};
use num_enum::{IntoPrimitive, TryFromPrimitive};

pub const EAP_TYPE_AKA_PRIME: u8 = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum EapCode {
    Request = 1,
    Response = 2,
    Success = 3,
    Failure = 4,
}

/// RFC4187, 11.
#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum AkaSubtype {
    Challenge = 1,
    AuthenticationReject = 2,
    SynchronizationFailure = 4,
    Identity = 5,
    Notification = 12,
    ClientError = 14,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributeType(pub u8);

impl AttributeType {
    pub const AT_RAND: Self = AttributeType(1);
    pub const AT_AUTN: Self = AttributeType(2);
    pub const AT_RES: Self = AttributeType(3);
    pub const AT_AUTS: Self = AttributeType(4);
    pub const AT_MAC: Self = AttributeType(11);
    pub const AT_CLIENT_ERROR_CODE: Self = AttributeType(22);
    pub const AT_KDF_INPUT: Self = AttributeType(23);
    pub const AT_KDF: Self = AttributeType(24);
}

/// An attribute value, without its type and length octets but with any reserved octets and
/// padding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub kind: AttributeType,
    pub value: Vec<u8>,
}

/// An EAP-AKA' packet.  Attributes keep their order and padding, so a decoded packet encodes
/// back to the octets that its AT_MAC covers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EapAkaPrime {
    pub code: EapCode,
    pub id: u8,
    pub subtype: AkaSubtype,
    pub attributes: Vec<Attribute>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EapPacket {
    Success { id: u8 },
    Failure { id: u8 },
    AkaPrime(EapAkaPrime),
    Other {
        code: EapCode,
        id: u8,
        eap_type: u8,
        data: Vec<u8>,
    },
}

fn truncated(field: &'static str) -> impl Fn(BitsError) -> NasError {
    move |e| {
        let (offset, kind) = match e {
            BitsError::Truncated {
                offset,
                needed,
                remaining,
            } => (
                offset,
                DecodeErrorKind::Truncated {
                    expected: needed,
                    actual: remaining,
                },
            ),
            other => (0, DecodeErrorKind::InvalidValue(other.to_string())),
        };
        DecodeError::new(field, offset, kind).into()
    }
}

fn invalid(field: &'static str, offset: usize, value: impl std::fmt::Display) -> NasError {
    DecodeError::new(field, offset, DecodeErrorKind::InvalidValue(value.to_string())).into()
}

impl EapPacket {
    pub fn code(&self) -> EapCode {
        match self {
            EapPacket::Success { .. } => EapCode::Success,
            EapPacket::Failure { .. } => EapCode::Failure,
            EapPacket::AkaPrime(p) => p.code,
            EapPacket::Other { code, .. } => *code,
        }
    }

    pub fn id(&self) -> u8 {
        match self {
            EapPacket::Success { id } | EapPacket::Failure { id } => *id,
            EapPacket::AkaPrime(p) => p.id,
            EapPacket::Other { id, .. } => *id,
        }
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, NasError> {
        let mut r = OctetReader::new(bytes);
        let code = r.read_octet().map_err(truncated("EAP code"))?;
        let code = EapCode::try_from(code).map_err(|_| invalid("EAP code", 0, code))?;
        let id = r.read_octet().map_err(truncated("EAP identifier"))?;
        let length = r.read_u16().map_err(truncated("EAP length"))? as usize;
        if length < 4 || length > bytes.len() {
            return Err(DecodeError::new(
                "EAP length",
                2,
                DecodeErrorKind::LengthOutOfRange {
                    length,
                    min: 4,
                    max: bytes.len(),
                },
            )
            .into());
        }
        let mut r = OctetReader::new(&bytes[..length]);
        r.read_octets(4).map_err(truncated("EAP header"))?;

        match code {
            EapCode::Success | EapCode::Failure if length != 4 => Err(DecodeError::new(
                "EAP length",
                2,
                DecodeErrorKind::LengthOutOfRange {
                    length,
                    min: 4,
                    max: 4,
                },
            )
            .into()),
            EapCode::Success => Ok(EapPacket::Success { id }),
            EapCode::Failure => Ok(EapPacket::Failure { id }),
            EapCode::Request | EapCode::Response => {
                let eap_type = r.read_octet().map_err(truncated("EAP type"))?;
                if eap_type != EAP_TYPE_AKA_PRIME {
                    return Ok(EapPacket::Other {
                        code,
                        id,
                        eap_type,
                        data: r.read_rest().to_vec(),
                    });
                }
                let subtype = r.read_octet().map_err(truncated("EAP-AKA' subtype"))?;
                let subtype = AkaSubtype::try_from(subtype)
                    .map_err(|_| invalid("EAP-AKA' subtype", 5, subtype))?;
                r.read_u16().map_err(truncated("EAP-AKA' reserved"))?;

                let mut attributes = vec![];
                while !r.is_empty() {
                    let offset = r.offset();
                    let kind = r.read_octet().map_err(truncated("EAP-AKA' attribute"))?;
                    let kind = AttributeType(kind);
                    let units = r.read_octet().map_err(truncated("EAP-AKA' attribute"))?;
                    let units = units as usize;
                    if units == 0 {
                        return Err(invalid("EAP-AKA' attribute length", offset + 1, 0));
                    }
                    let value = r
                        .read_octets(units * 4 - 2)
                        .map_err(truncated("EAP-AKA' attribute"))?;
                    attributes.push(Attribute {
                        kind,
                        value: value.to_vec(),
                    });
                }
                Ok(EapPacket::AkaPrime(EapAkaPrime {
                    code,
                    id,
                    subtype,
                    attributes,
                }))
            }
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, NasError> {
        let (code, id, body) = match self {
            EapPacket::Success { id } => (EapCode::Success, *id, vec![]),
            EapPacket::Failure { id } => (EapCode::Failure, *id, vec![]),
            EapPacket::AkaPrime(p) => (p.code, p.id, p.encode_body()?),
            EapPacket::Other {
                code,
                id,
                eap_type,
                data,
            } => (*code, *id, [[*eap_type].as_slice(), data.as_slice()].concat()),
        };
        let length = u16::try_from(4 + body.len())
            .map_err(|_| NasError::Encode(format!("EAP packet of {} octets", 4 + body.len())))?;
        let mut w = OctetWriter::new();
        w.write_octet(code.into());
        w.write_octet(id);
        w.write_u16(length);
        w.write_octets(&body);
        w.into_octets()
            .map_err(|e| NasError::Encode(e.to_string()))
    }
}

impl EapAkaPrime {
    pub fn new(code: EapCode, id: u8, subtype: AkaSubtype) -> Self {
        EapAkaPrime {
            code,
            id,
            subtype,
            attributes: vec![],
        }
    }

    fn encode_body(&self) -> Result<Vec<u8>, NasError> {
        let mut w = OctetWriter::new();
        w.write_octet(EAP_TYPE_AKA_PRIME);
        w.write_octet(self.subtype.into());
        w.write_u16(0);
        for a in &self.attributes {
            let len = a.value.len() + 2;
            let units = u8::try_from(len / 4)
                .ok()
                .filter(|_| len % 4 == 0)
                .ok_or_else(|| {
                    NasError::Encode(format!("EAP-AKA' attribute {} of {len} octets", a.kind.0))
                })?;
            w.write_octet(a.kind.0);
            w.write_octet(units);
            w.write_octets(&a.value);
        }
        w.into_octets()
            .map_err(|e| NasError::Encode(e.to_string()))
    }

    /// Appends an attribute, zero padding its value to a multiple of four octets.
    pub fn push(&mut self, kind: AttributeType, mut value: Vec<u8>) -> &mut Self {
        while (value.len() + 2) % 4 != 0 {
            value.push(0);
        }
        self.attributes.push(Attribute { kind, value });
        self
    }

    /// RAND, AUTN and MAC follow two reserved octets.
    pub fn push_reserved(&mut self, kind: AttributeType, value: &[u8]) -> &mut Self {
        self.push(kind, [[0u8, 0].as_slice(), value].concat())
    }

    /// RFC4187, 10.8: the RES length is given in bits.
    pub fn push_res(&mut self, res: &[u8]) -> &mut Self {
        let bits = (res.len() as u16) * 8;
        self.push(
            AttributeType::AT_RES,
            [bits.to_be_bytes().as_slice(), res].concat(),
        )
    }

    pub fn push_kdf(&mut self, kdf: u16) -> &mut Self {
        self.push(AttributeType::AT_KDF, kdf.to_be_bytes().to_vec())
    }

    pub fn push_kdf_input(&mut self, network_name: &[u8]) -> &mut Self {
        let len = network_name.len() as u16;
        self.push(
            AttributeType::AT_KDF_INPUT,
            [len.to_be_bytes().as_slice(), network_name].concat(),
        )
    }

    pub fn attribute(&self, kind: AttributeType) -> Option<&[u8]> {
        self.attributes
            .iter()
            .find(|a| a.kind == kind)
            .map(|a| a.value.as_slice())
    }

    fn reserved_16(&self, kind: AttributeType) -> Option<[u8; 16]> {
        self.attribute(kind)?.get(2..18)?.try_into().ok()
    }

    pub fn rand(&self) -> Option<[u8; 16]> {
        self.reserved_16(AttributeType::AT_RAND)
    }

    pub fn autn(&self) -> Option<[u8; 16]> {
        self.reserved_16(AttributeType::AT_AUTN)
    }

    pub fn mac(&self) -> Option<[u8; 16]> {
        self.reserved_16(AttributeType::AT_MAC)
    }

    pub fn res(&self) -> Option<&[u8]> {
        let value = self.attribute(AttributeType::AT_RES)?;
        let bits = u16::from_be_bytes(value.get(0..2)?.try_into().ok()?) as usize;
        value.get(2..2 + bits.div_ceil(8))
    }

    pub fn auts(&self) -> Option<[u8; 14]> {
        self.attribute(AttributeType::AT_AUTS)?.get(0..14)?.try_into().ok()
    }

    pub fn kdf_input(&self) -> Option<&[u8]> {
        let value = self.attribute(AttributeType::AT_KDF_INPUT)?;
        let len = u16::from_be_bytes(value.get(0..2)?.try_into().ok()?) as usize;
        value.get(2..2 + len)
    }

    /// The offered key derivation functions, most preferred first.
    pub fn kdfs(&self) -> impl Iterator<Item = u16> + '_ {
        self.attributes
            .iter()
            .filter(|a| a.kind == AttributeType::AT_KDF)
            .filter_map(|a| Some(u16::from_be_bytes(a.value.get(0..2)?.try_into().ok()?)))
    }

    pub fn client_error_code(&self) -> Option<u16> {
        let value = self.attribute(AttributeType::AT_CLIENT_ERROR_CODE)?;
        Some(u16::from_be_bytes(value.get(0..2)?.try_into().ok()?))
    }

    fn set_mac(&mut self, mac: [u8; 16]) {
        if let Some(a) = self
            .attributes
            .iter_mut()
            .find(|a| a.kind == AttributeType::AT_MAC)
        {
            a.value = [[0u8, 0].as_slice(), mac.as_slice()].concat();
        }
    }

    /// The packet as the MAC sees it, with the AT_MAC value zeroed.
    fn mac_input(&self) -> Result<Vec<u8>, NasError> {
        let mut zeroed = self.clone();
        zeroed.set_mac([0; 16]);
        EapPacket::AkaPrime(zeroed).encode()
    }

    /// Adds AT_MAC as the last attribute, or fills in the existing one.
    pub fn sign(&mut self, mac: impl FnOnce(&[u8]) -> [u8; 16]) -> Result<(), NasError> {
        if self.attribute(AttributeType::AT_MAC).is_none() {
            self.push_reserved(AttributeType::AT_MAC, &[0; 16]);
        }
        let value = mac(&self.mac_input()?);
        self.set_mac(value);
        Ok(())
    }

    /// False when AT_MAC is missing or wrong.
    pub fn mac_matches(&self, mac: impl FnOnce(&[u8]) -> [u8; 16]) -> Result<bool, NasError> {
        let Some(received) = self.mac() else {
            return Ok(false);
        };
        Ok(mac(&self.mac_input()?) == received)
    }
}

impl From<EapAkaPrime> for EapPacket {
    fn from(p: EapAkaPrime) -> Self {
        EapPacket::AkaPrime(p)
    }
}
