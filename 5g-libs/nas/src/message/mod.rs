//! message - plain 5GMM and 5GSM messages (TS24.501, 8.2 and 8.3)

mod mm;
mod sm;

pub use mm::*;
pub use sm::*;

use crate::{
    DecodeError, DecodeErrorKind, ExtendedProtocolDiscriminator, MmMessageType, NasError,
    SecurityHeaderType, SmMessageType,
    ie::{FieldDecoder, FieldEncoder},
};
use bits::OctetReader;

/// Declares a message struct together with its field table and the table driven codec.
///
/// Fields are listed in TS24.501 order as `name: Type => mandatory` or
/// `name: Type => optional(iei)`.
macro_rules! nas_message {
    (@type mandatory $ty:ty) => { $ty };
    (@type optional $ty:ty) => { Option<$ty> };
    (@presence mandatory) => { $crate::ie::Presence::Mandatory };
    (@presence optional $iei:expr) => { $crate::ie::Presence::Optional($iei) };
    (@decode $d:ident $field:ident $ty:ty, mandatory) => {
        $d.mandatory::<$ty>(stringify!($field))?
    };
    (@decode $d:ident $field:ident $ty:ty, optional $iei:expr) => {
        $d.optional::<$ty>(stringify!($field), $iei)?
    };
    (@encode $e:ident $field:ident $v:expr, mandatory) => {
        $e.mandatory(stringify!($field), $v)?
    };
    (@encode $e:ident $field:ident $v:expr, optional $iei:expr) => {
        $e.optional(stringify!($field), $iei, $v)?
    };
    (
        $(#[$meta:meta])*
        $name:ident {
            $($field:ident : $ty:ty => $presence:ident $(($iei:expr))?),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct $name {
            $(pub $field: nas_message!(@type $presence $ty),)*
        }

        impl $name {
            pub const FIELDS: &'static [$crate::ie::FieldSpec] = &[
                $($crate::ie::FieldSpec {
                    name: stringify!($field),
                    shape: <$ty as $crate::ie::InformationElement>::SHAPE,
                    presence: nas_message!(@presence $presence $($iei)?),
                },)*
            ];

            #[allow(unused_variables)]
            pub fn decode_fields(d: &mut $crate::ie::FieldDecoder) -> Result<Self, $crate::DecodeError> {
                Ok($name {
                    $($field: nas_message!(@decode d $field $ty, $presence $($iei)?),)*
                })
            }

            #[allow(unused_variables)]
            pub fn encode_fields(&self, e: &mut $crate::ie::FieldEncoder) -> Result<(), $crate::NasError> {
                $(nas_message!(@encode e $field &self.$field, $presence $($iei)?);)*
                Ok(())
            }
        }
    };
}
pub(crate) use nas_message;

/// Generates the message enum for one protocol and its dispatch on message type.
macro_rules! message_set {
    ($enum:ident, $type:ident { $($variant:ident),* $(,)? }) => {
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub enum $enum {
            $($variant($variant),)*
        }

        impl $enum {
            pub fn message_type(&self) -> $type {
                match self {
                    $($enum::$variant(_) => $type::$variant,)*
                }
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $($enum::$variant(_) => stringify!($variant),)*
                }
            }

            fn decode_body(message_type: $type, d: &mut FieldDecoder) -> Result<Self, NasError> {
                Ok(match message_type {
                    $($type::$variant => $enum::$variant($variant::decode_fields(d)?),)*
                    #[allow(unreachable_patterns)]
                    other => {
                        return Err(NasError::UnsupportedField(format!(
                            "message type {other:?}"
                        )))
                    }
                })
            }

            fn encode_body(&self, e: &mut FieldEncoder) -> Result<(), NasError> {
                match self {
                    $($enum::$variant(m) => m.encode_fields(e),)*
                }
            }
        }

        $(
            impl From<$variant> for $enum {
                fn from(m: $variant) -> Self {
                    $enum::$variant(m)
                }
            }
        )*
    };
}

message_set!(MmMessage, MmMessageType {
    RegistrationRequest,
    RegistrationAccept,
    RegistrationComplete,
    RegistrationReject,
    DeregistrationRequestUeOriginating,
    DeregistrationAcceptUeOriginating,
    DeregistrationRequestUeTerminated,
    DeregistrationAcceptUeTerminated,
    AuthenticationRequest,
    AuthenticationResponse,
    AuthenticationReject,
    AuthenticationFailure,
    AuthenticationResult,
    IdentityRequest,
    IdentityResponse,
    SecurityModeCommand,
    SecurityModeComplete,
    SecurityModeReject,
    FiveGmmStatus,
    UlNasTransport,
    DlNasTransport,
});

message_set!(SmMessage, SmMessageType {
    PduSessionEstablishmentRequest,
    PduSessionEstablishmentReject,
    FiveGsmStatus,
});

/// The 5GSM header fields that follow the protocol discriminator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SmHeader {
    pub pdu_session_id: u8,
    pub pti: u8,
}

/// A NAS message with a plain header, either sent as is or carried inside a security envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlainNasMessage {
    Mm(MmMessage),
    Sm(SmHeader, SmMessage),
}

impl PlainNasMessage {
    pub fn name(&self) -> &'static str {
        match self {
            PlainNasMessage::Mm(m) => m.name(),
            PlainNasMessage::Sm(_, m) => m.name(),
        }
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, NasError> {
        let mut reader = OctetReader::new(bytes);
        let header = |e: bits::BitsError| {
            let (offset, expected, actual) = match e {
                bits::BitsError::Truncated {
                    offset,
                    needed,
                    remaining,
                } => (offset, needed, remaining),
                _ => (0, 3, bytes.len()),
            };
            DecodeError::new("header", offset, DecodeErrorKind::Truncated { expected, actual })
        };

        let epd = reader.read_octet().map_err(header)?;
        let message = match ExtendedProtocolDiscriminator::try_from(epd) {
            Ok(ExtendedProtocolDiscriminator::MobilityManagement) => {
                let sht = reader.read_octet().map_err(header)? & 0x0f;
                if sht != u8::from(SecurityHeaderType::NotProtected) {
                    return Err(NasError::ProtocolViolation(format!(
                        "security header type {sht} on a plain message"
                    )));
                }
                let message_type = reader.read_octet().map_err(header)?;
                let Ok(message_type) = MmMessageType::try_from(message_type) else {
                    return Err(unknown_type(2, message_type));
                };
                let mut d = FieldDecoder::new(reader);
                let m = MmMessage::decode_body(message_type, &mut d)?;
                d.finish()?;
                PlainNasMessage::Mm(m)
            }
            Ok(ExtendedProtocolDiscriminator::SessionManagement) => {
                let pdu_session_id = reader.read_octet().map_err(header)?;
                let pti = reader.read_octet().map_err(header)?;
                let message_type = reader.read_octet().map_err(header)?;
                let Ok(message_type) = SmMessageType::try_from(message_type) else {
                    return Err(unknown_type(3, message_type));
                };
                let mut d = FieldDecoder::new(reader);
                let m = SmMessage::decode_body(message_type, &mut d)?;
                d.finish()?;
                PlainNasMessage::Sm(SmHeader { pdu_session_id, pti }, m)
            }
            Err(_) => {
                return Err(DecodeError::new(
                    "extended protocol discriminator",
                    0,
                    DecodeErrorKind::UnknownProtocolDiscriminator(epd),
                )
                .into());
            }
        };
        Ok(message)
    }

    pub fn encode(&self) -> Result<Vec<u8>, NasError> {
        let mut e = FieldEncoder::default();
        match self {
            PlainNasMessage::Mm(m) => {
                e.write_octets(&[
                    u8::from(ExtendedProtocolDiscriminator::MobilityManagement),
                    u8::from(SecurityHeaderType::NotProtected),
                    u8::from(m.message_type()),
                ]);
                m.encode_body(&mut e)?;
            }
            PlainNasMessage::Sm(header, m) => {
                e.write_octets(&[
                    u8::from(ExtendedProtocolDiscriminator::SessionManagement),
                    header.pdu_session_id,
                    header.pti,
                    u8::from(m.message_type()),
                ]);
                m.encode_body(&mut e)?;
            }
        }
        e.finish()
    }
}

impl From<MmMessage> for PlainNasMessage {
    fn from(m: MmMessage) -> Self {
        PlainNasMessage::Mm(m)
    }
}

fn unknown_type(offset: usize, message_type: u8) -> NasError {
    DecodeError::new(
        "message type",
        offset,
        DecodeErrorKind::UnknownMessageType(message_type),
    )
    .into()
}
