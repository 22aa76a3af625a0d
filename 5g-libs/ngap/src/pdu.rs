use crate::NgapError;
use bits::{OctetReader, OctetWriter};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// TS38.413, 9.3.1.1
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum Criticality {
    Reject = 0,
    Ignore = 1,
    Notify = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum PduDescription {
    InitiatingMessage = 0,
    SuccessfulOutcome = 1,
    UnsuccessfulOutcome = 2,
}

/// TS38.413, 9.4.7
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum ProcedureCode {
    DownlinkNasTransport = 4,
    ErrorIndication = 9,
    InitialContextSetup = 14,
    InitialUeMessage = 15,
    UeContextRelease = 41,
    UplinkNasTransport = 46,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtocolIeField {
    pub id: u16,
    pub criticality: Criticality,
    pub value: Vec<u8>,
}

/// IEs in the order they were added or received.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ProtocolIeContainer(pub Vec<ProtocolIeField>);

impl ProtocolIeContainer {
    pub fn push(&mut self, id: u16, criticality: Criticality, value: Vec<u8>) {
        self.0.push(ProtocolIeField {
            id,
            criticality,
            value,
        })
    }

    pub fn with_id(&self, id: u16) -> impl Iterator<Item = &ProtocolIeField> {
        self.0.iter().filter(move |ie| ie.id == id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NgapPdu {
    pub description: PduDescription,
    pub procedure: ProcedureCode,
    pub criticality: Criticality,
    pub ies: ProtocolIeContainer,
}

impl NgapPdu {
    pub fn to_bytes(&self) -> Result<Vec<u8>, NgapError> {
        let mut w = OctetWriter::new();
        w.write_octet(self.description.into());
        w.write_octet(self.procedure.into());
        w.write_octet(self.criticality.into());
        w.write_u16(length_field(self.ies.0.len(), "IE count")?);
        for ie in self.ies.0.iter() {
            w.write_u16(ie.id);
            w.write_octet(ie.criticality.into());
            w.write_u16(length_field(ie.value.len(), "IE length")?);
            w.write_octets(&ie.value);
        }
        w.into_octets()
            .map_err(|e| NgapError::Encode(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, NgapError> {
        let mut r = OctetReader::new(bytes);
        let description = enumerated(&mut r, "PDU description")?;
        let procedure = enumerated(&mut r, "procedure code")?;
        let criticality = enumerated(&mut r, "criticality")?;
        let count = r.read_u16()?;
        let mut ies = ProtocolIeContainer::default();
        for _ in 0..count {
            let id = r.read_u16()?;
            let criticality = enumerated(&mut r, "IE criticality")?;
            let len = r.read_u16()? as usize;
            ies.push(id, criticality, r.read_octets(len)?.to_vec());
        }
        if !r.is_empty() {
            return Err(NgapError::Decode(format!(
                "{} trailing octets after {count} IEs",
                r.remaining()
            )));
        }
        Ok(NgapPdu {
            description,
            procedure,
            criticality,
            ies,
        })
    }
}

fn length_field(len: usize, what: &str) -> Result<u16, NgapError> {
    u16::try_from(len).map_err(|_| NgapError::Encode(format!("{what} {len} does not fit 16 bits")))
}

fn enumerated<T: TryFrom<u8>>(r: &mut OctetReader, what: &str) -> Result<T, NgapError> {
    let offset = r.offset();
    let value = r.read_octet()?;
    T::try_from(value)
        .map_err(|_| NgapError::Decode(format!("bad {what} {value} at offset {offset}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn framing() {
        let mut ies = ProtocolIeContainer::default();
        ies.push(85, Criticality::Reject, vec![0, 0, 0, 1]);
        ies.push(38, Criticality::Reject, vec![0x7e, 0x00, 0x43]);
        let pdu = NgapPdu {
            description: PduDescription::InitiatingMessage,
            procedure: ProcedureCode::UplinkNasTransport,
            criticality: Criticality::Ignore,
            ies,
        };
        let bytes = pdu.to_bytes().unwrap();
        assert_eq!(
            bytes,
            hex!("00 2e 01 0002 0055 00 0004 00000001 0026 00 0003 7e0043")
        );
        assert_eq!(NgapPdu::from_bytes(&bytes).unwrap(), pdu);
    }

    #[test]
    fn oversized_ie_is_an_encode_error() {
        let mut ies = ProtocolIeContainer::default();
        ies.push(38, Criticality::Reject, vec![0; 0x1_0000]);
        let pdu = NgapPdu {
            description: PduDescription::InitiatingMessage,
            procedure: ProcedureCode::UplinkNasTransport,
            criticality: Criticality::Ignore,
            ies,
        };
        assert!(matches!(pdu.to_bytes(), Err(NgapError::Encode(_))));

        let mut ies = ProtocolIeContainer::default();
        for _ in 0..0x1_0000 {
            ies.push(85, Criticality::Reject, vec![]);
        }
        let pdu = NgapPdu { ies, ..pdu };
        assert!(matches!(pdu.to_bytes(), Err(NgapError::Encode(_))));
    }

    #[test]
    fn malformed_frames_are_rejected() {
        // Unknown procedure code.
        assert!(NgapPdu::from_bytes(&hex!("00 63 01 0000")).is_err());
        // IE value overruns the frame.
        assert!(NgapPdu::from_bytes(&hex!("00 2e 01 0001 0055 00 0004 0000")).is_err());
        // Trailing junk.
        assert!(NgapPdu::from_bytes(&hex!("00 2e 01 0000 ff")).is_err());
        assert!(NgapPdu::from_bytes(&[]).is_err());
    }
}
