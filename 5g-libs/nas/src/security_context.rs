//! security_context - NAS security envelope (TS24.501, 4.4 and 9.1.1; TS33.501, 6.4)

use crate::ie::{NasKeySetIdentifier, NasSecurityAlgorithms};
use crate::{
    DecodeError, DecodeErrorKind, ExtendedProtocolDiscriminator, NasError, PlainNasMessage,
    SecurityHeaderType,
};
use bits::BitString;
use security::{
    CipheringAlgorithm, Direction, NAS_BEARER_3GPP, apply_cipher, compute_mac, derive_knas_enc,
    derive_knas_int,
};

/// Which end of the N1 interface a context belongs to.  This fixes the transmit direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Ue,
    Network,
}

/// 24 bit NAS COUNT = overflow (16 bits) || SQN (8 bits).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NasCount {
    overflow: u16,
    sqn: u8,
}

impl NasCount {
    pub fn new(overflow: u16, sqn: u8) -> Self {
        NasCount { overflow, sqn }
    }

    pub fn overflow(&self) -> u16 {
        self.overflow
    }

    pub fn sqn(&self) -> u8 {
        self.sqn
    }

    pub fn value(&self) -> u32 {
        ((self.overflow as u32) << 8) | self.sqn as u32
    }

    fn next(self) -> Self {
        match self.sqn.checked_add(1) {
            Some(sqn) => NasCount { sqn, ..self },
            None => NasCount {
                overflow: self.overflow.wrapping_add(1),
                sqn: 0,
            },
        }
    }

    // TS24.501, 4.4.3.1: a received SQN below the expected one means the overflow has wrapped.
    fn estimate(self, received_sqn: u8) -> Self {
        let overflow = if received_sqn < self.sqn {
            self.overflow.wrapping_add(1)
        } else {
            self.overflow
        };
        NasCount {
            overflow,
            sqn: received_sqn,
        }
    }
}

/// Header of a security protected 5GMM message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SecuredHeader {
    pub security_header_type: SecurityHeaderType,
    pub mac: [u8; 4],
    pub sqn: u8,
}

const SECURED_HEADER_LEN: usize = 7;

/// Security header type of an encoded NAS message.  5GSM messages are always reported as not
/// protected.
pub fn security_header_type(bytes: &[u8]) -> Result<SecurityHeaderType, NasError> {
    let truncated = || {
        NasError::from(DecodeError::new(
            "security header type",
            bytes.len(),
            DecodeErrorKind::Truncated {
                expected: 2,
                actual: bytes.len(),
            },
        ))
    };
    let epd = *bytes.first().ok_or_else(truncated)?;
    match ExtendedProtocolDiscriminator::try_from(epd) {
        Ok(ExtendedProtocolDiscriminator::MobilityManagement) => {
            let sht = bytes.get(1).ok_or_else(truncated)? & 0x0f;
            SecurityHeaderType::try_from(sht).map_err(|_| {
                DecodeError::new(
                    "security header type",
                    1,
                    DecodeErrorKind::InvalidValue(format!("{sht}")),
                )
                .into()
            })
        }
        Ok(ExtendedProtocolDiscriminator::SessionManagement) => Ok(SecurityHeaderType::NotProtected),
        Err(_) => Err(DecodeError::new(
            "extended protocol discriminator",
            0,
            DecodeErrorKind::UnknownProtocolDiscriminator(epd),
        )
        .into()),
    }
}

/// Splits a security protected message into its header and the inner (possibly ciphered) message.
pub fn parse_secured(bytes: &[u8]) -> Result<(SecuredHeader, &[u8]), NasError> {
    let security_header_type = security_header_type(bytes)?;
    if !security_header_type.is_protected() {
        return Err(NasError::ProtocolViolation(
            "message is not security protected".to_string(),
        ));
    }
    if bytes.len() <= SECURED_HEADER_LEN {
        return Err(DecodeError::new(
            "security protected header",
            0,
            DecodeErrorKind::Truncated {
                expected: SECURED_HEADER_LEN + 1,
                actual: bytes.len(),
            },
        )
        .into());
    }
    let header = SecuredHeader {
        security_header_type,
        mac: [bytes[2], bytes[3], bytes[4], bytes[5]],
        sqn: bytes[6],
    };
    Ok((header, &bytes[SECURED_HEADER_LEN..]))
}

/// A NAS security context.  The counts only advance through [`protect`](Self::protect) in the
/// transmit direction and [`unprotect`](Self::unprotect) in the receive direction.
#[derive(Clone)]
pub struct NasSecurityContext {
    role: Role,
    ngksi: NasKeySetIdentifier,
    k_nas_int: [u8; 16],
    k_nas_enc: [u8; 16],
    algorithms: NasSecurityAlgorithms,
    uplink: NasCount,
    downlink: NasCount,
}

impl NasSecurityContext {
    /// Derives KNASint and KNASenc from KAMF for the selected algorithms.
    pub fn new(
        role: Role,
        ngksi: NasKeySetIdentifier,
        kamf: &[u8; 32],
        algorithms: NasSecurityAlgorithms,
    ) -> Self {
        NasSecurityContext {
            role,
            ngksi,
            k_nas_int: derive_knas_int(kamf, algorithms.integrity),
            k_nas_enc: derive_knas_enc(kamf, algorithms.ciphering),
            algorithms,
            uplink: NasCount::default(),
            downlink: NasCount::default(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn ngksi(&self) -> NasKeySetIdentifier {
        self.ngksi
    }

    pub fn algorithms(&self) -> NasSecurityAlgorithms {
        self.algorithms
    }

    pub fn uplink_count(&self) -> NasCount {
        self.uplink
    }

    pub fn downlink_count(&self) -> NasCount {
        self.downlink
    }

    fn tx_direction(&self) -> Direction {
        match self.role {
            Role::Ue => Direction::Uplink,
            Role::Network => Direction::Downlink,
        }
    }

    fn rx_direction(&self) -> Direction {
        match self.role {
            Role::Ue => Direction::Downlink,
            Role::Network => Direction::Uplink,
        }
    }

    fn count_mut(&mut self, direction: Direction) -> &mut NasCount {
        match direction {
            Direction::Uplink => &mut self.uplink,
            Direction::Downlink => &mut self.downlink,
        }
    }

    /// Encodes, ciphers (if the header type says so) and integrity protects a message.
    pub fn protect(
        &mut self,
        message: &PlainNasMessage,
        security_header_type: SecurityHeaderType,
    ) -> Result<Vec<u8>, NasError> {
        if !security_header_type.is_protected() {
            return Err(NasError::ProtocolViolation(format!(
                "cannot protect with {security_header_type:?}"
            )));
        }
        let direction = self.tx_direction();
        if security_header_type.is_new_context() {
            *self.count_mut(direction) = NasCount::default();
        }
        let count = *self.count_mut(direction);

        let mut inner = message.encode()?;
        if security_header_type.is_ciphered() {
            self.cipher(count, direction, &mut inner);
        }
        let mac = self.mac(count, direction, &inner)?;

        let mut secured = Vec::with_capacity(SECURED_HEADER_LEN + inner.len());
        secured.push(ExtendedProtocolDiscriminator::MobilityManagement.into());
        secured.push(security_header_type.into());
        secured.extend_from_slice(&mac);
        secured.push(count.sqn);
        secured.extend_from_slice(&inner);

        *self.count_mut(direction) = count.next();
        Ok(secured)
    }

    /// Checks the MAC, deciphers and decodes a message protected with this (already established)
    /// context.  Once a context is in use every message in the receive direction must be
    /// integrity protected and ciphered (TS24.501, 4.4.5).  On failure the counts are left as
    /// they were.
    pub fn unprotect(
        &mut self,
        bytes: &[u8],
    ) -> Result<(SecurityHeaderType, PlainNasMessage), NasError> {
        self.verify_and_decode(bytes, |sht| {
            sht == SecurityHeaderType::IntegrityProtectedAndCiphered
        })
    }

    /// As [`unprotect`](Self::unprotect), for the message that takes a new context into use.  Only
    /// the "new security context" header types are accepted, and the receive count restarts at 0.
    pub fn unprotect_new_context(
        &mut self,
        bytes: &[u8],
    ) -> Result<(SecurityHeaderType, PlainNasMessage), NasError> {
        self.verify_and_decode(bytes, SecurityHeaderType::is_new_context)
    }

    fn verify_and_decode(
        &mut self,
        bytes: &[u8],
        header_allowed: impl Fn(SecurityHeaderType) -> bool,
    ) -> Result<(SecurityHeaderType, PlainNasMessage), NasError> {
        if bytes.len() <= SECURED_HEADER_LEN {
            return Err(DecodeError::new(
                "security protected header",
                0,
                DecodeErrorKind::Truncated {
                    expected: SECURED_HEADER_LEN + 1,
                    actual: bytes.len(),
                },
            )
            .into());
        }
        let received = [bytes[2], bytes[3], bytes[4], bytes[5]];
        let inner = &bytes[SECURED_HEADER_LEN..];

        // The EPD and security header type are outside the MAC, so they have to be exactly what
        // this context expects.  The spare half octet must be zero.
        let header = (bytes[0] == u8::from(ExtendedProtocolDiscriminator::MobilityManagement))
            .then(|| SecurityHeaderType::try_from(bytes[1]).ok())
            .flatten()
            .filter(|sht| header_allowed(*sht));

        let direction = self.rx_direction();
        let stored = match header {
            Some(sht) if sht.is_new_context() => NasCount::default(),
            _ => *self.count_mut(direction),
        };
        let count = stored.estimate(bytes[6]);
        let expected = self.mac(count, direction, inner)?;

        let Some(security_header_type) = header else {
            return Err(NasError::Authentication {
                reason: "unexpected security header",
                expected,
                received,
            });
        };
        if expected != received {
            return Err(NasError::Authentication {
                reason: "MAC mismatch",
                expected,
                received,
            });
        }

        let mut plain = inner.to_vec();
        if security_header_type.is_ciphered() {
            self.cipher(count, direction, &mut plain);
        }
        let message = PlainNasMessage::decode(&plain)?;
        *self.count_mut(direction) = count.next();
        Ok((security_header_type, message))
    }

    // The MAC covers the sequence number and the (ciphered) inner message.
    fn mac(&self, count: NasCount, direction: Direction, inner: &[u8]) -> Result<[u8; 4], NasError> {
        let mut covered = Vec::with_capacity(inner.len() + 1);
        covered.push(count.sqn);
        covered.extend_from_slice(inner);
        let covered = BitString::from_octets(&covered);
        compute_mac(
            self.algorithms.integrity,
            &self.k_nas_int,
            count.value(),
            NAS_BEARER_3GPP,
            direction,
            covered.as_bitslice(),
        )
        .map_err(|e| NasError::ProtocolViolation(e.to_string()))
    }

    fn cipher(&self, count: NasCount, direction: Direction, data: &mut [u8]) {
        if self.algorithms.ciphering != CipheringAlgorithm::Nea0 {
            apply_cipher(
                self.algorithms.ciphering,
                &self.k_nas_enc,
                count.value(),
                NAS_BEARER_3GPP,
                direction,
                data,
            );
        }
    }
}

impl std::fmt::Debug for NasSecurityContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NasSecurityContext")
            .field("role", &self.role)
            .field("ngksi", &self.ngksi)
            .field("algorithms", &self.algorithms)
            .field("uplink", &self.uplink)
            .field("downlink", &self.downlink)
            .finish_non_exhaustive()
    }
}
