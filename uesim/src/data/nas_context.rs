//! nas_context - which NAS messages the UE accepts, and the security it applies to them

use nas::ie::{FiveGmmCause, IdentityType, NasKeySetIdentifier};
use nas::{
    MmMessage, NasError, NasSecurityContext, PlainNasMessage, Role, SecurityHeaderType,
};

#[derive(Default)]
pub struct NasContext {
    security_context: Option<NasSecurityContext>,

    // KAMF from the most recent successful authentication, waiting for a security mode command
    // to take it into use.
    kamf: Option<(NasKeySetIdentifier, [u8; 32])>,
}

impl std::fmt::Debug for NasContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NasContext")
            .field("security_context", &self.security_context)
            .field("kamf_available", &self.kamf.is_some())
            .finish()
    }
}

impl NasContext {
    pub fn set_kamf(&mut self, ngksi: NasKeySetIdentifier, kamf: [u8; 32]) {
        self.kamf = Some((ngksi, kamf));
    }

    pub fn is_active(&self) -> bool {
        self.security_context.is_some()
    }

    pub fn ngksi(&self) -> Option<NasKeySetIdentifier> {
        self.security_context.as_ref().map(|c| c.ngksi())
    }

    pub fn decode(&mut self, data: &[u8]) -> Result<PlainNasMessage, NasError> {
        let security_header_type = nas::security_header_type(data)?;

        if !security_header_type.is_protected() {
            let message = PlainNasMessage::decode(data)?;
            if self.is_active() && !allowed_without_integrity(&message) {
                return Err(NasError::ProtocolViolation(format!(
                    "{} received without integrity protection",
                    message.name()
                )));
            }
            return Ok(message);
        }

        if security_header_type.is_new_context() {
            return self.activate(data, security_header_type);
        }

        let Some(context) = &mut self.security_context else {
            return Err(NasError::NoSecurityContext);
        };
        let (_, message) = context.unprotect(data)?;
        Ok(message)
    }

    // TS33.501, 6.7.2: the security mode command is integrity protected, but not ciphered, with
    // the context it activates.
    fn activate(
        &mut self,
        data: &[u8],
        security_header_type: SecurityHeaderType,
    ) -> Result<PlainNasMessage, NasError> {
        if security_header_type.is_ciphered() {
            return Err(NasError::ProtocolViolation(
                "ciphered message with a new security context".to_string(),
            ));
        }
        let (_, inner) = nas::parse_secured(data)?;
        let PlainNasMessage::Mm(MmMessage::SecurityModeCommand(command)) =
            PlainNasMessage::decode(inner)?
        else {
            return Err(NasError::ProtocolViolation(
                "new security context on a message other than SecurityModeCommand".to_string(),
            ));
        };
        if self.ngksi() == Some(command.ngksi) {
            return Err(NasError::ProtocolViolation(format!(
                "SecurityModeCommand for ngKSI {} which is already in use",
                command.ngksi.ksi
            )));
        }
        let Some((ngksi, kamf)) = &self.kamf else {
            return Err(NasError::NoSecurityContext);
        };
        if command.ngksi.ksi != ngksi.ksi {
            return Err(NasError::ProtocolViolation(format!(
                "SecurityModeCommand ngKSI {} does not match authentication ngKSI {}",
                command.ngksi.ksi, ngksi.ksi
            )));
        }

        let mut candidate = NasSecurityContext::new(
            Role::Ue,
            command.ngksi,
            kamf,
            command.selected_algorithms,
        );
        let (_, message) = candidate.unprotect_new_context(data)?;
        self.security_context = Some(candidate);
        self.kamf = None;
        Ok(message)
    }

    pub fn encode(&mut self, message: &PlainNasMessage) -> Result<Vec<u8>, NasError> {
        match &mut self.security_context {
            Some(context) => {
                context.protect(message, SecurityHeaderType::IntegrityProtectedAndCiphered)
            }
            None => message.encode(),
        }
    }
}

// TS24.501, 4.4.4.2
fn allowed_without_integrity(message: &PlainNasMessage) -> bool {
    let PlainNasMessage::Mm(m) = message else {
        return false;
    };
    match m {
        MmMessage::IdentityRequest(r) => r.identity_type == IdentityType::Suci,
        MmMessage::RegistrationReject(r) => r.cause != FiveGmmCause(76),
        MmMessage::AuthenticationRequest(_)
        | MmMessage::AuthenticationResult(_)
        | MmMessage::AuthenticationReject(_)
        | MmMessage::DeregistrationAcceptUeOriginating(_) => true,
        _ => false,
    }
}
