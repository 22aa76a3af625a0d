use num_enum::{IntoPrimitive, TryFromPrimitive};

/// TS24.007, 11.2.3.1.1A
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum ExtendedProtocolDiscriminator {
    SessionManagement = 0x2e,
    MobilityManagement = 0x7e,
}

/// TS24.501, 9.3.1
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum SecurityHeaderType {
    NotProtected = 0,
    IntegrityProtected = 1,
    IntegrityProtectedAndCiphered = 2,
    IntegrityProtectedWithNewSecurityContext = 3,
    IntegrityProtectedAndCipheredWithNewSecurityContext = 4,
}

impl SecurityHeaderType {
    pub fn is_protected(self) -> bool {
        self != SecurityHeaderType::NotProtected
    }

    pub fn is_ciphered(self) -> bool {
        matches!(
            self,
            SecurityHeaderType::IntegrityProtectedAndCiphered
                | SecurityHeaderType::IntegrityProtectedAndCipheredWithNewSecurityContext
        )
    }

    pub fn is_new_context(self) -> bool {
        matches!(
            self,
            SecurityHeaderType::IntegrityProtectedWithNewSecurityContext
                | SecurityHeaderType::IntegrityProtectedAndCipheredWithNewSecurityContext
        )
    }
}

/// TS24.501, 9.7, table 9.7.1
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum MmMessageType {
    RegistrationRequest = 0x41,
    RegistrationAccept = 0x42,
    RegistrationComplete = 0x43,
    RegistrationReject = 0x44,
    DeregistrationRequestUeOriginating = 0x45,
    DeregistrationAcceptUeOriginating = 0x46,
    DeregistrationRequestUeTerminated = 0x47,
    DeregistrationAcceptUeTerminated = 0x48,
    ServiceRequest = 0x4c,
    ServiceReject = 0x4d,
    ServiceAccept = 0x4e,
    ControlPlaneServiceRequest = 0x4f,
    NetworkSliceSpecificAuthenticationCommand = 0x50,
    NetworkSliceSpecificAuthenticationComplete = 0x51,
    NetworkSliceSpecificAuthenticationResult = 0x52,
    ConfigurationUpdateCommand = 0x54,
    ConfigurationUpdateComplete = 0x55,
    AuthenticationRequest = 0x56,
    AuthenticationResponse = 0x57,
    AuthenticationReject = 0x58,
    AuthenticationFailure = 0x59,
    AuthenticationResult = 0x5a,
    IdentityRequest = 0x5b,
    IdentityResponse = 0x5c,
    SecurityModeCommand = 0x5d,
    SecurityModeComplete = 0x5e,
    SecurityModeReject = 0x5f,
    FiveGmmStatus = 0x64,
    Notification = 0x65,
    NotificationResponse = 0x66,
    UlNasTransport = 0x67,
    DlNasTransport = 0x68,
}

/// TS24.501, 9.7, table 9.7.2
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum SmMessageType {
    PduSessionEstablishmentRequest = 0xc1,
    PduSessionEstablishmentAccept = 0xc2,
    PduSessionEstablishmentReject = 0xc3,
    PduSessionAuthenticationCommand = 0xc5,
    PduSessionAuthenticationComplete = 0xc6,
    PduSessionAuthenticationResult = 0xc7,
    PduSessionModificationRequest = 0xc9,
    PduSessionModificationReject = 0xca,
    PduSessionModificationCommand = 0xcb,
    PduSessionModificationComplete = 0xcc,
    PduSessionModificationCommandReject = 0xcd,
    PduSessionReleaseRequest = 0xd1,
    PduSessionReleaseReject = 0xd2,
    PduSessionReleaseCommand = 0xd3,
    PduSessionReleaseComplete = 0xd4,
    FiveGsmStatus = 0xd6,
}
