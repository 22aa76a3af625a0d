//! messages - the NGAP procedures a UE simulator takes part in, each with its compile time IE set

use crate::*;

/// One row of a message's IE table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IeSpec {
    pub id: u16,
    pub name: &'static str,
    pub criticality: Criticality,
    pub mandatory: bool,
}

/// A procedure message that converts to and from an [`NgapPdu`].
pub trait NgapMessage: Sized {
    const PROCEDURE: ProcedureCode;
    const DESCRIPTION: PduDescription;
    const CRITICALITY: Criticality;
    const IES: &'static [IeSpec];

    fn to_ies(&self) -> ProtocolIeContainer;
    fn from_ies(ies: &ProtocolIeContainer) -> Result<Self, NgapError>;
}

/// Wraps a procedure message in a PDU.
pub fn build<M: NgapMessage>(message: &M) -> NgapPdu {
    NgapPdu {
        description: M::DESCRIPTION,
        procedure: M::PROCEDURE,
        criticality: M::CRITICALITY,
        ies: message.to_ies(),
    }
}

impl NgapPdu {
    pub fn is<M: NgapMessage>(&self) -> bool {
        self.procedure == M::PROCEDURE && self.description == M::DESCRIPTION
    }

    /// Interprets the PDU as `M`, which must match its procedure code and description.
    pub fn parse<M: NgapMessage>(&self) -> Result<M, NgapError> {
        if !self.is::<M>() {
            return Err(NgapError::UnexpectedProcedure {
                expected: M::PROCEDURE,
                expected_description: M::DESCRIPTION,
                received: self.procedure,
                received_description: self.description,
            });
        }
        M::from_ies(&self.ies)
    }

    /// e.g. "InitialContextSetup SuccessfulOutcome".
    pub fn name(&self) -> String {
        format!("{:?} {:?}", self.procedure, self.description)
    }
}

macro_rules! ngap_message {
    (@type mandatory $ty:ty) => { $ty };
    (@type optional $ty:ty) => { Option<$ty> };
    (@mandatory mandatory) => { true };
    (@mandatory optional) => { false };
    (@from mandatory $ies:ident $ty:ty) => { $ies.extract_ie::<$ty>()? };
    (@from optional $ies:ident $ty:ty) => { $ies.extract_optional_ie::<$ty>()? };
    (
        $(#[$meta:meta])*
        $name:ident ($procedure:ident, $description:ident, $criticality:ident) {
            $($field:ident : $ty:ty => $crit:ident $presence:ident),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct $name {
            $(pub $field: ngap_message!(@type $presence $ty),)*
        }

        impl NgapMessage for $name {
            const PROCEDURE: ProcedureCode = ProcedureCode::$procedure;
            const DESCRIPTION: PduDescription = PduDescription::$description;
            const CRITICALITY: Criticality = Criticality::$criticality;
            const IES: &'static [IeSpec] = &[
                $(IeSpec {
                    id: <$ty as IeValue>::ID,
                    name: stringify!($field),
                    criticality: Criticality::$crit,
                    mandatory: ngap_message!(@mandatory $presence),
                },)*
            ];

            fn to_ies(&self) -> ProtocolIeContainer {
                let mut ies = ProtocolIeContainer::default();
                $(
                    for v in <_ as Presence<$ty>>::values(&self.$field) {
                        ies.push(<$ty as IeValue>::ID, Criticality::$crit, v.to_bytes());
                    }
                )*
                ies
            }

            fn from_ies(ies: &ProtocolIeContainer) -> Result<Self, NgapError> {
                Ok($name {
                    $($field: ngap_message!(@from $presence ies $ty),)*
                })
            }
        }
    };
}

/// Iterates over a field whether it is mandatory (`T`) or optional (`Option<T>`).
trait Presence<T> {
    fn values(&self) -> &[T];
}

impl<T: IeValue> Presence<T> for T {
    fn values(&self) -> &[T] {
        std::slice::from_ref(self)
    }
}

impl<T: IeValue> Presence<T> for Option<T> {
    fn values(&self) -> &[T] {
        self.as_slice()
    }
}

ngap_message! {
    /// TS38.413, 9.2.5.1
    InitialUeMessage(InitialUeMessage, InitiatingMessage, Ignore) {
        ran_ue_ngap_id: RanUeNgapId => Reject mandatory,
        nas_pdu: NasPdu => Reject mandatory,
        user_location_information: UserLocationInformationNr => Reject mandatory,
        rrc_establishment_cause: RrcEstablishmentCause => Ignore mandatory,
        five_g_s_tmsi: FiveGSTmsi => Reject optional,
    }
}

ngap_message! {
    /// TS38.413, 9.2.5.2
    DownlinkNasTransport(DownlinkNasTransport, InitiatingMessage, Ignore) {
        amf_ue_ngap_id: AmfUeNgapId => Reject mandatory,
        ran_ue_ngap_id: RanUeNgapId => Reject mandatory,
        nas_pdu: NasPdu => Reject mandatory,
    }
}

ngap_message! {
    /// TS38.413, 9.2.5.3
    UplinkNasTransport(UplinkNasTransport, InitiatingMessage, Ignore) {
        amf_ue_ngap_id: AmfUeNgapId => Reject mandatory,
        ran_ue_ngap_id: RanUeNgapId => Reject mandatory,
        nas_pdu: NasPdu => Reject mandatory,
        user_location_information: UserLocationInformationNr => Ignore mandatory,
    }
}

ngap_message! {
    /// TS38.413, 9.2.2.1
    InitialContextSetupRequest(InitialContextSetup, InitiatingMessage, Reject) {
        amf_ue_ngap_id: AmfUeNgapId => Reject mandatory,
        ran_ue_ngap_id: RanUeNgapId => Reject mandatory,
        guami: Guami => Reject mandatory,
        allowed_nssai: AllowedNssai => Reject mandatory,
        ue_security_capabilities: UeSecurityCapabilities => Reject mandatory,
        security_key: SecurityKey => Reject mandatory,
        nas_pdu: NasPdu => Ignore optional,
    }
}

ngap_message! {
    /// TS38.413, 9.2.2.2
    InitialContextSetupResponse(InitialContextSetup, SuccessfulOutcome, Reject) {
        amf_ue_ngap_id: AmfUeNgapId => Ignore mandatory,
        ran_ue_ngap_id: RanUeNgapId => Ignore mandatory,
    }
}

ngap_message! {
    /// TS38.413, 9.2.2.5.  The UE is identified by its ID pair.
    UeContextReleaseCommand(UeContextRelease, InitiatingMessage, Reject) {
        amf_ue_ngap_id: AmfUeNgapId => Reject mandatory,
        ran_ue_ngap_id: RanUeNgapId => Reject mandatory,
        cause: Cause => Ignore mandatory,
    }
}

ngap_message! {
    /// TS38.413, 9.2.2.6
    UeContextReleaseComplete(UeContextRelease, SuccessfulOutcome, Reject) {
        amf_ue_ngap_id: AmfUeNgapId => Ignore mandatory,
        ran_ue_ngap_id: RanUeNgapId => Ignore mandatory,
    }
}

ngap_message! {
    /// TS38.413, 9.2.7.5
    ErrorIndication(ErrorIndication, InitiatingMessage, Ignore) {
        amf_ue_ngap_id: AmfUeNgapId => Ignore optional,
        ran_ue_ngap_id: RanUeNgapId => Ignore optional,
        cause: Cause => Ignore optional,
    }
}
