use crate::{IeValue, NasPdu, NgapError, NgapPdu, ProtocolIeContainer, RanUeNgapId};
use slog::{Logger, warn};

impl ProtocolIeContainer {
    /// Every instance of `T`, in order.  Instances that fail to decode are errors.
    pub fn extract_ies<T: IeValue>(&self) -> Result<Vec<T>, NgapError> {
        self.with_id(T::ID)
            .map(|ie| T::from_bytes(&ie.value))
            .collect()
    }

    /// Exactly one instance of `T`.
    pub fn extract_ie<T: IeValue>(&self) -> Result<T, NgapError> {
        self.extract_optional_ie()?.ok_or(NgapError::MissingIe {
            id: T::ID,
            name: T::NAME,
        })
    }

    /// At most one instance of `T`.
    pub fn extract_optional_ie<T: IeValue>(&self) -> Result<Option<T>, NgapError> {
        let mut all = self.extract_ies::<T>()?;
        match all.len() {
            0 | 1 => Ok(all.pop()),
            count => Err(NgapError::MultipleIes {
                id: T::ID,
                name: T::NAME,
                count,
            }),
        }
    }
}

impl NgapPdu {
    pub fn extract_ies<T: IeValue>(&self) -> Result<Vec<T>, NgapError> {
        self.ies.extract_ies()
    }

    pub fn extract_ie<T: IeValue>(&self) -> Result<T, NgapError> {
        self.ies.extract_ie()
    }

    /// The embedded NAS PDU, if there is exactly one.  A PDU carrying several is a protocol
    /// violation and all of them are dropped.
    pub fn extract_nas_pdu(&self, logger: &Logger) -> Option<Vec<u8>> {
        let mut all: Vec<Vec<u8>> = self.ies.with_id(NasPdu::ID).map(|ie| ie.value.clone()).collect();
        match all.len() {
            0 => None,
            1 => all.pop(),
            n => {
                warn!(
                    logger,
                    "Dropping {n} NAS PDUs found in {} - expected at most one",
                    self.name()
                );
                None
            }
        }
    }

    /// Used to route a PDU to its UE.
    pub fn ran_ue_ngap_id(&self) -> Option<u32> {
        self.ies
            .extract_optional_ie::<RanUeNgapId>()
            .ok()
            .flatten()
            .map(|id| id.0)
    }
}
