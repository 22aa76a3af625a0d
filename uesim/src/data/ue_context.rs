use super::nas_context::NasContext;
use crate::RegistrationInput;
use nas::ie::FiveGGuti;

pub struct UeContext {
    pub ran_ue_ngap_id: u32,
    // Learned from the first downlink NGAP message for this UE.
    pub amf_ue_ngap_id: Option<u64>,
    pub profile: RegistrationInput,
    // Highest SQN accepted from the home network.
    pub sqn_ms: [u8; 6],
    pub guti: Option<FiveGGuti>,
    pub nas: NasContext,
}

impl UeContext {
    pub fn new(profile: RegistrationInput) -> Self {
        UeContext {
            ran_ue_ngap_id: profile.ran_ue_ngap_id,
            amf_ue_ngap_id: None,
            sqn_ms: profile.sqn,
            guti: None,
            nas: NasContext::default(),
            profile,
        }
    }
}
