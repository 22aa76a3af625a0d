use crate::profiles::parse_profiles;
use crate::{FlowContext, RegistrationInput, UeContext};
use bits::{Bit6, Bit10, Octet, Octet4};
use nas::ie::{
    AccessType, Abba, AuthenticationParameterAutn, AuthenticationParameterRand, EapMessage,
    FiveGGuti, FiveGsRegistrationResult, MobileIdentity, NasKeySetIdentifier,
    NasSecurityAlgorithms, Plmn, UeSecurityCapability,
};
use nas::message::{
    AuthenticationRequest, RegistrationAccept, RegistrationComplete, SecurityModeCommand,
};
use nas::eap::{AkaSubtype, AttributeType, EapAkaPrime, EapCode, EapPacket};
use nas::{MmMessage, PlainNasMessage};
use ngap::NgapPdu;
use security::{AuthVector, CipheringAlgorithm, EapAkaPrimeKeys, IntegrityAlgorithm, NAS_ABBA};
use slog::{Discard, Logger, o};

pub const AMF_UE_NGAP_ID: u64 = 0x0102030405;

const PROFILE: &str = r#"
[ue.001010000000001]
mcc = "001"
mnc = "01"
msin = "0000000001"
key = "465b5ce8b199b49faa5f0a2ee238a6bc"
opc = "cd63cb71954a9f4e48a5994e37a02baf"
sqn = "000000000020"
imei = "356938035643803"
imeisv = "3569380356438091"
requested_nssai = [{ sst = 1 }]
ran_ue_ngap_id = 1
"#;

/// A UE whose AMF-UE-NGAP-ID is already known, with an outbox that tests can inspect.
pub struct TestUe {
    pub ue: UeContext,
    pub logger: Logger,
    pub outbox: Vec<NgapPdu>,
}

pub struct TestChallenge {
    pub request: AuthenticationRequest,
    pub xres_star: [u8; 16],
    pub kamf: [u8; 32],
}

impl TestUe {
    pub fn new() -> Self {
        let logger = Logger::root(Discard, o!());
        let profiles = parse_profiles(PROFILE, &logger).unwrap();
        let input = RegistrationInput::try_from(&profiles["001010000000001"]).unwrap();
        let mut ue = UeContext::new(input);
        ue.amf_ue_ngap_id = Some(AMF_UE_NGAP_ID);
        TestUe {
            ue,
            logger,
            outbox: vec![],
        }
    }

    pub fn cx(&mut self) -> FlowContext<'_> {
        FlowContext::new(&mut self.ue, &self.logger, &mut self.outbox)
    }

    /// Drains the outbox and decodes the NAS PDU carried by each NGAP PDU.  Only valid before
    /// security is activated.
    pub fn sent_nas(&mut self) -> Vec<PlainNasMessage> {
        self.outbox
            .drain(..)
            .filter_map(|pdu| pdu.extract_nas_pdu(&self.logger))
            .map(|bytes| PlainNasMessage::decode(&bytes).unwrap())
            .collect()
    }

    /// Drains the outbox, naming each PDU by its NAS message where it carries one.
    pub fn sent_names(&mut self) -> Vec<String> {
        let sent: Vec<NgapPdu> = self.outbox.drain(..).collect();
        sent.iter()
            .map(|pdu| match pdu.extract_nas_pdu(&self.logger) {
                Some(bytes) => PlainNasMessage::decode(&bytes).unwrap().name().to_string(),
                None => pdu.name(),
            })
            .collect()
    }

    /// What the home network would send for this UE, with the given SQN and AMF field.
    pub fn challenge(&self, sqn: u64, amf: [u8; 2]) -> TestChallenge {
        challenge_for(&self.ue.profile, sqn, amf)
    }

    pub fn eap_challenge(&self, sqn: u64) -> TestEapChallenge {
        eap_challenge_for(&self.ue.profile, sqn)
    }
}

fn autn(v: &AuthVector, sqn: &[u8; 6], amf: &[u8; 2]) -> [u8; 16] {
    let mut autn = [0u8; 16];
    for i in 0..6 {
        autn[i] = sqn[i] ^ v.ak[i];
    }
    autn[6..8].copy_from_slice(amf);
    autn[8..16].copy_from_slice(&v.mac_a);
    autn
}

pub fn challenge_for(profile: &RegistrationInput, sqn: u64, amf: [u8; 2]) -> TestChallenge {
    let rand = [0x23; 16];
    let sqn = security::sqn_from_u64(sqn);
    let v = AuthVector::compute(&profile.key, &profile.operator_key, &rand, &sqn, &amf);
    let autn = autn(&v, &sqn, &amf);

    let snn = profile.serving_network_name.as_bytes();
    let kausf = security::derive_kausf(&v.ck, &v.ik, snn, &autn[0..6]);
    let kseaf = security::derive_kseaf(&kausf, snn);
    TestChallenge {
        request: AuthenticationRequest {
            ngksi: NasKeySetIdentifier::native(1),
            spare: Default::default(),
            abba: Abba(NAS_ABBA.to_vec()),
            rand: Some(AuthenticationParameterRand(rand.to_vec())),
            autn: Some(AuthenticationParameterAutn(autn.to_vec())),
            eap_message: None,
        },
        xres_star: security::derive_res_star(&v.ck, &v.ik, snn, &rand, &v.res),
        kamf: security::derive_kamf(&kseaf, profile.supi.as_bytes(), &NAS_ABBA),
    }
}

/// An EAP-AKA' challenge as the home network would build it, signed with `keys`.
pub struct TestEapChallenge {
    pub request: AuthenticationRequest,
    pub eap: EapAkaPrime,
    pub xres: [u8; 8],
    pub keys: EapAkaPrimeKeys,
    pub kamf: [u8; 32],
}

pub fn eap_challenge_for(profile: &RegistrationInput, sqn: u64) -> TestEapChallenge {
    let rand = [0x37; 16];
    let amf = [0x80, 0x00];
    let sqn = security::sqn_from_u64(sqn);
    let v = AuthVector::compute(&profile.key, &profile.operator_key, &rand, &sqn, &amf);
    let autn = autn(&v, &sqn, &amf);

    let snn = profile.serving_network_name.as_bytes();
    let (ck_prime, ik_prime) = security::derive_ck_ik_prime(&v.ck, &v.ik, snn, &autn[0..6]);
    let keys = EapAkaPrimeKeys::derive(&ck_prime, &ik_prime, profile.supi.as_bytes());
    let mut eap = EapAkaPrime::new(EapCode::Request, 3, AkaSubtype::Challenge);
    eap.push_reserved(AttributeType::AT_RAND, &rand)
        .push_reserved(AttributeType::AT_AUTN, &autn)
        .push_kdf(1)
        .push_kdf_input(snn);
    eap.sign(|packet| keys.mac(packet)).unwrap();
    let kseaf = security::derive_kseaf(&keys.kausf(), snn);
    TestEapChallenge {
        request: eap_authentication_request(&eap),
        eap,
        xres: v.res,
        kamf: security::derive_kamf(&kseaf, profile.supi.as_bytes(), &NAS_ABBA),
        keys,
    }
}

pub fn eap_authentication_request(eap: &EapAkaPrime) -> AuthenticationRequest {
    AuthenticationRequest {
        ngksi: NasKeySetIdentifier::native(1),
        spare: Default::default(),
        abba: Abba(NAS_ABBA.to_vec()),
        rand: None,
        autn: None,
        eap_message: Some(EapMessage(
            EapPacket::from(eap.clone()).encode().unwrap(),
        )),
    }
}

pub fn guti() -> FiveGGuti {
    FiveGGuti {
        plmn: Plmn([0x00, 0xf1, 0x10]),
        amf_region_id: Octet::truncating(0xca),
        amf_set_id: Bit10::truncating(0x3fe),
        amf_pointer: Bit6::truncating(1),
        tmsi: Octet4::truncating(0x12345678),
    }
}

pub fn registration_complete() -> PlainNasMessage {
    MmMessage::RegistrationComplete(RegistrationComplete {
        sor_transparent_container: None,
    })
    .into()
}

pub fn registration_accept(guti: Option<FiveGGuti>) -> RegistrationAccept {
    RegistrationAccept {
        registration_result: FiveGsRegistrationResult {
            sms_allowed: false,
            access_type: AccessType::ThreeGpp,
        },
        guti: guti.map(MobileIdentity::Guti),
        equivalent_plmns: None,
        tai_list: None,
        allowed_nssai: None,
        rejected_nssai: None,
        configured_nssai: None,
        network_feature_support: None,
        pdu_session_status: None,
        pdu_session_reactivation_result: None,
        pdu_session_reactivation_result_error_cause: None,
        ladn_information: None,
        mico_indication: None,
        network_slicing_indication: None,
        service_area_list: None,
        t3512_value: None,
        non_3gpp_deregistration_timer_value: None,
        t3502_value: None,
        emergency_number_list: None,
        sor_transparent_container: None,
        eap_message: None,
        nssai_inclusion_mode: None,
        negotiated_drx_parameters: None,
        non_3gpp_nw_policies: None,
    }
}

pub fn security_mode_command(imeisv_request: bool) -> SecurityModeCommand {
    SecurityModeCommand {
        selected_algorithms: NasSecurityAlgorithms {
            ciphering: CipheringAlgorithm::Nea2,
            integrity: IntegrityAlgorithm::Nia2,
        },
        ngksi: NasKeySetIdentifier::native(1),
        spare: Default::default(),
        replayed_ue_security_capability: UeSecurityCapability::all_nr(),
        imeisv_request: imeisv_request.then_some(nas::ie::ImeisvRequest(true)),
        selected_eps_algorithms: None,
        additional_security_information: None,
        eap_message: None,
        abba: None,
        replayed_s1_ue_security_capabilities: None,
    }
}
