//! mock_amf - enables a test script to assume the role of the AMF on the NG reference point

use anyhow::{Result, anyhow, bail, ensure};
use async_channel::{Receiver, Sender};
use async_trait::async_trait;
use nas::eap::{AkaSubtype, AttributeType, EapAkaPrime, EapCode, EapPacket};
use nas::ie::{FiveGGuti, FiveGmmCause, IdentityType, MobileIdentity, NasKeySetIdentifier};
use nas::{NasSecurityContext, PlainNasMessage, Role, SecurityHeaderType};
use ngap::{InitialUeMessage, NgapPdu, UeContextReleaseComplete};
use security::{AuthVector, EapAkaPrimeChallenge, NAS_ABBA};
use slog::{Logger, info, o, warn};
use std::sync::Arc;
use std::time::Duration;
use uesim::{ProfileTable, RegistrationInput};
use xxap::{ChannelTransport, Transport, TransportHandler};
mod build_nas;
mod build_ngap;

// Streams 0 and 1 of an NGAP association.
const NGAP_STREAMS: u16 = 2;
const UE_ASSOCIATED_STREAM: u16 = 1;
const RECEIVE_TIMEOUT: Duration = Duration::from_secs(5);
const EAP_ID: u8 = 1;

pub struct MockAmf {
    transport: Arc<ChannelTransport>,
    receiver: Receiver<NgapPdu>,
    profiles: &'static ProfileTable,
    logger: Logger,
}

/// The AMF's view of one UE.
pub struct AmfUeContext {
    pub ran_ue_ngap_id: u32,
    pub amf_ue_ngap_id: u64,
    pub profile: RegistrationInput,
    pub guti: Option<FiveGGuti>,
    sqn: u64,
    rand: [u8; 16],
    xres_star: [u8; 16],
    kamf: [u8; 32],
    security: Option<NasSecurityContext>,
}

impl AmfUeContext {
    pub fn kgnb(&self) -> [u8; 32] {
        security::derive_kgnb(&self.kamf, 0)
    }
}

struct Forwarder {
    sender: Sender<NgapPdu>,
    logger: Logger,
}

#[async_trait]
impl TransportHandler for Forwarder {
    async fn handle(&self, _stream: u16, bytes: Vec<u8>) {
        match NgapPdu::from_bytes(&bytes) {
            Ok(pdu) => {
                let _ = self.sender.send(pdu).await;
            }
            Err(e) => warn!(self.logger, "Undecodable NGAP PDU - {e}"),
        }
    }
}

impl MockAmf {
    /// Starts the AMF end of a new link and returns it along with the UE simulator's end.
    pub async fn new(
        profiles: &'static ProfileTable,
        logger: &Logger,
    ) -> Result<(MockAmf, ChannelTransport)> {
        let logger = logger.new(o!("amf" => 1));
        let (ran_end, amf_end) = ChannelTransport::pair(NGAP_STREAMS);
        amf_end.start().await?;
        let transport = Arc::new(amf_end);
        let (sender, receiver) = async_channel::unbounded();

        let forwarder = Forwarder {
            sender,
            logger: logger.clone(),
        };
        let receive_transport = transport.clone();
        async_std::task::spawn(async move {
            let _ = receive_transport.receive_loop(&forwarder).await;
        });

        Ok((
            MockAmf {
                transport,
                receiver,
                profiles,
                logger,
            },
            ran_end,
        ))
    }

    pub fn abort(&self) {
        self.transport.abort();
    }

    pub async fn send(&self, pdu: NgapPdu) -> Result<()> {
        self.transport
            .send(UE_ASSOCIATED_STREAM, pdu.to_bytes()?)
            .await?;
        Ok(())
    }

    pub async fn receive_pdu(&self) -> Result<NgapPdu> {
        async_std::future::timeout(RECEIVE_TIMEOUT, self.receiver.recv())
            .await
            .map_err(|_| anyhow!("Timed out waiting for NGAP PDU"))?
            .map_err(|_| anyhow!("NGAP link closed"))
    }

    /// Fails if the UE sends anything within a short wait.
    pub async fn expect_nothing(&self) -> Result<()> {
        match async_std::future::timeout(Duration::from_millis(200), self.receiver.recv()).await {
            Ok(Ok(pdu)) => bail!("Unexpected {}", pdu.name()),
            _ => Ok(()),
        }
    }

    pub async fn receive_registration_request(&self) -> Result<AmfUeContext> {
        let pdu = self.receive_pdu().await?;
        let initial_ue_message = pdu.parse::<InitialUeMessage>()?;
        let nas = PlainNasMessage::decode(&initial_ue_message.nas_pdu.0)?;
        let request = uesim::expect_nas!(RegistrationRequest, nas)?;
        let MobileIdentity::Suci(suci) = &request.mobile_identity else {
            bail!("Expected SUCI, got {:?}", request.mobile_identity)
        };
        let imsi = suci.imsi().ok_or_else(|| anyhow!("SUCI is not an IMSI"))?;
        let profile = self
            .profiles
            .get(&imsi)
            .ok_or_else(|| anyhow!("Unknown IMSI {imsi}"))?;
        info!(self.logger, "<< RegistrationRequest from {imsi}");

        let ran_ue_ngap_id = initial_ue_message.ran_ue_ngap_id.0;
        let profile = RegistrationInput::try_from(profile)?;
        Ok(AmfUeContext {
            ran_ue_ngap_id,
            amf_ue_ngap_id: 0x100 + ran_ue_ngap_id as u64,
            sqn: security::sqn_to_u64(&profile.sqn),
            profile,
            guti: None,
            rand: [0; 16],
            xres_star: [0; 16],
            kamf: [0; 32],
            security: None,
        })
    }

    pub async fn handle_authentication(&self, ue: &mut AmfUeContext) -> Result<()> {
        ue.sqn += 1;
        self.send_authentication_request(ue).await?;
        self.receive_authentication_response(ue).await
    }

    /// Challenges the UE with the SQN it has already used, and completes authentication with a
    /// fresh SQN taken from the UE's AUTS.
    pub async fn handle_authentication_with_resync(&self, ue: &mut AmfUeContext) -> Result<()> {
        self.send_authentication_request(ue).await?;
        let failure = self.receive_nas(ue).await?;
        let failure = uesim::expect_nas!(AuthenticationFailure, failure)?;
        ensure!(
            failure.cause == FiveGmmCause::SYNCH_FAILURE,
            "Expected synch failure, got {:?}",
            failure.cause
        );
        let auts = failure
            .failure_parameter
            .ok_or_else(|| anyhow!("Synch failure without AUTS"))?
            .0;
        info!(self.logger, "<< AuthenticationFailure(synch failure)");

        // AUTS = SQNms xor AK* || MAC-S
        let v = AuthVector::compute(
            &ue.profile.key,
            &ue.profile.operator_key,
            &ue.rand,
            &[0; 6],
            &[0; 2],
        );
        let mut sqn_ms = [0u8; 6];
        for i in 0..6 {
            sqn_ms[i] = auts[i] ^ v.ak_star[i];
        }
        let expected = security::build_auts(
            &ue.profile.key,
            &ue.profile.operator_key,
            &ue.rand,
            &sqn_ms,
        );
        ensure!(auts == expected, "AUTS failed verification");

        ue.sqn = security::sqn_to_u64(&sqn_ms) + 1;
        self.send_authentication_request(ue).await?;
        self.receive_authentication_response(ue).await
    }

    /// Authenticates the UE with EAP-AKA' (TS33.501, 6.1.3.1) and reports EAP-Success.
    pub async fn handle_eap_authentication(&self, ue: &mut AmfUeContext) -> Result<()> {
        ue.sqn += 1;
        let (request, challenge) = self.eap_challenge(ue)?;
        info!(self.logger, ">> AuthenticationRequest(EAP-AKA' challenge)");
        let request = build_nas::eap_authentication_request(&EapPacket::from(request))?;
        self.send_nas(ue, request).await?;

        let response = self.receive_eap_response(ue).await?;
        ensure!(
            response.subtype == AkaSubtype::Challenge,
            "Expected EAP-AKA' challenge response, got {:?}",
            response.subtype
        );
        ensure!(response.id == EAP_ID, "EAP identifier {} does not match", response.id);
        ensure!(
            response.res() == Some(challenge.xres.as_slice()),
            "RES does not match XRES"
        );
        ensure!(
            response.mac_matches(|p| challenge.keys.mac(p))?,
            "EAP-AKA' response fails AT_MAC check"
        );
        info!(self.logger, "<< AuthenticationResponse(EAP-AKA' challenge)");

        ue.kamf = security::derive_kamf(
            &challenge.kseaf,
            ue.profile.supi.as_bytes(),
            &NAS_ABBA,
        );
        info!(self.logger, ">> AuthenticationResult(EAP-Success)");
        let success = EapPacket::Success { id: EAP_ID };
        self.send_nas(ue, build_nas::authentication_result(&success)?)
            .await
    }

    /// Sends an EAP-AKA' challenge whose AT_MAC is wrong and returns the subtype of the UE's
    /// answer.
    pub async fn send_eap_challenge_with_bad_mac(
        &self,
        ue: &mut AmfUeContext,
    ) -> Result<AkaSubtype> {
        ue.sqn += 1;
        let (mut request, _) = self.eap_challenge(ue)?;
        request.sign(|_| [0; 16])?;
        info!(self.logger, ">> AuthenticationRequest(EAP-AKA' challenge with bad AT_MAC)");
        let request = build_nas::eap_authentication_request(&EapPacket::from(request))?;
        self.send_nas(ue, request).await?;
        let response = self.receive_eap_response(ue).await?;
        info!(self.logger, "<< AuthenticationResponse(EAP-AKA' {:?})", response.subtype);
        Ok(response.subtype)
    }

    fn eap_challenge(&self, ue: &AmfUeContext) -> Result<(EapAkaPrime, EapAkaPrimeChallenge)> {
        let opc = ue.profile.operator_key.opc(&ue.profile.key);
        let snn = ue.profile.serving_network_name.as_bytes();
        let challenge = security::generate_eap_aka_prime_challenge(
            &ue.profile.key,
            &opc,
            snn,
            ue.profile.supi.as_bytes(),
            &security::sqn_from_u64(ue.sqn),
            &mut rand::rng(),
        );
        let mut request = EapAkaPrime::new(EapCode::Request, EAP_ID, AkaSubtype::Challenge);
        request
            .push_reserved(AttributeType::AT_RAND, &challenge.rand)
            .push_reserved(AttributeType::AT_AUTN, &challenge.autn)
            .push_kdf(1)
            .push_kdf_input(snn);
        request.sign(|p| challenge.keys.mac(p))?;
        Ok((request, challenge))
    }

    async fn receive_eap_response(&self, ue: &mut AmfUeContext) -> Result<EapAkaPrime> {
        let response = self.receive_nas(ue).await?;
        let response = uesim::expect_nas!(AuthenticationResponse, response)?;
        let eap = response
            .eap_message
            .ok_or_else(|| anyhow!("AuthenticationResponse without EAP message"))?;
        match EapPacket::decode(&eap.0)? {
            EapPacket::AkaPrime(p) if p.code == EapCode::Response => Ok(p),
            other => bail!("Expected EAP-Response/AKA', got {other:?}"),
        }
    }

    async fn send_authentication_request(&self, ue: &mut AmfUeContext) -> Result<()> {
        let opc = ue.profile.operator_key.opc(&ue.profile.key);
        let snn = ue.profile.serving_network_name.clone();
        let challenge = security::generate_challenge(
            &ue.profile.key,
            &opc,
            snn.as_bytes(),
            &security::sqn_from_u64(ue.sqn),
            &mut rand::rng(),
        );
        ue.rand = challenge.rand;
        ue.xres_star = challenge.xres_star;
        ue.kamf = security::derive_kamf(
            &challenge.kseaf,
            ue.profile.supi.as_bytes(),
            &NAS_ABBA,
        );
        info!(self.logger, ">> AuthenticationRequest");
        self.send_nas(
            ue,
            build_nas::authentication_request(&challenge.rand, &challenge.autn),
        )
        .await
    }

    async fn receive_authentication_response(&self, ue: &mut AmfUeContext) -> Result<()> {
        let response = self.receive_nas(ue).await?;
        let response = uesim::expect_nas!(AuthenticationResponse, response)?;
        let res_star = response
            .response_parameter
            .ok_or_else(|| anyhow!("AuthenticationResponse without RES*"))?;
        ensure!(res_star.0 == ue.xres_star, "RES* does not match XRES*");
        info!(self.logger, "<< AuthenticationResponse");
        Ok(())
    }

    pub async fn handle_identity_request(
        &self,
        ue: &mut AmfUeContext,
        identity_type: IdentityType,
    ) -> Result<MobileIdentity> {
        info!(self.logger, ">> IdentityRequest({identity_type:?})");
        self.send_nas(ue, build_nas::identity_request(identity_type))
            .await?;
        let response = self.receive_nas(ue).await?;
        let response = uesim::expect_nas!(IdentityResponse, response)?;
        info!(self.logger, "<< IdentityResponse");
        Ok(response.mobile_identity)
    }

    pub async fn handle_security_mode(&self, ue: &mut AmfUeContext) -> Result<()> {
        let mut security = NasSecurityContext::new(
            Role::Network,
            NasKeySetIdentifier::native(build_nas::NGKSI),
            &ue.kamf,
            build_nas::algorithms(),
        );
        let smc = security.protect(
            &build_nas::security_mode_command(),
            SecurityHeaderType::IntegrityProtectedWithNewSecurityContext,
        )?;
        ue.security = Some(security);
        info!(self.logger, ">> SecurityModeCommand");
        self.send(build_ngap::downlink_nas_transport(ue, smc)).await?;

        let complete = self.receive_nas(ue).await?;
        let complete = uesim::expect_nas!(SecurityModeComplete, complete)?;
        ensure!(
            matches!(complete.imeisv, Some(MobileIdentity::Imeisv(_))) == ue.profile.imeisv.is_some(),
            "Unexpected IMEISV {:?}",
            complete.imeisv
        );
        let container = complete
            .nas_message_container
            .ok_or_else(|| anyhow!("SecurityModeComplete without NAS message container"))?;
        let initial_message = PlainNasMessage::decode(&container.0)?;
        uesim::expect_nas!(RegistrationRequest, initial_message)?;
        info!(self.logger, "<< SecurityModeComplete");
        Ok(())
    }

    pub async fn handle_registration_accept(&self, ue: &mut AmfUeContext) -> Result<()> {
        let guti = build_nas::guti(0x1000 + ue.ran_ue_ngap_id);
        ue.guti = Some(guti);
        info!(self.logger, ">> RegistrationAccept");
        self.send_nas(ue, build_nas::registration_accept(guti)).await?;
        self.receive_registration_complete(ue).await
    }

    /// Delivers the RegistrationAccept inside an InitialContextSetupRequest.
    pub async fn handle_initial_context_setup(&self, ue: &mut AmfUeContext) -> Result<()> {
        let guti = build_nas::guti(0x1000 + ue.ran_ue_ngap_id);
        ue.guti = Some(guti);
        let nas = self.protect(ue, &build_nas::registration_accept(guti))?;
        info!(self.logger, ">> InitialContextSetupRequest(RegistrationAccept)");
        self.send(build_ngap::initial_context_setup_request(ue, Some(nas)))
            .await?;

        let response = self.receive_pdu().await?;
        ensure!(
            response.is::<ngap::InitialContextSetupResponse>(),
            "Expected InitialContextSetupResponse, got {}",
            response.name()
        );
        info!(self.logger, "<< InitialContextSetupResponse");
        self.receive_registration_complete(ue).await
    }

    async fn receive_registration_complete(&self, ue: &mut AmfUeContext) -> Result<()> {
        let complete = self.receive_nas(ue).await?;
        uesim::expect_nas!(RegistrationComplete, complete)?;
        info!(self.logger, "<< RegistrationComplete");
        Ok(())
    }

    pub async fn send_registration_reject(
        &self,
        ue: &mut AmfUeContext,
        cause: FiveGmmCause,
    ) -> Result<()> {
        info!(self.logger, ">> RegistrationReject({})", cause.description());
        self.send_nas(ue, build_nas::registration_reject(cause)).await
    }

    pub async fn handle_deregistration(&self, ue: &mut AmfUeContext) -> Result<()> {
        self.receive_deregistration_request(ue).await?;
        info!(self.logger, ">> DeregistrationAccept");
        self.send_nas(ue, build_nas::deregistration_accept()).await
    }

    pub async fn receive_deregistration_request(&self, ue: &mut AmfUeContext) -> Result<()> {
        let request = self.receive_nas(ue).await?;
        let request = uesim::expect_nas!(DeregistrationRequestUeOriginating, request)?;
        let guti = ue.guti.ok_or_else(|| anyhow!("UE has no GUTI"))?;
        ensure!(
            request.mobile_identity == MobileIdentity::Guti(guti),
            "Expected GUTI, got {:?}",
            request.mobile_identity
        );
        info!(self.logger, "<< DeregistrationRequest");
        Ok(())
    }

    pub async fn handle_ue_context_release(&self, ue: &AmfUeContext) -> Result<()> {
        info!(self.logger, ">> UeContextReleaseCommand");
        self.send(build_ngap::ue_context_release_command(ue)).await?;
        let pdu = self.receive_pdu().await?;
        let complete = pdu.parse::<UeContextReleaseComplete>()?;
        ensure!(complete.ran_ue_ngap_id.0 == ue.ran_ue_ngap_id);
        info!(self.logger, "<< UeContextReleaseComplete");
        Ok(())
    }

    fn protect(&self, ue: &mut AmfUeContext, nas: &PlainNasMessage) -> Result<Vec<u8>> {
        Ok(match &mut ue.security {
            Some(security) => {
                security.protect(nas, SecurityHeaderType::IntegrityProtectedAndCiphered)?
            }
            None => nas.encode()?,
        })
    }

    async fn send_nas(&self, ue: &mut AmfUeContext, nas: PlainNasMessage) -> Result<()> {
        let nas_pdu = self.protect(ue, &nas)?;
        self.send(build_ngap::downlink_nas_transport(ue, nas_pdu))
            .await
    }

    /// Receives an UplinkNasTransport from `ue` and removes its security envelope.
    pub async fn receive_nas(&self, ue: &mut AmfUeContext) -> Result<PlainNasMessage> {
        let pdu = self.receive_pdu().await?;
        ensure!(
            pdu.is::<ngap::UplinkNasTransport>(),
            "Expected UplinkNasTransport, got {}",
            pdu.name()
        );
        ensure!(pdu.ran_ue_ngap_id() == Some(ue.ran_ue_ngap_id));
        let nas_pdu = pdu
            .extract_nas_pdu(&self.logger)
            .ok_or_else(|| anyhow!("UplinkNasTransport without NAS PDU"))?;
        let security_header_type = nas::security_header_type(&nas_pdu)?;
        if !security_header_type.is_protected() {
            return Ok(PlainNasMessage::decode(&nas_pdu)?);
        }
        let Some(security) = &mut ue.security else {
            bail!("Protected NAS before security mode");
        };
        let (_, nas) = security.unprotect(&nas_pdu)?;
        Ok(nas)
    }
}
