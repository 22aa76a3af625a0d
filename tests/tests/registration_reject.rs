use nas::ie::FiveGmmCause;
use uesim::Outcome;
use uesim_tests::framework::*;

#[async_std::test]
async fn registration_reject() -> anyhow::Result<()> {
    let (amf, sim, profiles) = init().await?;
    let profile = nth_profile(0, profiles);
    let registration = sim.register(profile)?;

    // When the AMF rejects the registration
    let mut ue = amf.receive_registration_request().await?;
    amf.send_registration_reject(&mut ue, FiveGmmCause::PLMN_NOT_ALLOWED)
        .await?;

    // Then registration fails with the reject cause and the UE sends nothing more.
    assert_eq!(
        registration.await,
        Outcome::Failed("registration rejected: cause #11 (PLMN not allowed)".to_string())
    );
    amf.expect_nothing().await?;
    assert!(!sim.is_registered(profile.ran_ue_ngap_id));

    // And the UE can try again.
    let registration = sim.register(profile)?;
    let mut ue = amf.receive_registration_request().await?;
    amf.handle_authentication(&mut ue).await?;
    amf.handle_security_mode(&mut ue).await?;
    amf.handle_registration_accept(&mut ue).await?;
    assert_eq!(registration.await, Outcome::Completed);
    Ok(())
}
