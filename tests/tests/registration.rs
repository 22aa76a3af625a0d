use nas::ie::{IdentityType, MobileIdentity};
use uesim::Outcome;
use uesim_tests::framework::*;

#[async_std::test]
async fn registration() -> anyhow::Result<()> {
    let (amf, sim, profiles) = init().await?;

    // Given a UE profile
    let profile = nth_profile(0, profiles);

    // When the simulator registers the UE
    let registration = sim.register(profile)?;

    // Then it completes 5G-AKA, security mode and registration with the AMF.
    let mut ue = amf.receive_registration_request().await?;
    amf.handle_authentication(&mut ue).await?;
    let suci = amf
        .handle_identity_request(&mut ue, IdentityType::Suci)
        .await?;
    assert!(matches!(suci, MobileIdentity::Suci(_)));
    amf.handle_security_mode(&mut ue).await?;
    let imei = amf
        .handle_identity_request(&mut ue, IdentityType::Imei)
        .await?;
    assert_eq!(imei, MobileIdentity::Imei(profile.imei.clone()));
    amf.handle_registration_accept(&mut ue).await?;

    assert_eq!(registration.await, Outcome::Completed);
    assert!(sim.is_registered(profile.ran_ue_ngap_id));
    Ok(())
}

#[async_std::test]
async fn registration_with_sqn_resynchronization() -> anyhow::Result<()> {
    let (amf, sim, profiles) = init().await?;
    let profile = nth_profile(1, profiles);
    let registration = sim.register(profile)?;

    // When the AMF replays an SQN the UE has already seen
    let mut ue = amf.receive_registration_request().await?;
    amf.handle_authentication_with_resync(&mut ue).await?;

    // Then a fresh challenge based on the UE's AUTS succeeds.
    amf.handle_security_mode(&mut ue).await?;
    amf.handle_initial_context_setup(&mut ue).await?;
    assert_eq!(registration.await, Outcome::Completed);
    Ok(())
}
