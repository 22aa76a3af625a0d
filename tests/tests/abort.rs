use uesim::Outcome;
use uesim_tests::framework::*;

#[async_std::test]
async fn abort_fails_registration_in_progress() -> anyhow::Result<()> {
    let (amf, sim, profiles) = init().await?;
    let profile = nth_profile(0, profiles);

    // Given a UE waiting for authentication
    let registration = sim.register(profile)?;
    let _ue = amf.receive_registration_request().await?;

    // When the simulator aborts its transport
    sim.abort();

    // Then the registration fails promptly and no further UE can register.
    assert_eq!(
        registration.await,
        Outcome::Failed("transport aborted".to_string())
    );
    assert!(sim.register(nth_profile(1, profiles)).is_err());
    Ok(())
}

#[async_std::test]
async fn amf_going_away_fails_registration() -> anyhow::Result<()> {
    let (amf, sim, profiles) = init().await?;
    let registration = sim.register(nth_profile(0, profiles))?;
    let mut ue = amf.receive_registration_request().await?;
    amf.handle_authentication(&mut ue).await?;

    // When the AMF end of the link goes away
    amf.abort();

    // Then the registration fails.
    assert_eq!(
        registration.await,
        Outcome::Failed("transport closed".to_string())
    );
    Ok(())
}
