use uesim::Outcome;
use uesim_tests::framework::*;

#[async_std::test]
async fn deregistration() -> anyhow::Result<()> {
    let (amf, sim, profiles) = init().await?;

    // Given a registered UE
    let profile = nth_profile(0, profiles);
    let registration = sim.register(profile)?;
    let mut ue = amf.receive_registration_request().await?;
    amf.handle_authentication(&mut ue).await?;
    amf.handle_security_mode(&mut ue).await?;
    amf.handle_registration_accept(&mut ue).await?;
    assert_eq!(registration.await, Outcome::Completed);

    // When the UE deregisters
    let id = profile.ran_ue_ngap_id;
    let deregistration = async_std::task::spawn({
        let sim = sim.clone();
        async move { sim.deregister(id).await }
    });

    // Then the AMF accepts the deregistration and the UE is forgotten.
    amf.handle_deregistration(&mut ue).await?;
    assert_eq!(deregistration.await?, Outcome::Completed);
    assert!(!sim.is_registered(id));
    assert!(sim.deregister(id).await.is_err());
    Ok(())
}

#[async_std::test]
async fn deregistration_ended_by_context_release() -> anyhow::Result<()> {
    let (amf, sim, profiles) = init().await?;
    let profile = nth_profile(1, profiles);
    let registration = sim.register(profile)?;
    let mut ue = amf.receive_registration_request().await?;
    amf.handle_authentication(&mut ue).await?;
    amf.handle_security_mode(&mut ue).await?;
    amf.handle_initial_context_setup(&mut ue).await?;
    assert_eq!(registration.await, Outcome::Completed);

    let id = profile.ran_ue_ngap_id;
    let deregistration = async_std::task::spawn({
        let sim = sim.clone();
        async move { sim.deregister(id).await }
    });

    // When the AMF releases the UE context instead of accepting
    amf.receive_deregistration_request(&mut ue).await?;
    amf.handle_ue_context_release(&ue).await?;

    // Then deregistration still completes.
    assert_eq!(deregistration.await?, Outcome::Completed);
    Ok(())
}
