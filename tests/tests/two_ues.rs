use uesim::Outcome;
use uesim_tests::framework::*;

#[async_std::test]
async fn two_ues() -> anyhow::Result<()> {
    let (amf, sim, profiles) = init().await?;

    // Given two UEs that have both started registering
    let registration_1 = sim.register(nth_profile(0, profiles))?;
    let mut ue_1 = amf.receive_registration_request().await?;
    let registration_2 = sim.register(nth_profile(1, profiles))?;
    let mut ue_2 = amf.receive_registration_request().await?;
    assert_ne!(ue_1.ran_ue_ngap_id, ue_2.ran_ue_ngap_id);

    // When the AMF interleaves their procedures
    amf.handle_authentication(&mut ue_1).await?;
    amf.handle_authentication(&mut ue_2).await?;
    amf.handle_security_mode(&mut ue_2).await?;
    amf.handle_security_mode(&mut ue_1).await?;
    amf.handle_initial_context_setup(&mut ue_1).await?;
    amf.handle_registration_accept(&mut ue_2).await?;

    // Then both register independently.
    assert_eq!(registration_1.await, Outcome::Completed);
    assert_eq!(registration_2.await, Outcome::Completed);
    Ok(())
}
