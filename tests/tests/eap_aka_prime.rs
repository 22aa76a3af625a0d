use nas::eap::AkaSubtype;
use uesim::Outcome;
use uesim_tests::framework::*;

#[async_std::test]
async fn registration_with_eap_aka_prime() -> anyhow::Result<()> {
    let (amf, sim, profiles) = init().await?;
    let profile = nth_profile(0, profiles);
    let registration = sim.register(profile)?;

    // When the AMF authenticates the UE with EAP-AKA' instead of 5G-AKA
    let mut ue = amf.receive_registration_request().await?;
    amf.handle_eap_authentication(&mut ue).await?;

    // Then both sides derive the same KAMF from EMSK and registration completes.
    amf.handle_security_mode(&mut ue).await?;
    amf.handle_registration_accept(&mut ue).await?;
    assert_eq!(registration.await, Outcome::Completed);
    assert!(sim.is_registered(profile.ran_ue_ngap_id));
    Ok(())
}

#[async_std::test]
async fn eap_challenge_with_bad_mac_is_refused() -> anyhow::Result<()> {
    let (amf, sim, profiles) = init().await?;
    let profile = nth_profile(1, profiles);
    let registration = sim.register(profile)?;

    // When the network's AT_MAC does not verify
    let mut ue = amf.receive_registration_request().await?;
    let subtype = amf.send_eap_challenge_with_bad_mac(&mut ue).await?;

    // Then the UE answers with a client error and accepts a correct challenge afterwards.
    assert_eq!(subtype, AkaSubtype::ClientError);
    amf.handle_eap_authentication(&mut ue).await?;
    amf.handle_security_mode(&mut ue).await?;
    amf.handle_initial_context_setup(&mut ue).await?;
    assert_eq!(registration.await, Outcome::Completed);
    Ok(())
}
