use super::MockAmf;
use anyhow::Result;
use slog::{Drain, Logger, o};
use uesim::{Profile, ProfileTable, UeSimulator};
use xxap::ChannelTransport;

pub async fn init() -> Result<(MockAmf, UeSimulator<ChannelTransport>, &'static ProfileTable)> {
    exit_on_panic();
    let logger = init_logging();
    let profiles = uesim::profiles::load_profiles_file("test_profiles.toml", &logger)?;
    let (amf, ran_end) = MockAmf::new(profiles, &logger).await?;
    let sim = UeSimulator::start(ran_end, logger.new(o!("uesim" => 1))).await?;
    Ok((amf, sim, profiles))
}

fn exit_on_panic() {
    let orig_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        orig_hook(panic_info);
        std::process::exit(1);
    }));
}

fn init_logging() -> Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::CompactFormat::new(decorator).build();
    let drain = std::sync::Mutex::new(drain).fuse();
    let drain = slog_envlogger::new(drain);
    slog::Logger::root(drain, o!())
}

pub fn nth_profile(n: usize, profiles: &ProfileTable) -> &Profile {
    profiles.values().nth(n).unwrap()
}
