use std::process::ExitCode;

use clap::Parser;

use delooped_app::autopilot::Autopilot;
use delooped_app::config::{AppConfig, Cli};
use delooped_app::{logging, Session};
use delooped_core::enums::ResourceId;
use delooped_core::events::RunStats;
use delooped_hub::HubState;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match AppConfig::load(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("delooped: {err}");
            return ExitCode::FAILURE;
        }
    };
    logging::init(config.verbose);
    log::debug!("{config:?}");

    let mut hub = HubState::new();
    hub.select_mode(config.mode);
    let mut session = Session::new(hub, config.sim_config());
    if config.autopilot {
        session.set_autopilot(Some(Autopilot::new()));
    }

    let max_ticks = config.max_ticks();
    for index in 1..=config.runs {
        let result = if config.realtime {
            session.play_run_realtime(max_ticks)
        } else {
            session.play_run(max_ticks)
        };
        match result {
            Ok(stats) => println!("{}", summary(index, &stats)),
            Err(err) => {
                log::error!("run {index} failed: {err}");
                return ExitCode::FAILURE;
            }
        }
    }

    let hub = session.hub();
    println!(
        "hub: {:.2} xp ({:.2} earned), {} capsule(s), best {:?} cycle {}",
        hub.xp,
        hub.xp_total,
        hub.capsules,
        config.mode,
        hub.best_cycle(config.mode)
    );
    ExitCode::SUCCESS
}

fn summary(index: u32, stats: &RunStats) -> String {
    let total = |id: ResourceId| stats.resource_totals.get(&id).copied().unwrap_or(0.0);
    format!(
        "run {index}: {:?} reached cycle {} in {:.1}s ({:?}), {:.0} energy, {:.0} info, {:.2} xp",
        stats.mode,
        stats.cycle,
        stats.lifetime,
        stats.reason,
        total(ResourceId::Energy),
        total(ResourceId::Info),
        stats.xp_worth
    )
}
