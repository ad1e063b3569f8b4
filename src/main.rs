use anyhow::{Context, Result};
use clap::Parser;
use lanex_sync::TimestampBroadcaster;
use lanex_timing::{Clock, WallClock};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod experiment;
mod results;
mod scenario;

use experiment::{Realtime, Replay};
use scenario::Scenario;

const DEFAULT_FILTER: &str = "lane_change_experiment=info,lanex_trial=info,lanex_sync=info";

/// Replays scripted lane-change trials through the reaction timer.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Options {
    /// Scenario file (JSON).
    #[arg(long)]
    scenario: PathBuf,

    /// Where to write the results.
    #[arg(long, default_value = "experiment_results.json")]
    output: PathBuf,

    /// Send UDP timestamp packets while the experiment runs.
    #[arg(long)]
    broadcast: bool,

    /// Pace ticks on the wall clock instead of replaying as fast as possible.
    #[arg(long)]
    realtime: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .init();

    let options = Options::parse();

    info!("=== LANE CHANGE EXPERIMENT ===");
    info!("Platform: {}", std::env::consts::OS);
    info!("Architecture: {}", std::env::consts::ARCH);

    let scenario = Scenario::load(&options.scenario)?;
    info!(
        "Loaded {} trials over {} lanes from {}",
        scenario.trials.len(),
        scenario.lanes.len(),
        options.scenario.display()
    );

    let broadcaster = if options.broadcast {
        let handle = TimestampBroadcaster::new(&scenario.broadcast)
            .and_then(|b| b.spawn(WallClock))
            .context("cannot start timestamp broadcaster")?;
        Some(handle)
    } else {
        None
    };

    let results = if options.realtime {
        info!("Realtime run, experiment start {} ms", WallClock.now_ms());
        experiment::run(&scenario, Realtime::new(scenario.tick_ms))
    } else {
        experiment::run(
            &scenario,
            Replay::new(scenario.experiment_start_ms, scenario.tick_ms),
        )
    }?;

    if let Some(handle) = broadcaster {
        match handle.join() {
            Ok(sent) => info!(packets = sent, "Timestamp broadcaster stopped"),
            Err(err) => warn!("Timestamp broadcaster failed: {err}"),
        }
    }

    results.analyze();
    results.save(&options.output)?;
    info!("Experiment completed.");
    Ok(())
}
