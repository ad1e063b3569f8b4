// experiment.rs

use crate::results::{ExperimentResults, LoggedAudio, ResultsLog};
use crate::scenario::{Scenario, ScriptedSim};
use anyhow::Result;
use lanex_core::{PhaseKind, TrialReport};
use lanex_timing::{Clock, ManualClock, TickPacer, TickStats, WallClock};
use lanex_trial::{LaneChangeTimer, ReportingBridge};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// How simulation time moves between ticks.
pub trait Pace {
    type Clock: Clock;

    fn clock(&self) -> Self::Clock;
    fn tick(&mut self);
    fn pause(&mut self, ms: i64);

    fn stats(&self) -> Option<TickStats> {
        None
    }
}

/// Steps a manual clock by a fixed period; runs as fast as the CPU allows.
pub struct Replay {
    clock: ManualClock,
    tick_ms: i64,
}

impl Replay {
    pub fn new(start_ms: i64, tick_ms: i64) -> Self {
        Self {
            clock: ManualClock::new(start_ms),
            tick_ms,
        }
    }
}

impl Pace for Replay {
    type Clock = ManualClock;

    fn clock(&self) -> ManualClock {
        self.clock.clone()
    }

    fn tick(&mut self) {
        self.clock.advance(self.tick_ms);
    }

    fn pause(&mut self, ms: i64) {
        self.clock.advance(ms);
    }
}

/// Paces ticks against the wall clock.
pub struct Realtime {
    pacer: TickPacer,
}

impl Realtime {
    pub fn new(tick_ms: i64) -> Self {
        let period = Duration::from_millis(u64::try_from(tick_ms).unwrap_or(1));
        Self {
            pacer: TickPacer::new(period),
        }
    }
}

impl Pace for Realtime {
    type Clock = WallClock;

    fn clock(&self) -> WallClock {
        WallClock
    }

    fn tick(&mut self) {
        self.pacer.wait_next();
    }

    fn pause(&mut self, ms: i64) {
        std::thread::sleep(Duration::from_millis(u64::try_from(ms).unwrap_or(0)));
    }

    fn stats(&self) -> Option<TickStats> {
        Some(self.pacer.stats())
    }
}

/// Drives every scripted trial of `scenario` through one lane-change timer.
pub fn run<P: Pace>(scenario: &Scenario, mut pace: P) -> Result<ExperimentResults> {
    let clock = pace.clock();
    let experiment_start_ms = clock.now_ms();
    let mut timer = LaneChangeTimer::new(
        "lane_change",
        clock.clone(),
        Arc::new(scenario.lanes.clone()),
        scenario.settings.clone(),
        experiment_start_ms,
        ReportingBridge::new(ResultsLog::default(), LoggedAudio::default()),
    );
    let mut rng = StdRng::seed_from_u64(scenario.seed);
    let mut reports: Vec<TrialReport> = Vec::new();

    info!(
        trials = scenario.trials.len(),
        "Experiment started at {} ms", experiment_start_ms
    );

    for (index, trial) in scenario.trials.iter().enumerate() {
        let mut sim = ScriptedSim::new(trial);
        let armed_at = clock.now_ms();
        match timer.setup(&sim, trial.setup.clone()) {
            Ok(PhaseKind::ArmedPrecondFailed) => {
                warn!(trial = index, "start lane precondition failed");
            }
            Ok(_) => {}
            Err(err) => {
                warn!(trial = index, "skipping trial: {err}");
                continue;
            }
        }

        let duration_ms = trial.duration_ms();
        loop {
            pace.tick();
            let t_ms = clock.now_ms() - armed_at;
            sim.step(t_ms, &mut rng);
            match timer.update(&sim) {
                Ok(Some(report)) => {
                    reports.push(report);
                    break;
                }
                Ok(None) if !timer.phase().is_armed() => break,
                Ok(None) if t_ms >= duration_ms => {
                    warn!(trial = index, t_ms, "trace ended before the trial did");
                    break;
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(trial = index, "trial aborted: {err}");
                    break;
                }
            }
        }
        pace.pause(scenario.gap_ms);
    }

    if let Some(stats) = pace.stats() {
        info!(
            "Tick timing: avg {:.3} ms, jitter {:.3} ms, min {:.3} ms, max {:.3} ms, {:.1} Hz",
            stats.average_tick_ns / 1e6,
            stats.jitter_ns / 1e6,
            stats.min_tick_ns / 1e6,
            stats.max_tick_ns / 1e6,
            stats.effective_hz
        );
    }

    let bridge = timer.into_bridge();
    if bridge.failures() > 0 {
        warn!(failures = bridge.failures(), "some reports were not delivered");
    }
    let (log, _audio) = bridge.into_parts();
    Ok(ExperimentResults::new(reports, log))
}
