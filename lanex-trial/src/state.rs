use std::sync::Arc;

use lanex_core::{
    AudioCue, ConfigError, LaneTable, PhaseKind, ReactionLogger, Simulation, TrialOutcome,
    TrialReport, VehicleState,
};
use lanex_timing::Clock;
use tracing::{debug, error, info, warn};

use super::config::{MeasurementSettings, TrialConfig};
use super::phase::{Emission, Tick, TickContext, TrialPhase};
use super::report::ReportingBridge;
use super::tracker::HazardTracker;
use super::trial::{ActiveTrial, Watchdog};
use super::ttc::estimate_ttc;

/// Lane-change reaction timer: arms trials on scenario triggers and advances
/// the armed trial once per simulation frame.
pub struct LaneChangeTimer<C, L, A>
where
    C: Clock,
    L: ReactionLogger,
    A: AudioCue,
{
    pub timer_id: String,
    clock: C,
    lanes: Arc<LaneTable>,
    settings: MeasurementSettings,
    experiment_start_ms: i64,
    phase: TrialPhase,
    bridge: ReportingBridge<L, A>,
    trial_number: usize,
}

impl<C, L, A> LaneChangeTimer<C, L, A>
where
    C: Clock,
    L: ReactionLogger,
    A: AudioCue,
{
    pub fn new(
        timer_id: impl Into<String>,
        clock: C,
        lanes: Arc<LaneTable>,
        settings: MeasurementSettings,
        experiment_start_ms: i64,
        bridge: ReportingBridge<L, A>,
    ) -> Self {
        Self {
            timer_id: timer_id.into(),
            clock,
            lanes,
            settings,
            experiment_start_ms,
            phase: TrialPhase::Idle,
            bridge,
            trial_number: 0,
        }
    }

    /// Lane the vehicle is fully inside, if any.
    pub fn current_lane<S: Simulation>(&self, sim: &S) -> Option<&str> {
        self.lanes.resolve_lane(
            sim.vehicle().lateral_position(),
            self.settings.half_vehicle_width,
        )
    }

    /// Arms a trial. A vehicle outside the start lane is not an error: the
    /// timer only runs the sound watchdog then. Unknown lanes are.
    pub fn setup<S: Simulation>(
        &mut self,
        sim: &S,
        config: TrialConfig,
    ) -> Result<PhaseKind, ConfigError> {
        if self.phase.kind().is_armed() {
            warn!(timer = %self.timer_id, "re-arming discards the armed trial");
        }
        self.phase = TrialPhase::Idle;

        for lane in [&config.start_lane, &config.target_lane] {
            if let Err(err) = self.lanes.lane(lane) {
                error!(timer = %self.timer_id, lane = %lane, "{err}");
                return Err(err);
            }
        }

        let now = self.clock.now_ms();
        let position = sim.vehicle().position();
        let current = self.current_lane(sim).map(str::to_owned);

        if current.as_deref() != Some(config.start_lane.as_str()) {
            warn!(
                timer = %self.timer_id,
                "Not in start lane {}! Currently: {:?}",
                config.start_lane,
                current
            );
            self.phase = TrialPhase::PrecondFailed(Watchdog::new(&config, now, position));
            return Ok(self.phase.kind());
        }

        let id = self.trial_number;
        let trial = ActiveTrial::new(id, config, &self.lanes, &self.settings, now, position)?;
        info!(
            timer = %self.timer_id,
            hazard = ?trial.hazard,
            "Trial {} armed at {} ms in lane {}",
            id,
            now,
            trial.config.start_lane
        );
        self.trial_number += 1;
        self.phase = TrialPhase::Active(Box::new(trial));
        Ok(self.phase.kind())
    }

    /// Advances the armed trial by one frame. Returns the report when the
    /// trial terminates on this tick. A missing scene node aborts the trial.
    pub fn update<S: Simulation>(&mut self, sim: &S) -> Result<Option<TrialReport>, ConfigError> {
        if !self.phase.kind().is_armed() {
            return Ok(None);
        }

        let vehicle = sim.vehicle();
        let located = self.phase.active().map(|trial| {
            let tracker = HazardTracker::new(sim.traffic(), sim.scene());
            (trial.id, tracker.locate(&trial.hazard))
        });
        let ttc = match located {
            Some((_, Ok(Some(hazard)))) => {
                estimate_ttc(vehicle.forward_distance_to(hazard), vehicle.speed_kmh())
            }
            Some((id, Err(err))) => {
                error!(timer = %self.timer_id, trial = id, "{err}; trial aborted");
                self.phase = TrialPhase::Idle;
                return Err(err);
            }
            Some((_, Ok(None))) | None => f32::INFINITY,
        };

        let tick = Tick {
            now_ms: self.clock.now_ms(),
            position: vehicle.position(),
            steering_angle: vehicle.steering_angle(),
            brake_intensity: vehicle.brake_pedal_intensity(),
            ttc,
        };
        let ctx = TickContext {
            settings: &self.settings,
            experiment_start_ms: self.experiment_start_ms,
        };
        let (next, emission) = std::mem::take(&mut self.phase).advance(&tick, &ctx);
        self.phase = next;

        match emission {
            None => Ok(None),
            Some(Emission::FailCue(sound)) => {
                debug!(timer = %self.timer_id, "start-lane watchdog expired");
                self.bridge.play(&sound);
                Ok(None)
            }
            Some(Emission::Report { report, sound }) => {
                self.bridge.report(&report, &sound);
                Ok(Some(report))
            }
        }
    }

    pub fn phase(&self) -> PhaseKind {
        self.phase.kind()
    }

    pub fn outcome(&self) -> Option<TrialOutcome> {
        self.phase.outcome()
    }

    pub fn active_trial(&self) -> Option<&ActiveTrial> {
        self.phase.active()
    }

    pub fn trials_armed(&self) -> usize {
        self.trial_number
    }

    pub fn bridge(&self) -> &ReportingBridge<L, A> {
        &self.bridge
    }

    pub fn into_bridge(self) -> ReportingBridge<L, A> {
        self.bridge
    }
}
