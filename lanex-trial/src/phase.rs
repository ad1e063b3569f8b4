//! Per-tick transition function of a reaction trial.
//!
//! The phase value owns everything a trial mutates. [`TrialPhase::advance`]
//! consumes it together with one tick's readings and returns the next phase
//! plus whatever has to be emitted.

use lanex_core::{PhaseKind, Position, TrialOutcome, TrialReport};

use crate::config::MeasurementSettings;
use crate::trial::{ActiveTrial, Watchdog};

/// Readings taken from the host at the start of a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub now_ms: i64,
    pub position: Position,
    pub steering_angle: f32,
    pub brake_intensity: f32,
    /// TTC to the tracked hazard; ignored outside the active phase.
    pub ttc: f32,
}

/// Read-only context shared by every trial of an experiment.
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    pub settings: &'a MeasurementSettings,
    pub experiment_start_ms: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Emission {
    /// The precondition watchdog expired; only the fail sound plays.
    FailCue(String),
    Report { report: TrialReport, sound: String },
}

#[derive(Debug, Clone, Default)]
pub enum TrialPhase {
    #[default]
    Idle,
    PrecondFailed(Watchdog),
    Active(Box<ActiveTrial>),
    Terminated(TrialOutcome),
}

impl TrialPhase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Self::Idle => PhaseKind::Idle,
            Self::PrecondFailed(_) => PhaseKind::ArmedPrecondFailed,
            Self::Active(_) => PhaseKind::ArmedActive,
            Self::Terminated(_) => PhaseKind::Terminated,
        }
    }

    pub fn outcome(&self) -> Option<TrialOutcome> {
        match self {
            Self::Terminated(outcome) => Some(*outcome),
            _ => None,
        }
    }

    pub fn active(&self) -> Option<&ActiveTrial> {
        match self {
            Self::Active(trial) => Some(trial),
            _ => None,
        }
    }

    pub fn advance(self, tick: &Tick, ctx: &TickContext<'_>) -> (TrialPhase, Option<Emission>) {
        match self {
            Self::Idle | Self::Terminated(_) => (self, None),
            Self::PrecondFailed(watchdog) => {
                if watchdog.expired(tick.now_ms, tick.position) {
                    (Self::Idle, Some(Emission::FailCue(watchdog.fail_sound)))
                } else {
                    (Self::PrecondFailed(watchdog), None)
                }
            }
            Self::Active(mut trial) => match trial.step(tick, ctx.settings) {
                None => (Self::Active(trial), None),
                Some(outcome) => {
                    let sound = outcome
                        .sound(&trial.config.success_sound, &trial.config.fail_sound)
                        .to_string();
                    let report = trial.finish(outcome, tick.now_ms, ctx.experiment_start_ms);
                    (
                        Self::Terminated(outcome),
                        Some(Emission::Report { report, sound }),
                    )
                }
            },
        }
    }
}

impl ActiveTrial {
    /// Records one tick and decides whether the trial ends on it.
    ///
    /// Priority: missed (time or distance overrun), then failure (braking
    /// without permission), then success (out of danger for the hold
    /// duration with enough steering).
    fn step(&mut self, tick: &Tick, settings: &MeasurementSettings) -> Option<TrialOutcome> {
        let now = tick.now_ms;
        let x = tick.position.x;
        let steering = tick.steering_angle.abs();
        let braking = tick.brake_intensity > 0.0;

        self.peak_steering = self.peak_steering.max(steering);
        self.sampler.sample(x, now);
        self.ttc_series.push(tick.ttc);
        self.record_marks(now, x, steering, braking, settings);

        if self
            .limits
            .exceeded(self.start_ms, self.start_position, now, tick.position)
        {
            return Some(TrialOutcome::Missed);
        }
        if braking && !self.config.allow_brake {
            return Some(TrialOutcome::Failure);
        }

        let clearance = settings.half_vehicle_width + settings.half_hazard_width(&self.hazard);
        if !self.hazard_lane.is_clear_of_centre(x, clearance) {
            self.hold_since_ms = None;
            return None;
        }
        let since = *self.hold_since_ms.get_or_insert(now);
        (now - since >= self.config.hold_lane_for_ms
            && self.peak_steering >= self.config.min_steering_angle)
            .then_some(TrialOutcome::Success)
    }

    fn record_marks(
        &mut self,
        now: i64,
        x: f32,
        steering: f32,
        braking: bool,
        settings: &MeasurementSettings,
    ) {
        let elapsed = now - self.start_ms;
        self.marks.braked |= braking;
        for (mark, threshold) in self
            .marks
            .angle_marks_ms
            .iter_mut()
            .zip(settings.steering_marks)
        {
            if mark.is_none() && steering >= threshold {
                *mark = Some(elapsed);
            }
        }
        if self.marks.enter_target_lane_ms.is_none()
            && self.target_lane.contains(x, settings.half_vehicle_width)
        {
            self.marks.enter_target_lane_ms = Some(elapsed);
        }
    }
}
