use lanex_core::{
    ConfigError, HazardRef, LaneBoundary, LaneTable, Position, TrialLog, TrialOutcome, TrialReport,
};

use crate::config::{Limits, MeasurementSettings, TrialConfig};
use crate::lateral::peak_lateral_accel;
use crate::sampler::KinematicSampler;
use crate::ttc::TtcSummary;

/// First-crossing marks, in ms since trial start. Logged only; they never
/// drive a transition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Milestones {
    pub angle_marks_ms: [Option<i64>; 2],
    pub enter_target_lane_ms: Option<i64>,
    pub braked: bool,
}

/// Sound-only timer left behind when the vehicle was not in the start lane.
#[derive(Debug, Clone, PartialEq)]
pub struct Watchdog {
    pub start_ms: i64,
    pub start_position: Position,
    pub limits: Limits,
    pub fail_sound: String,
}

impl Watchdog {
    pub fn new(config: &TrialConfig, now_ms: i64, position: Position) -> Self {
        Self {
            start_ms: now_ms,
            start_position: position,
            limits: config.limits(),
            fail_sound: config.fail_sound.clone(),
        }
    }

    pub fn expired(&self, now_ms: i64, position: Position) -> bool {
        self.limits
            .exceeded(self.start_ms, self.start_position, now_ms, position)
    }
}

/// Mutable measurement state of an armed trial.
#[derive(Debug, Clone)]
pub struct ActiveTrial {
    pub id: usize,
    pub config: TrialConfig,
    pub hazard: HazardRef,
    pub limits: Limits,
    /// Lane the hazard sits in; the trial starts here.
    pub hazard_lane: LaneBoundary,
    pub target_lane: LaneBoundary,
    pub start_ms: i64,
    pub start_position: Position,
    pub sampler: KinematicSampler,
    pub ttc_series: Vec<f32>,
    pub peak_steering: f32,
    /// Start of the current out-of-danger streak.
    pub hold_since_ms: Option<i64>,
    pub marks: Milestones,
}

impl ActiveTrial {
    /// Arms a trial and takes the first kinematic sample.
    pub fn new(
        id: usize,
        config: TrialConfig,
        lanes: &LaneTable,
        settings: &MeasurementSettings,
        now_ms: i64,
        position: Position,
    ) -> Result<Self, ConfigError> {
        let hazard_lane = lanes.lane(&config.start_lane)?.clone();
        let target_lane = lanes.lane(&config.target_lane)?.clone();
        let mut sampler = KinematicSampler::new(settings.sample_capacity);
        sampler.sample(position.x, now_ms);

        Ok(Self {
            id,
            hazard: config.hazard(),
            limits: config.limits(),
            config,
            hazard_lane,
            target_lane,
            start_ms: now_ms,
            start_position: position,
            sampler,
            ttc_series: Vec::new(),
            peak_steering: 0.0,
            hold_since_ms: None,
            marks: Milestones::default(),
        })
    }

    /// Time from arming to the start of the current hold streak, or to `now`
    /// when no streak is running.
    pub fn reaction_time_ms(&self, now_ms: i64) -> i64 {
        let hold_offset = self.hold_since_ms.map_or(0, |since| now_ms - since);
        now_ms - self.start_ms - hold_offset
    }

    pub fn finish(
        mut self,
        outcome: TrialOutcome,
        now_ms: i64,
        experiment_start_ms: i64,
    ) -> TrialReport {
        let ttc = TtcSummary::from_series(&self.ttc_series).unwrap_or_else(|| {
            tracing::warn!(trial = self.id, "trial ended without TTC readings");
            TtcSummary::EMPTY
        });
        let peak_lat_accel = peak_lateral_accel(self.sampler.series()).unwrap_or_else(|| {
            tracing::debug!(
                trial = self.id,
                samples = self.sampler.len(),
                "too few samples for lateral acceleration"
            );
            0.0
        });
        let reaction_time_ms =
            (outcome != TrialOutcome::Missed).then(|| self.reaction_time_ms(now_ms));

        let log = TrialLog {
            task: self.config.task_code(),
            start_time_ms: self.start_ms,
            lat_accel: peak_lat_accel,
            avg_ttc: ttc.mean,
            min_ttc: ttc.min,
            rt_angle_2_ms: self.marks.angle_marks_ms[0],
            rt_angle_3_ms: self.marks.angle_marks_ms[1],
            rt_enter_lane_ms: self.marks.enter_target_lane_ms,
            rt_success_ms: reaction_time_ms.filter(|_| outcome == TrialOutcome::Success),
            additional_reaction: self.marks.braked,
            reaction: outcome.log_reaction(),
        };

        TrialReport {
            trial_id: self.id,
            reaction_group_id: self.config.reaction_group_id,
            outcome,
            reaction_time_ms,
            start_time_ms: self.start_ms,
            relative_start_time_ms: self.start_ms - experiment_start_ms,
            comment: self.config.comment,
            avg_ttc: ttc.mean,
            min_ttc: ttc.min,
            peak_lat_accel,
            sample_count: self.sampler.len(),
            log,
        }
    }
}
