use serde::{Deserialize, Serialize};

/// Terminal classification of a trial. Exactly one is set per trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialOutcome {
    Success,
    Failure,
    Missed,
}

impl TrialOutcome {
    /// Reaction-log code: `+1` success, `-1` failure. Missed trials go through
    /// the separate missed path and carry no code.
    pub fn code(self) -> Option<i8> {
        match self {
            Self::Success => Some(1),
            Self::Failure => Some(-1),
            Self::Missed => None,
        }
    }

    /// Value of the driving-task log `reaction` column.
    pub fn log_reaction(self) -> Option<u8> {
        match self {
            Self::Success => Some(1),
            Self::Failure => Some(0),
            Self::Missed => None,
        }
    }

    pub fn sound<'a>(self, success_sound: &'a str, fail_sound: &'a str) -> &'a str {
        match self {
            Self::Success => success_sound,
            Self::Failure | Self::Missed => fail_sound,
        }
    }
}

/// Row in the reaction log for a success or failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionRecord {
    pub reaction_group_id: String,
    pub code: i8,
    pub reaction_time_ms: i64,
    pub start_time_ms: i64,
    pub relative_start_time_ms: i64,
    pub comment: String,
}

/// Row in the reaction log for a trial that ran out of time or distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissedRecord {
    pub reaction_group_id: String,
    pub start_time_ms: i64,
    pub relative_start_time_ms: i64,
    pub comment: String,
}

/// Per-trial driving-task log. Millisecond marks are relative to trial start.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialLog {
    pub task: Option<u8>,
    pub start_time_ms: i64,
    pub lat_accel: f32,
    pub avg_ttc: f32,
    pub min_ttc: f32,
    pub rt_angle_2_ms: Option<i64>,
    pub rt_angle_3_ms: Option<i64>,
    pub rt_enter_lane_ms: Option<i64>,
    pub rt_success_ms: Option<i64>,
    pub additional_reaction: bool,
    pub reaction: Option<u8>,
}

/// Everything the engine emits when a trial terminates.
///
/// Non-finite TTC values (no closing hazard) serialize as `null` in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialReport {
    pub trial_id: usize,
    pub reaction_group_id: String,
    pub outcome: TrialOutcome,
    /// `None` for missed trials.
    pub reaction_time_ms: Option<i64>,
    pub start_time_ms: i64,
    pub relative_start_time_ms: i64,
    pub comment: String,
    pub avg_ttc: f32,
    pub min_ttc: f32,
    pub peak_lat_accel: f32,
    pub sample_count: usize,
    pub log: TrialLog,
}

impl TrialReport {
    pub fn reaction_record(&self) -> Option<ReactionRecord> {
        let code = self.outcome.code()?;
        Some(ReactionRecord {
            reaction_group_id: self.reaction_group_id.clone(),
            code,
            reaction_time_ms: self.reaction_time_ms.unwrap_or_default(),
            start_time_ms: self.start_time_ms,
            relative_start_time_ms: self.relative_start_time_ms,
            comment: self.comment.clone(),
        })
    }

    pub fn missed_record(&self) -> Option<MissedRecord> {
        (self.outcome == TrialOutcome::Missed).then(|| MissedRecord {
            reaction_group_id: self.reaction_group_id.clone(),
            start_time_ms: self.start_time_ms,
            relative_start_time_ms: self.relative_start_time_ms,
            comment: self.comment.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcome: TrialOutcome) -> TrialReport {
        TrialReport {
            trial_id: 3,
            reaction_group_id: "construction".into(),
            outcome,
            reaction_time_ms: (outcome != TrialOutcome::Missed).then_some(840),
            start_time_ms: 10_000,
            relative_start_time_ms: 4_000,
            comment: "cones".into(),
            avg_ttc: 4.2,
            min_ttc: 2.5,
            peak_lat_accel: 1.1,
            sample_count: 40,
            log: TrialLog::default(),
        }
    }

    #[test]
    fn codes_follow_outcome() {
        assert_eq!(TrialOutcome::Success.code(), Some(1));
        assert_eq!(TrialOutcome::Failure.code(), Some(-1));
        assert_eq!(TrialOutcome::Missed.code(), None);
        assert_eq!(TrialOutcome::Failure.log_reaction(), Some(0));
        assert_eq!(TrialOutcome::Missed.sound("ok", "buzz"), "buzz");
    }

    #[test]
    fn missed_reports_only_produce_missed_records() {
        let missed = report(TrialOutcome::Missed);
        assert!(missed.reaction_record().is_none());
        assert_eq!(missed.missed_record().unwrap().relative_start_time_ms, 4_000);

        let success = report(TrialOutcome::Success);
        assert!(success.missed_record().is_none());
        let record = success.reaction_record().unwrap();
        assert_eq!(record.code, 1);
        assert_eq!(record.reaction_time_ms, 840);
        assert_eq!(record.comment, "cones");
    }

    #[test]
    fn outcome_serializes_snake_case() {
        let json = serde_json::to_string(&TrialOutcome::Missed).unwrap();
        assert_eq!(json, "\"missed\"");
    }
}
