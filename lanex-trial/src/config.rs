use lanex_core::{HazardRef, Position};
use serde::{Deserialize, Serialize};

/// |steering| marks whose first crossing is logged as `rt_angle_2` / `rt_angle_3`.
pub const STEERING_MARKS: [f32; 2] = [0.004444, 0.006666];

/// Vehicle and hazard dimensions plus logging marks shared by every trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementSettings {
    pub half_vehicle_width: f32,
    /// Half-width of a static obstacle (traffic cone).
    pub half_cone_width: f32,
    /// Half-width of a dynamic lead vehicle.
    pub half_lead_vehicle_width: f32,
    pub steering_marks: [f32; 2],
    /// Bound on the kinematic series; oldest samples are dropped beyond it.
    pub sample_capacity: Option<usize>,
}

impl Default for MeasurementSettings {
    fn default() -> Self {
        Self {
            half_vehicle_width: 0.75,
            half_cone_width: 0.1,
            half_lead_vehicle_width: 0.75,
            steering_marks: STEERING_MARKS,
            sample_capacity: None,
        }
    }
}

impl MeasurementSettings {
    /// Half-width used for the out-of-danger clearance. Without a configured
    /// hazard the cone width applies.
    pub fn half_hazard_width(&self, hazard: &HazardRef) -> f32 {
        match hazard {
            HazardRef::DynamicVehicle(_) => self.half_lead_vehicle_width,
            HazardRef::StaticObstacle(_) | HazardRef::None => self.half_cone_width,
        }
    }
}

/// Parameters captured when a trial is armed. Immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialConfig {
    pub reaction_group_id: String,
    pub start_lane: String,
    pub target_lane: String,
    pub min_steering_angle: f32,
    /// `<= 0` means no time limit.
    pub task_completion_time_ms: i64,
    /// `<= 0` means no distance limit.
    pub task_completion_distance: f32,
    pub allow_brake: bool,
    pub hold_lane_for_ms: i64,
    pub fail_sound: String,
    pub success_sound: String,
    /// Empty when no lead vehicle is tracked.
    pub lead_vehicle: String,
    /// Empty when no lead obstacle is tracked.
    pub lead_obstacle: String,
    pub comment: String,
}

impl TrialConfig {
    pub fn hazard(&self) -> HazardRef {
        HazardRef::from_names(&self.lead_vehicle, &self.lead_obstacle)
    }

    pub fn limits(&self) -> Limits {
        Limits {
            time_ms: self.task_completion_time_ms,
            distance: self.task_completion_distance,
        }
    }

    /// Driving-task code: single-lane changes are task 2, double-lane changes
    /// task 3.
    pub fn task_code(&self) -> Option<u8> {
        match self.target_lane.as_str() {
            "1" | "3" => Some(2),
            "0" | "4" => Some(3),
            _ => None,
        }
    }
}

/// Time and distance watchdog shared by active trials and the
/// precondition-failed sound timer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    pub time_ms: i64,
    pub distance: f32,
}

impl Limits {
    pub fn time_exceeded(&self, start_ms: i64, now_ms: i64) -> bool {
        self.time_ms > 0 && now_ms - start_ms > self.time_ms
    }

    pub fn distance_exceeded(&self, start: Position, current: Position) -> bool {
        self.distance > 0.0 && current.distance(start) > self.distance
    }

    pub fn exceeded(&self, start_ms: i64, start: Position, now_ms: i64, current: Position) -> bool {
        self.time_exceeded(start_ms, now_ms) || self.distance_exceeded(start, current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn task_code_follows_target_lane() {
        let mut config = TrialConfig {
            target_lane: "1".into(),
            ..Default::default()
        };
        assert_eq!(config.task_code(), Some(2));
        config.target_lane = "4".into();
        assert_eq!(config.task_code(), Some(3));
        config.target_lane = "2".into();
        assert_eq!(config.task_code(), None);
    }

    #[test]
    fn limits_fire_strictly_after_threshold() {
        let limits = Limits {
            time_ms: 1_000,
            distance: 50.0,
        };
        assert!(!limits.time_exceeded(0, 1_000));
        assert!(limits.time_exceeded(0, 1_001));
        let start = Position::new(0.0, 0.0, 0.0);
        assert!(!limits.distance_exceeded(start, Position::new(0.0, 0.0, 50.0)));
        assert!(limits.distance_exceeded(start, Position::new(0.0, 0.0, 50.5)));
    }

    #[test]
    fn settings_fill_missing_fields_with_defaults() {
        let settings: MeasurementSettings =
            serde_json::from_str(r#"{"half_vehicle_width": 0.9}"#).unwrap();
        assert_eq!(settings.half_vehicle_width, 0.9);
        assert_eq!(settings.half_cone_width, 0.1);
        assert_eq!(settings.steering_marks, STEERING_MARKS);
        assert_eq!(
            settings.half_hazard_width(&HazardRef::DynamicVehicle("lead".into())),
            0.75
        );
    }

    proptest! {
        #[test]
        fn disabled_limits_never_fire(
            time_ms in i64::MIN / 4..=0,
            distance in -1.0e6f32..=0.0,
            elapsed in 0i64..i64::MAX / 4,
            travelled in 0.0f32..1.0e6,
        ) {
            let limits = Limits { time_ms, distance };
            let start = Position::default();
            prop_assert!(!limits.time_exceeded(0, elapsed));
            prop_assert!(!limits.distance_exceeded(start, Position::new(0.0, 0.0, travelled)));
        }
    }
}
