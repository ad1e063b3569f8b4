//! Static lane geometry and lateral lane lookup.
//!
//! Lanes are intervals on the lateral (`x`) axis, loaded once from scenario
//! data. Table order matters: when intervals overlap, the first entry wins.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One lane's lateral extent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneBoundary {
    pub lane_id: String,
    pub x_min: f32,
    pub x_max: f32,
}

impl LaneBoundary {
    pub fn new(lane_id: impl Into<String>, x_min: f32, x_max: f32) -> Result<Self, ConfigError> {
        let lane = Self {
            lane_id: lane_id.into(),
            x_min,
            x_max,
        };
        lane.validate()?;
        Ok(lane)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.x_min > self.x_max {
            return Err(ConfigError::InvalidLaneBounds {
                lane: self.lane_id.clone(),
                x_min: self.x_min,
                x_max: self.x_max,
            });
        }
        Ok(())
    }

    pub fn midpoint(&self) -> f32 {
        (self.x_max - self.x_min) / 2.0 + self.x_min
    }

    /// Inclusive containment test. A positive `margin` widens the lane on both
    /// sides, a negative one shrinks it.
    pub fn contains(&self, x: f32, margin: f32) -> bool {
        self.x_min - margin <= x && x <= self.x_max + margin
    }

    /// True when `x` lies strictly more than `clearance` away from the lane
    /// centre, on either side.
    pub fn is_clear_of_centre(&self, x: f32, clearance: f32) -> bool {
        let mid = self.midpoint();
        mid + clearance < x || x < mid - clearance
    }
}

/// Ordered lane table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LaneBoundary>", into = "Vec<LaneBoundary>")]
pub struct LaneTable {
    lanes: Vec<LaneBoundary>,
}

impl LaneTable {
    pub fn new(lanes: Vec<LaneBoundary>) -> Result<Self, ConfigError> {
        for lane in &lanes {
            lane.validate()?;
        }
        Ok(Self { lanes })
    }

    /// First lane whose bounds, shrunk by `half_vehicle_width` on each side,
    /// contain `x`. `None` when the vehicle is between lanes or off-road.
    pub fn resolve_lane(&self, x: f32, half_vehicle_width: f32) -> Option<&str> {
        self.lanes
            .iter()
            .find(|lane| lane.contains(x, -half_vehicle_width))
            .map(|lane| lane.lane_id.as_str())
    }

    pub fn get(&self, lane_id: &str) -> Option<&LaneBoundary> {
        self.lanes.iter().find(|lane| lane.lane_id == lane_id)
    }

    pub fn lane(&self, lane_id: &str) -> Result<&LaneBoundary, ConfigError> {
        self.get(lane_id)
            .ok_or_else(|| ConfigError::UnknownLane(lane_id.to_string()))
    }

    /// Containment test against a named lane, see [`LaneBoundary::contains`].
    pub fn is_within_lane(&self, x: f32, lane_id: &str, margin: f32) -> Result<bool, ConfigError> {
        Ok(self.lane(lane_id)?.contains(x, margin))
    }

    pub fn iter(&self) -> impl Iterator<Item = &LaneBoundary> {
        self.lanes.iter()
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }
}

impl TryFrom<Vec<LaneBoundary>> for LaneTable {
    type Error = ConfigError;

    fn try_from(lanes: Vec<LaneBoundary>) -> Result<Self, Self::Error> {
        Self::new(lanes)
    }
}

impl From<LaneTable> for Vec<LaneBoundary> {
    fn from(table: LaneTable) -> Self {
        table.lanes
    }
}
