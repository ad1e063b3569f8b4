use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardKind {
    /// Live traffic object, looked up in the traffic registry.
    DynamicVehicle,
    /// Named node in the static scene graph.
    StaticObstacle,
}

/// The hazard a trial measures against, decided once when the trial is armed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HazardRef {
    DynamicVehicle(String),
    StaticObstacle(String),
    #[default]
    None,
}

impl HazardRef {
    /// Builds the reference from the two scenario name fields. A lead vehicle
    /// takes precedence when both are set; empty strings mean "not configured".
    pub fn from_names(lead_vehicle: &str, lead_obstacle: &str) -> Self {
        if !lead_vehicle.is_empty() {
            Self::DynamicVehicle(lead_vehicle.to_string())
        } else if !lead_obstacle.is_empty() {
            Self::StaticObstacle(lead_obstacle.to_string())
        } else {
            Self::None
        }
    }

    pub fn kind(&self) -> Option<HazardKind> {
        match self {
            Self::DynamicVehicle(_) => Some(HazardKind::DynamicVehicle),
            Self::StaticObstacle(_) => Some(HazardKind::StaticObstacle),
            Self::None => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::DynamicVehicle(name) | Self::StaticObstacle(name) => Some(name),
            Self::None => None,
        }
    }
}
