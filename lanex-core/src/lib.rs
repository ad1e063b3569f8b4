pub mod error;
pub mod hazard;
pub mod host;
pub mod lane;
pub mod phase;
pub mod position;
pub mod trial;

pub use error::{CollaboratorError, ConfigError};
pub use hazard::{HazardKind, HazardRef};
pub use host::{AudioCue, ReactionLogger, SceneGraph, Simulation, TrafficRegistry, VehicleState};
pub use lane::{LaneBoundary, LaneTable};
pub use phase::PhaseKind;
pub use position::Position;
pub use trial::{MissedRecord, ReactionRecord, TrialLog, TrialOutcome, TrialReport};
