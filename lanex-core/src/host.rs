//! Interfaces the host simulation and the experiment pipeline provide.
//!
//! The engine never reaches for ambient singletons: every collaborator is a
//! handle passed in by the host.

use crate::error::CollaboratorError;
use crate::position::Position;
use crate::trial::{MissedRecord, ReactionRecord, TrialLog};

/// Current pose and controls of the driven vehicle.
pub trait VehicleState {
    fn position(&self) -> Position;

    fn lateral_position(&self) -> f32 {
        self.position().x
    }

    fn steering_angle(&self) -> f32;
    fn brake_pedal_intensity(&self) -> f32;
    fn speed_kmh(&self) -> f32;

    /// Distance to `target` along the vehicle's heading.
    fn forward_distance_to(&self, target: Position) -> f32;
}

/// Live traffic objects, looked up by exact name.
pub trait TrafficRegistry {
    fn find_by_name(&self, name: &str) -> Option<Position>;
}

/// Static scene nodes. A miss means the scenario is misconfigured.
pub trait SceneGraph {
    fn find_node_by_name(&self, name: &str) -> Option<Position>;
}

/// Read-only view of the simulation for one tick.
pub trait Simulation {
    type Vehicle: VehicleState;
    type Traffic: TrafficRegistry;
    type Scene: SceneGraph;

    fn vehicle(&self) -> &Self::Vehicle;
    fn traffic(&self) -> &Self::Traffic;
    fn scene(&self) -> &Self::Scene;
}

/// Persists trial records.
pub trait ReactionLogger {
    fn add(&mut self, record: &ReactionRecord) -> Result<(), CollaboratorError>;
    fn add_missed(&mut self, record: &MissedRecord) -> Result<(), CollaboratorError>;
    fn write_trial_log(&mut self, log: &TrialLog) -> Result<(), CollaboratorError>;
}

/// Plays feedback sounds by id.
pub trait AudioCue {
    fn play(&mut self, sound_id: &str) -> Result<(), CollaboratorError>;
}
