/// Scenario configuration problems. Fatal to the trial that hit them, never to
/// the surrounding simulation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("No lane called {0:?} in the lane table")]
    UnknownLane(String),
    #[error("No scene node called {0:?}")]
    ObstacleNotFound(String),
    #[error("Lane {lane:?} has inverted bounds ({x_min} > {x_max})")]
    InvalidLaneBounds { lane: String, x_min: f32, x_max: f32 },
}

/// A logger or audio collaborator failed to act on a report.
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("{0} unavailable")]
    Unavailable(&'static str),
}
