pub mod config;
pub mod lateral;
pub mod phase;
pub mod report;
pub mod sampler;
pub mod state;
pub mod tracker;
pub mod trial;
pub mod ttc;

pub use config::{Limits, MeasurementSettings, TrialConfig};
pub use lateral::peak_lateral_accel;
pub use phase::{Emission, TickContext, Tick, TrialPhase};
pub use report::ReportingBridge;
pub use sampler::{KinematicSampler, Sample};
pub use state::LaneChangeTimer;
pub use tracker::HazardTracker;
pub use trial::{ActiveTrial, Milestones, Watchdog};
pub use ttc::{TtcSummary, estimate_ttc};
