// scenario.rs

use anyhow::{bail, Context, Result};
use lanex_core::{
    HazardKind, LaneTable, Position, SceneGraph, Simulation, TrafficRegistry, VehicleState,
};
use lanex_sync::BroadcastSettings;
use lanex_trial::{MeasurementSettings, TrialConfig};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

fn default_tick_ms() -> i64 {
    16
}

fn default_gap_ms() -> i64 {
    2_000
}

/// Replay scenario: lane layout, measurement settings and scripted trials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub lanes: LaneTable,
    #[serde(default)]
    pub settings: MeasurementSettings,
    #[serde(default)]
    pub broadcast: BroadcastSettings,
    /// Replay clock origin. Realtime runs use the wall clock instead.
    #[serde(default)]
    pub experiment_start_ms: i64,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: i64,
    /// Pause between trials.
    #[serde(default = "default_gap_ms")]
    pub gap_ms: i64,
    #[serde(default)]
    pub seed: u64,
    pub trials: Vec<ScriptedTrial>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read scenario {}", path.display()))?;
        let scenario: Scenario = serde_json::from_str(&text)
            .with_context(|| format!("invalid scenario {}", path.display()))?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<()> {
        if self.tick_ms <= 0 {
            bail!("tick_ms must be positive, got {}", self.tick_ms);
        }
        for (i, trial) in self.trials.iter().enumerate() {
            if trial.trace.is_empty() {
                bail!("trial {i} has an empty trace");
            }
            if trial.trace.windows(2).any(|w| w[1].t_ms <= w[0].t_ms) {
                bail!("trial {i} trace keyframes are not in time order");
            }
        }
        Ok(())
    }
}

/// One trial: the setup parameters plus how the driver behaves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedTrial {
    pub setup: TrialConfig,
    pub trace: Vec<Keyframe>,
    #[serde(default)]
    pub hazards: Vec<HazardPlacement>,
    /// Replay stops here if the trial has not ended. Defaults to one second
    /// past the last keyframe.
    #[serde(default)]
    pub duration_ms: Option<i64>,
    /// Amplitude of uniform lateral jitter added to every sample, in metres.
    #[serde(default)]
    pub lateral_noise: f32,
}

impl ScriptedTrial {
    pub fn duration_ms(&self) -> i64 {
        self.duration_ms
            .unwrap_or_else(|| self.trace.last().map_or(0, |k| k.t_ms) + 1_000)
    }
}

/// Driver input at `t_ms` after arming; values between keyframes are
/// linearly interpolated.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Keyframe {
    pub t_ms: i64,
    pub x: f32,
    pub steering: f32,
    pub brake: f32,
    pub speed_kmh: f32,
}

impl Keyframe {
    fn lerp(&self, next: &Keyframe, t_ms: i64) -> Keyframe {
        let span = (next.t_ms - self.t_ms) as f32;
        let f = (t_ms - self.t_ms) as f32 / span;
        let mix = |a: f32, b: f32| a + (b - a) * f;
        Keyframe {
            t_ms,
            x: mix(self.x, next.x),
            steering: mix(self.steering, next.steering),
            brake: mix(self.brake, next.brake),
            speed_kmh: mix(self.speed_kmh, next.speed_kmh),
        }
    }
}

/// Samples a keyframe trace, clamping outside its time range.
pub fn sample_trace(trace: &[Keyframe], t_ms: i64) -> Keyframe {
    let (Some(first), Some(last)) = (trace.first(), trace.last()) else {
        return Keyframe::default();
    };
    if t_ms <= first.t_ms {
        return Keyframe { t_ms, ..*first };
    }
    if t_ms >= last.t_ms {
        return Keyframe { t_ms, ..*last };
    }
    let i = trace.partition_point(|k| k.t_ms <= t_ms);
    trace[i - 1].lerp(&trace[i], t_ms)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardPlacement {
    pub name: String,
    pub kind: HazardKind,
    pub position: Position,
    /// Forward speed of a lead vehicle; static obstacles ignore it.
    #[serde(default)]
    pub speed_kmh: f32,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedVehicle {
    pub position: Position,
    pub steering: f32,
    pub brake: f32,
    pub speed_kmh: f32,
}

impl VehicleState for ScriptedVehicle {
    fn position(&self) -> Position {
        self.position
    }

    fn steering_angle(&self) -> f32 {
        self.steering
    }

    fn brake_pedal_intensity(&self) -> f32 {
        self.brake
    }

    fn speed_kmh(&self) -> f32 {
        self.speed_kmh
    }

    // Road runs along +z.
    fn forward_distance_to(&self, target: Position) -> f32 {
        target.z - self.position.z
    }
}

#[derive(Debug, Clone, Default)]
pub struct Placements(HashMap<String, Position>);

impl TrafficRegistry for Placements {
    fn find_by_name(&self, name: &str) -> Option<Position> {
        self.0.get(name).copied()
    }
}

impl SceneGraph for Placements {
    fn find_node_by_name(&self, name: &str) -> Option<Position> {
        self.0.get(name).copied()
    }
}

/// Simulation state reconstructed from a scripted trial.
#[derive(Debug, Clone)]
pub struct ScriptedSim {
    vehicle: ScriptedVehicle,
    traffic: Placements,
    scene: Placements,
    traffic_speed: HashMap<String, f32>,
    trace: Vec<Keyframe>,
    lateral_noise: f32,
    last_t_ms: i64,
}

impl ScriptedSim {
    pub fn new(trial: &ScriptedTrial) -> Self {
        let mut traffic = Placements::default();
        let mut scene = Placements::default();
        let mut traffic_speed = HashMap::new();
        for hazard in &trial.hazards {
            match hazard.kind {
                HazardKind::DynamicVehicle => {
                    traffic.0.insert(hazard.name.clone(), hazard.position);
                    traffic_speed.insert(hazard.name.clone(), hazard.speed_kmh);
                }
                HazardKind::StaticObstacle => {
                    scene.0.insert(hazard.name.clone(), hazard.position);
                }
            }
        }

        let start = sample_trace(&trial.trace, 0);
        Self {
            vehicle: ScriptedVehicle {
                position: Position::new(start.x, 0.0, 0.0),
                steering: start.steering,
                brake: start.brake,
                speed_kmh: start.speed_kmh,
            },
            traffic,
            scene,
            traffic_speed,
            trace: trial.trace.clone(),
            lateral_noise: trial.lateral_noise,
            last_t_ms: 0,
        }
    }

    /// Moves everything to `t_ms` after arming.
    pub fn step<R: Rng>(&mut self, t_ms: i64, rng: &mut R) {
        let dt_s = (t_ms - self.last_t_ms).max(0) as f32 / 1000.0;
        self.last_t_ms = t_ms;

        let frame = sample_trace(&self.trace, t_ms);
        let jitter = if self.lateral_noise > 0.0 {
            rng.random_range(-self.lateral_noise..=self.lateral_noise)
        } else {
            0.0
        };
        let vehicle = &mut self.vehicle;
        vehicle.position.x = frame.x + jitter;
        vehicle.position.z += vehicle.speed_kmh / 3.6 * dt_s;
        vehicle.steering = frame.steering;
        vehicle.brake = frame.brake;
        vehicle.speed_kmh = frame.speed_kmh;

        for (name, position) in self.traffic.0.iter_mut() {
            let speed = self.traffic_speed.get(name).copied().unwrap_or_default();
            position.z += speed / 3.6 * dt_s;
        }
    }
}

impl Simulation for ScriptedSim {
    type Vehicle = ScriptedVehicle;
    type Traffic = Placements;
    type Scene = Placements;

    fn vehicle(&self) -> &ScriptedVehicle {
        &self.vehicle
    }

    fn traffic(&self) -> &Placements {
        &self.traffic
    }

    fn scene(&self) -> &Placements {
        &self.scene
    }
}
