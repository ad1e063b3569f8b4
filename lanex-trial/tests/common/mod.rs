#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use lanex_core::{
    AudioCue, CollaboratorError, LaneBoundary, LaneTable, MissedRecord, Position, ReactionLogger,
    ReactionRecord, SceneGraph, Simulation, TrafficRegistry, TrialLog, VehicleState,
};
use lanex_timing::ManualClock;
use lanex_trial::{LaneChangeTimer, MeasurementSettings, ReportingBridge, TrialConfig};

pub const EXPERIMENT_START_MS: i64 = 1_000_000;

#[derive(Debug, Clone, Default)]
pub struct FakeVehicle {
    pub position: Position,
    pub steering: f32,
    pub brake: f32,
    pub speed_kmh: f32,
}

impl VehicleState for FakeVehicle {
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

    // heading is +z
    fn forward_distance_to(&self, target: Position) -> f32 {
        target.z - self.position.z
    }
}

#[derive(Debug, Clone, Default)]
pub struct Registry(pub HashMap<String, Position>);

impl TrafficRegistry for Registry {
    fn find_by_name(&self, name: &str) -> Option<Position> {
        self.0.get(name).copied()
    }
}

impl SceneGraph for Registry {
    fn find_node_by_name(&self, name: &str) -> Option<Position> {
        self.0.get(name).copied()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeSim {
    pub vehicle: FakeVehicle,
    pub traffic: Registry,
    pub scene: Registry,
}

impl Simulation for FakeSim {
    type Vehicle = FakeVehicle;
    type Traffic = Registry;
    type Scene = Registry;

    fn vehicle(&self) -> &FakeVehicle {
        &self.vehicle
    }

    fn traffic(&self) -> &Registry {
        &self.traffic
    }

    fn scene(&self) -> &Registry {
        &self.scene
    }
}

impl FakeSim {
    /// Vehicle centred in lane "2" at 72 km/h, a lead vehicle 100 m ahead and a
    /// cone 60 m ahead.
    pub fn highway() -> Self {
        Self {
            vehicle: FakeVehicle {
                speed_kmh: 72.0,
                ..Default::default()
            },
            traffic: Registry(HashMap::from([(
                "lead".to_string(),
                Position::new(0.0, 0.0, 100.0),
            )])),
            scene: Registry(HashMap::from([(
                "cone_1".to_string(),
                Position::new(0.0, 0.0, 60.0),
            )])),
        }
    }
}

#[derive(Debug, Default)]
pub struct Journal {
    pub records: Vec<ReactionRecord>,
    pub missed: Vec<MissedRecord>,
    pub logs: Vec<TrialLog>,
}

impl ReactionLogger for Journal {
    fn add(&mut self, record: &ReactionRecord) -> Result<(), CollaboratorError> {
        self.records.push(record.clone());
        Ok(())
    }

    fn add_missed(&mut self, record: &MissedRecord) -> Result<(), CollaboratorError> {
        self.missed.push(record.clone());
        Ok(())
    }

    fn write_trial_log(&mut self, log: &TrialLog) -> Result<(), CollaboratorError> {
        self.logs.push(log.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Speaker(pub Vec<String>);

impl AudioCue for Speaker {
    fn play(&mut self, sound_id: &str) -> Result<(), CollaboratorError> {
        self.0.push(sound_id.to_string());
        Ok(())
    }
}

pub type TestTimer = LaneChangeTimer<ManualClock, Journal, Speaker>;

pub fn lanes() -> Arc<LaneTable> {
    Arc::new(
        LaneTable::new(vec![
            LaneBoundary::new("1", -6.0, -2.0).unwrap(),
            LaneBoundary::new("2", -2.0, 2.0).unwrap(),
            LaneBoundary::new("3", 2.0, 6.0).unwrap(),
        ])
        .unwrap(),
    )
}

pub fn timer(clock: &ManualClock) -> TestTimer {
    LaneChangeTimer::new(
        "lane_change_1",
        clock.clone(),
        lanes(),
        MeasurementSettings::default(),
        EXPERIMENT_START_MS,
        ReportingBridge::new(Journal::default(), Speaker::default()),
    )
}

/// Start lane "2", target lane "1", lead vehicle hazard.
pub fn broken_vehicle_config() -> TrialConfig {
    TrialConfig {
        reaction_group_id: "broken_vehicle".into(),
        start_lane: "2".into(),
        target_lane: "1".into(),
        min_steering_angle: 0.01,
        task_completion_time_ms: 10_000,
        task_completion_distance: 0.0,
        allow_brake: false,
        hold_lane_for_ms: 2_000,
        fail_sound: "fail".into(),
        success_sound: "success".into(),
        lead_vehicle: "lead".into(),
        lead_obstacle: String::new(),
        comment: "right lane blocked".into(),
    }
}

/// Advances the clock in `step_ms` increments up to `until_ms` after the
/// current time, letting `script` move the vehicle before each tick. Stops at
/// the first report.
pub fn drive(
    timer: &mut TestTimer,
    sim: &mut FakeSim,
    clock: &ManualClock,
    step_ms: i64,
    until_ms: i64,
    mut script: impl FnMut(i64, &mut FakeVehicle),
) -> Option<lanex_core::TrialReport> {
    let start = lanex_timing::Clock::now_ms(clock);
    let mut elapsed = 0;
    while elapsed < until_ms {
        elapsed += step_ms;
        clock.set(start + elapsed);
        sim.vehicle.position.z += sim.vehicle.speed_kmh / 3.6 * step_ms as f32 / 1000.0;
        script(elapsed, &mut sim.vehicle);
        if let Some(report) = timer.update(sim).expect("scenario is well configured") {
            return Some(report);
        }
    }
    None
}
