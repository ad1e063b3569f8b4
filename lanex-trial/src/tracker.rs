use lanex_core::{ConfigError, HazardRef, Position, SceneGraph, TrafficRegistry};

/// Resolves where the tracked hazard currently is.
pub struct HazardTracker<'a, T, S> {
    traffic: &'a T,
    scene: &'a S,
}

impl<'a, T: TrafficRegistry, S: SceneGraph> HazardTracker<'a, T, S> {
    pub fn new(traffic: &'a T, scene: &'a S) -> Self {
        Self { traffic, scene }
    }

    /// `Ok(None)` when no hazard is configured or the lead vehicle is not in
    /// the registry. A missing scene node is a configuration error.
    pub fn locate(&self, hazard: &HazardRef) -> Result<Option<Position>, ConfigError> {
        match hazard {
            HazardRef::DynamicVehicle(name) => Ok(self.traffic.find_by_name(name)),
            HazardRef::StaticObstacle(name) => self
                .scene
                .find_node_by_name(name)
                .map(Some)
                .ok_or_else(|| ConfigError::ObstacleNotFound(name.clone())),
            HazardRef::None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Named(HashMap<&'static str, Position>);

    impl TrafficRegistry for Named {
        fn find_by_name(&self, name: &str) -> Option<Position> {
            self.0.get(name).copied()
        }
    }

    impl SceneGraph for Named {
        fn find_node_by_name(&self, name: &str) -> Option<Position> {
            self.0.get(name).copied()
        }
    }

    #[test]
    fn looks_up_each_kind_in_its_own_source() {
        let traffic = Named(HashMap::from([("truck", Position::new(0.0, 0.0, 80.0))]));
        let scene = Named(HashMap::from([("cone_1", Position::new(1.0, 0.0, 40.0))]));
        let tracker = HazardTracker::new(&traffic, &scene);

        assert_eq!(
            tracker.locate(&HazardRef::DynamicVehicle("truck".into())),
            Ok(Some(Position::new(0.0, 0.0, 80.0)))
        );
        assert_eq!(
            tracker.locate(&HazardRef::StaticObstacle("cone_1".into())),
            Ok(Some(Position::new(1.0, 0.0, 40.0)))
        );
        assert_eq!(tracker.locate(&HazardRef::DynamicVehicle("cone_1".into())), Ok(None));
        assert_eq!(tracker.locate(&HazardRef::None), Ok(None));
    }

    #[test]
    fn missing_scene_node_is_a_configuration_error() {
        let traffic = Named(HashMap::new());
        let scene = Named(HashMap::new());
        let tracker = HazardTracker::new(&traffic, &scene);
        assert_eq!(
            tracker.locate(&HazardRef::StaticObstacle("cone_9".into())),
            Err(ConfigError::ObstacleNotFound("cone_9".into()))
        );
    }
}
