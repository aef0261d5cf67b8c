//! Pickups: lights and the level treasure
//!
//! Features are scattered uniformly over the play rectangle, revealed when
//! they enter the visibility radius and consumed when they enter the collect
//! radius. Iteration is always in ascending id order.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::visibility::VisibilityField;
use crate::geo::{self, GeoPoint, MetricOffset};
use crate::snap::{SnapReply, SnapRequest, SnapTarget, Snappable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureKind {
    /// Collecting it clears the level
    Treasure,
    /// Collecting it grows the visibility radius
    Light,
}

/// A pickup on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: u32,
    pub kind: FeatureKind,
    pub position: GeoPoint,
    /// Inside the player's visibility radius as of the last evaluation
    pub visible: bool,
}

impl Feature {
    pub fn new(id: u32, kind: FeatureKind, position: GeoPoint) -> Self {
        Self {
            id,
            kind,
            position,
            visible: false,
        }
    }
}

impl Snappable for Feature {
    fn snap_request(&self, session: u64) -> SnapRequest {
        SnapRequest {
            session,
            target: SnapTarget::Feature(self.id),
            step: 0,
            point: self.position,
        }
    }

    fn apply_correction(&mut self, reply: &SnapReply) -> bool {
        if reply.request.target != SnapTarget::Feature(self.id) {
            return false;
        }
        match reply.corrected {
            Some(point) => {
                self.position = point;
                true
            }
            None => false,
        }
    }
}

/// Result of one evaluation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub treasure_collected: bool,
    pub lights_collected: u32,
}

/// Owns the active feature set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureManager {
    /// Active features (sorted by id)
    features: Vec<Feature>,
    /// Visibility gained per collected light (meters)
    light_boost_m: f64,
    next_id: u32,
}

impl FeatureManager {
    pub fn new(light_boost_m: f64) -> Self {
        Self {
            features: Vec::new(),
            light_boost_m,
            next_id: 1,
        }
    }

    fn next_feature_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Replace the active set with `count` freshly placed features.
    ///
    /// Each axis is offset independently by `(0.5 - U) * size`, so positions
    /// are uniform over the rectangle, not a disc. With `include_treasure`
    /// exactly one of them is the treasure (a zero count still yields it).
    pub fn spawn<R: Rng>(
        &mut self,
        rng: &mut R,
        center: GeoPoint,
        size: MetricOffset,
        count: u32,
        include_treasure: bool,
    ) {
        let count = if include_treasure { count.max(1) } else { count };
        let treasure_index = include_treasure.then(|| rng.random_range(0..count));

        self.features.clear();
        for i in 0..count {
            let delta = MetricOffset::new(
                (0.5 - rng.random::<f64>()) * size.dx,
                (0.5 - rng.random::<f64>()) * size.dy,
            );
            let kind = if treasure_index == Some(i) {
                FeatureKind::Treasure
            } else {
                FeatureKind::Light
            };
            let id = self.next_feature_id();
            self.features
                .push(Feature::new(id, kind, geo::offset(center, delta, 1.0)));
        }

        log::info!(
            "Spawned {} features ({})",
            self.features.len(),
            if include_treasure { "with treasure" } else { "lights only" }
        );
    }

    /// Collect whatever is in reach and refresh visibility for the rest.
    ///
    /// Lights grow `field` as they are collected, so later features in the
    /// same pass see the larger radius.
    pub fn evaluate(&mut self, field: &mut VisibilityField, player: GeoPoint) -> Evaluation {
        let mut outcome = Evaluation::default();
        let light_boost = self.light_boost_m;

        self.features.retain_mut(|feature| {
            if field.is_within_collect_radius(player, feature) {
                match feature.kind {
                    FeatureKind::Treasure => {
                        log::info!("Treasure {} collected", feature.id);
                        outcome.treasure_collected = true;
                    }
                    FeatureKind::Light => {
                        field.grow(light_boost);
                        outcome.lights_collected += 1;
                        log::debug!(
                            "Light {} collected, visibility now {:.1} m",
                            feature.id,
                            field.visibility_radius()
                        );
                    }
                }
                false
            } else {
                feature.visible = field.is_within_visibility_radius(player, feature);
                true
            }
        });

        outcome
    }

    /// Update visibility flags only; nothing is collected
    pub fn refresh_visibility(&mut self, field: &VisibilityField, player: GeoPoint) {
        for feature in &mut self.features {
            feature.visible = field.is_within_visibility_radius(player, feature);
        }
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn feature_mut(&mut self, id: u32) -> Option<&mut Feature> {
        self.features.iter_mut().find(|f| f.id == id)
    }

    pub fn treasure(&self) -> Option<&Feature> {
        self.features.iter().find(|f| f.kind == FeatureKind::Treasure)
    }

    pub fn remaining_lights(&self) -> usize {
        self.features
            .iter()
            .filter(|f| f.kind == FeatureKind::Light)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Snap requests for every active feature
    pub fn snap_requests(&self, session: u64) -> Vec<SnapRequest> {
        self.features.iter().map(|f| f.snap_request(session)).collect()
    }

    /// Put a feature into the active set directly (scripted levels, tests)
    pub fn insert(&mut self, kind: FeatureKind, position: GeoPoint) -> u32 {
        let id = self.next_feature_id();
        self.features.push(Feature::new(id, kind, position));
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::boundary::GameBoundary;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const CENTER: GeoPoint = GeoPoint::new(48.40, 9.03);
    const SIZE: MetricOffset = MetricOffset::new(500.0, 500.0);

    fn east_of(meters: f64) -> GeoPoint {
        geo::offset(CENTER, MetricOffset::new(meters, 0.0), 1.0)
    }

    #[test]
    fn test_spawn_places_features_inside_boundary() {
        let boundary = GameBoundary::new(CENTER, SIZE).unwrap();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut manager = FeatureManager::new(10.0);
        manager.spawn(&mut rng, CENTER, SIZE, 200, true);

        assert_eq!(manager.features().len(), 200);
        for feature in manager.features() {
            assert!(boundary.contains(feature.position));
            assert!(!feature.visible);
        }
    }

    #[test]
    fn test_spawn_exactly_one_treasure() {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut manager = FeatureManager::new(10.0);
        for _ in 0..20 {
            manager.spawn(&mut rng, CENTER, SIZE, 10, true);
            let treasures = manager
                .features()
                .iter()
                .filter(|f| f.kind == FeatureKind::Treasure)
                .count();
            assert_eq!(treasures, 1);
            assert_eq!(manager.remaining_lights(), 9);
        }
    }

    #[test]
    fn test_spawn_lights_only() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut manager = FeatureManager::new(10.0);
        manager.spawn(&mut rng, CENTER, SIZE, 5, false);
        assert!(manager.treasure().is_none());
        assert_eq!(manager.remaining_lights(), 5);

        manager.spawn(&mut rng, CENTER, SIZE, 0, true);
        assert_eq!(manager.features().len(), 1);
        assert!(manager.treasure().is_some());
    }

    #[test]
    fn test_spawn_is_deterministic_per_seed() {
        let mut a = FeatureManager::new(10.0);
        let mut b = FeatureManager::new(10.0);
        a.spawn(&mut Pcg32::seed_from_u64(99), CENTER, SIZE, 10, true);
        b.spawn(&mut Pcg32::seed_from_u64(99), CENTER, SIZE, 10, true);
        assert_eq!(a.features(), b.features());
    }

    #[test]
    fn test_spawn_ids_keep_increasing() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut manager = FeatureManager::new(10.0);
        manager.spawn(&mut rng, CENTER, SIZE, 3, true);
        let last = manager.features().last().unwrap().id;
        manager.spawn(&mut rng, CENTER, SIZE, 3, true);
        assert!(manager.features().iter().all(|f| f.id > last));
    }

    #[test]
    fn test_evaluate_collects_light_and_grows_field() {
        let mut manager = FeatureManager::new(15.0);
        let light = manager.insert(FeatureKind::Light, east_of(5.0));
        let far = manager.insert(FeatureKind::Light, east_of(40.0));
        let hidden = manager.insert(FeatureKind::Light, east_of(200.0));

        let mut field = VisibilityField::new(10.0, 50.0);
        let outcome = manager.evaluate(&mut field, CENTER);

        assert_eq!(outcome.lights_collected, 1);
        assert!(!outcome.treasure_collected);
        assert_eq!(field.visibility_radius(), 65.0);
        assert!(manager.feature_mut(light).is_none());
        assert!(manager.feature_mut(far).unwrap().visible);
        assert!(!manager.feature_mut(hidden).unwrap().visible);
    }

    #[test]
    fn test_evaluate_reports_treasure() {
        let mut manager = FeatureManager::new(15.0);
        manager.insert(FeatureKind::Treasure, east_of(2.0));
        manager.insert(FeatureKind::Light, east_of(300.0));

        let mut field = VisibilityField::new(10.0, 50.0);
        let outcome = manager.evaluate(&mut field, CENTER);
        assert!(outcome.treasure_collected);
        assert!(manager.treasure().is_none());
        assert_eq!(field.visibility_radius(), 50.0);
    }

    #[test]
    fn test_visibility_toggles_back_off() {
        let mut manager = FeatureManager::new(0.0);
        let id = manager.insert(FeatureKind::Light, east_of(30.0));
        let mut field = VisibilityField::new(1.0, 50.0);

        manager.evaluate(&mut field, CENTER);
        assert!(manager.feature_mut(id).unwrap().visible);

        field.decay(30.0);
        manager.evaluate(&mut field, CENTER);
        assert!(!manager.feature_mut(id).unwrap().visible);
    }

    #[test]
    fn test_refresh_visibility_never_collects() {
        let mut manager = FeatureManager::new(15.0);
        let on_top = manager.insert(FeatureKind::Treasure, CENTER);
        let field = VisibilityField::new(10.0, 50.0);

        manager.refresh_visibility(&field, CENTER);
        assert!(manager.feature_mut(on_top).unwrap().visible);
        assert_eq!(manager.features().len(), 1);
    }

    #[test]
    fn test_feature_correction_matches_target() {
        let mut feature = Feature::new(4, FeatureKind::Light, CENTER);
        let snapped = east_of(3.0);

        let other = SnapReply {
            request: Feature::new(5, FeatureKind::Light, CENTER).snap_request(1),
            corrected: Some(snapped),
        };
        assert!(!feature.apply_correction(&other));

        let failed = SnapReply::failed(feature.snap_request(1));
        assert!(!feature.apply_correction(&failed));
        assert_eq!(feature.position, CENTER);

        let mine = SnapReply {
            request: feature.snap_request(1),
            corrected: Some(snapped),
        };
        assert!(feature.apply_correction(&mine));
        assert_eq!(feature.position, snapped);
    }
}
