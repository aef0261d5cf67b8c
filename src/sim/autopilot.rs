//! Idle/demo mode: the game plays itself
//!
//! Heads for the treasure when it is in sight, otherwise the nearest visible
//! light, otherwise wanders with a slowly drifting heading. Only features the
//! player can actually see are considered.

use glam::{DVec2, Vec2};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::feature::{Feature, FeatureKind};
use super::state::Session;
use crate::geo;

/// How far from the player the simulated tap lands (pixels)
const TAP_DISTANCE_PX: f64 = 100.0;
/// Maximum heading change per wandering step (radians)
const WANDER_JITTER: f64 = 0.5;

pub struct Autopilot {
    rng: Pcg32,
    heading: f64,
}

impl Autopilot {
    pub fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let heading = rng.random_range(0.0..std::f64::consts::TAU);
        Self { rng, heading }
    }

    /// Screen position to tap, given where the player is drawn
    pub fn next_target(&mut self, session: &Session, screen_origin: Vec2) -> Vec2 {
        let player = session.player.position();
        let direction = match pick_feature(session) {
            Some(feature) => geo::to_metric_offset(player, feature.position).as_dvec2(),
            None => self.wander(session),
        };
        screen_origin + (direction.normalize_or_zero() * TAP_DISTANCE_PX).as_vec2()
    }

    fn wander(&mut self, session: &Session) -> DVec2 {
        let player = session.player.position();
        if !session.boundary.contains(player) {
            // Wandered off the map: turn back toward the center
            let home = geo::to_metric_offset(player, session.boundary.center()).as_dvec2();
            self.heading = home.y.atan2(home.x);
        } else {
            self.heading += self.rng.random_range(-WANDER_JITTER..WANDER_JITTER);
        }
        DVec2::from_angle(self.heading)
    }
}

/// The visible treasure if any, else the nearest visible light
fn pick_feature(session: &Session) -> Option<&Feature> {
    let player = session.player.position();
    let visible = session.features.features().iter().filter(|f| f.visible);

    if let Some(treasure) = visible.clone().find(|f| f.kind == FeatureKind::Treasure) {
        return Some(treasure);
    }
    visible.min_by(|a, b| {
        geo::distance_meters(player, a.position)
            .partial_cmp(&geo::distance_meters(player, b.position))
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}
