//! Collection and visibility radii around the player
//!
//! The visibility radius doubles as the player's light budget: walking burns
//! it down, lights top it up, and reaching zero loses the run. The field only
//! reports the floor crossing; the controller decides what happens next.

use serde::{Deserialize, Serialize};

use super::feature::Feature;
use crate::geo::{self, GeoPoint};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityField {
    collect_radius_m: f64,
    visibility_radius_m: f64,
}

impl VisibilityField {
    /// Negative radii are clamped to zero
    pub fn new(collect_radius_m: f64, visibility_radius_m: f64) -> Self {
        Self {
            collect_radius_m: collect_radius_m.max(0.0),
            visibility_radius_m: visibility_radius_m.max(0.0),
        }
    }

    pub fn collect_radius(&self) -> f64 {
        self.collect_radius_m
    }

    pub fn visibility_radius(&self) -> f64 {
        self.visibility_radius_m
    }

    pub fn is_exhausted(&self) -> bool {
        self.visibility_radius_m <= 0.0
    }

    pub fn distance_to_player(&self, player: GeoPoint, feature: &Feature) -> f64 {
        geo::distance_meters(player, feature.position)
    }

    pub fn is_within_collect_radius(&self, player: GeoPoint, feature: &Feature) -> bool {
        self.distance_to_player(player, feature) <= self.collect_radius_m
    }

    pub fn is_within_visibility_radius(&self, player: GeoPoint, feature: &Feature) -> bool {
        self.distance_to_player(player, feature) <= self.visibility_radius_m
    }

    /// Expand the visibility radius (a light was collected)
    pub fn grow(&mut self, amount_m: f64) {
        self.visibility_radius_m += amount_m.max(0.0);
    }

    /// Shrink the visibility radius, clamping at zero.
    ///
    /// Returns `true` when the floor has been reached.
    pub fn decay(&mut self, amount_m: f64) -> bool {
        self.visibility_radius_m = (self.visibility_radius_m - amount_m.max(0.0)).max(0.0);
        self.is_exhausted()
    }
}
