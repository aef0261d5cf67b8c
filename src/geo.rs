//! Geographic coordinates and the local metric plane
//!
//! Positions are stored as latitude/longitude; all distance reasoning happens
//! in spherical Web Mercator (EPSG:3857) meters, the same plane slippy-map
//! viewers draw in. Over a sub-kilometer play area the plane is treated as
//! flat and Euclidean.
//!
//! Everything here is a pure function of its inputs.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Sphere radius used by Web Mercator (meters)
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Latitude limit of Web Mercator (degrees); the projection diverges at the poles
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// A point on the Earth's surface, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether the point can be projected into the metric plane
    pub fn is_projectable(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude.abs() <= MAX_LATITUDE
            && self.longitude.abs() <= 180.0
    }
}

/// Displacement in the metric plane: `dx` east, `dy` north (meters)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricOffset {
    pub dx: f64,
    pub dy: f64,
}

impl MetricOffset {
    pub const ZERO: Self = Self { dx: 0.0, dy: 0.0 };

    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.as_dvec2().length()
    }

    #[inline]
    pub fn as_dvec2(&self) -> DVec2 {
        DVec2::new(self.dx, self.dy)
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self::new(self.dx * factor, self.dy * factor)
    }
}

impl From<DVec2> for MetricOffset {
    fn from(v: DVec2) -> Self {
        Self::new(v.x, v.y)
    }
}

/// Forward projection: degrees -> Web Mercator meters
#[inline]
pub fn project(point: GeoPoint) -> DVec2 {
    let lambda = point.longitude.to_radians();
    let phi = point.latitude.to_radians();
    DVec2::new(
        EARTH_RADIUS_M * lambda,
        EARTH_RADIUS_M * (std::f64::consts::FRAC_PI_4 + phi / 2.0).tan().ln(),
    )
}

/// Inverse projection: Web Mercator meters -> degrees
#[inline]
pub fn unproject(xy: DVec2) -> GeoPoint {
    let lambda = xy.x / EARTH_RADIUS_M;
    let phi = 2.0 * (xy.y / EARTH_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2;
    GeoPoint::new(phi.to_degrees(), lambda.to_degrees())
}

/// Metric displacement from `reference` to `target`
pub fn to_metric_offset(reference: GeoPoint, target: GeoPoint) -> MetricOffset {
    (project(target) - project(reference)).into()
}

/// Move `reference` by `factor * delta` in the metric plane
pub fn offset(reference: GeoPoint, delta: MetricOffset, factor: f64) -> GeoPoint {
    unproject(project(reference) + delta.as_dvec2() * factor)
}

/// Euclidean distance between the projections of `a` and `b` (meters)
pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    project(a).distance(project(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TUEBINGEN: GeoPoint = GeoPoint::new(48.40, 9.03);

    #[test]
    fn test_origin_projects_to_zero() {
        let xy = project(GeoPoint::new(0.0, 0.0));
        assert!(xy.length() < 1e-9);
    }

    #[test]
    fn test_offset_moves_expected_distance() {
        let moved = offset(TUEBINGEN, MetricOffset::new(30.0, -40.0), 1.0);
        assert!((distance_meters(TUEBINGEN, moved) - 50.0).abs() < 1e-6);

        let back = to_metric_offset(TUEBINGEN, moved);
        assert!((back.dx - 30.0).abs() < 1e-6);
        assert!((back.dy + 40.0).abs() < 1e-6);
    }

    #[test]
    fn test_north_is_positive_dy() {
        let north = offset(TUEBINGEN, MetricOffset::new(0.0, 100.0), 1.0);
        assert!(north.latitude > TUEBINGEN.latitude);
        assert!((north.longitude - TUEBINGEN.longitude).abs() < 1e-12);
    }

    #[test]
    fn test_projectable_range() {
        assert!(TUEBINGEN.is_projectable());
        assert!(!GeoPoint::new(89.0, 0.0).is_projectable());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_projectable());
        assert!(!GeoPoint::new(0.0, 181.0).is_projectable());
    }

    proptest! {
        #[test]
        fn prop_projection_round_trip(lat in -85.0f64..85.0, lon in -180.0f64..180.0) {
            let p = GeoPoint::new(lat, lon);
            let q = unproject(project(p));
            prop_assert!((p.latitude - q.latitude).abs() < 1e-6);
            prop_assert!((p.longitude - q.longitude).abs() < 1e-6);
        }

        #[test]
        fn prop_offset_symmetry(
            lat in -80.0f64..80.0,
            lon in -170.0f64..170.0,
            dx in -1000.0f64..1000.0,
            dy in -1000.0f64..1000.0,
        ) {
            let p = GeoPoint::new(lat, lon);
            let d = MetricOffset::new(dx, dy);
            let a = offset(p, d, 0.5);
            let b = offset(p, d, -0.5);
            prop_assert!((distance_meters(a, b) - d.length()).abs() < 1e-3);
        }
    }
}
