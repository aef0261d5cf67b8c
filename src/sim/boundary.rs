//! Play-area boundary
//!
//! A rectangle in the metric plane, centered on a geographic point. The
//! corners are derived once at construction and never follow the player.

use glam::{DVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};
use crate::geo::{self, GeoPoint, MetricOffset};

/// Geographic bounds of the currently visible map viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

/// Which sides of the play area the viewport extends past
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EdgeFlags {
    pub south: bool,
    pub north: bool,
    pub west: bool,
    pub east: bool,
}

impl EdgeFlags {
    pub fn any(&self) -> bool {
        self.south || self.north || self.west || self.east
    }
}

/// Out-of-bounds shading rectangle in window pixels (origin bottom-left, y up)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayRect {
    pub pos: Vec2,
    pub size: Vec2,
}

/// The rectangular play area
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameBoundary {
    center: GeoPoint,
    size: MetricOffset,
    lower_left: GeoPoint,
    upper_right: GeoPoint,
}

impl GameBoundary {
    /// Build the boundary from its center and full metric size
    pub fn new(center: GeoPoint, size: MetricOffset) -> GameResult<Self> {
        if !center.is_projectable() {
            return Err(GameError::InvalidConfig(format!(
                "play-area center {center:?} is outside the projectable range"
            )));
        }
        if !(size.dx.is_finite() && size.dy.is_finite() && size.dx > 0.0 && size.dy > 0.0) {
            return Err(GameError::InvalidConfig(format!(
                "play-area size must be positive, got {} x {} m",
                size.dx, size.dy
            )));
        }

        Ok(Self {
            center,
            size,
            lower_left: geo::offset(center, size, -0.5),
            upper_right: geo::offset(center, size, 0.5),
        })
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    pub fn size(&self) -> MetricOffset {
        self.size
    }

    pub fn lower_left(&self) -> GeoPoint {
        self.lower_left
    }

    pub fn upper_right(&self) -> GeoPoint {
        self.upper_right
    }

    #[inline]
    pub fn south(&self) -> f64 {
        self.lower_left.latitude
    }

    #[inline]
    pub fn north(&self) -> f64 {
        self.upper_right.latitude
    }

    #[inline]
    pub fn west(&self) -> f64 {
        self.lower_left.longitude
    }

    #[inline]
    pub fn east(&self) -> f64 {
        self.upper_right.longitude
    }

    /// Whether a point lies inside the play area (edges inclusive)
    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.south()..=self.north()).contains(&point.latitude)
            && (self.west()..=self.east()).contains(&point.longitude)
    }

    /// Sides of the play area that fall inside the viewport, i.e. where the
    /// viewport shows ground beyond the boundary.
    ///
    /// Raw degrees are compared directly; over a play area this small that
    /// orders the same way as metric distance.
    pub fn edges_out_of_view(&self, viewport: &ViewportBounds) -> EdgeFlags {
        EdgeFlags {
            south: viewport.south < self.south(),
            north: viewport.north > self.north(),
            west: viewport.west < self.west(),
            east: viewport.east > self.east(),
        }
    }

    /// Shading rectangles covering everything outside the boundary that the
    /// viewport shows, for a window of `window` pixels.
    ///
    /// Returns nothing for a degenerate viewport.
    pub fn overlay_rects(&self, viewport: &ViewportBounds, window: Vec2) -> Vec<OverlayRect> {
        let vp_min = geo::project(GeoPoint::new(viewport.south, viewport.west));
        let vp_max = geo::project(GeoPoint::new(viewport.north, viewport.east));
        let span = vp_max - vp_min;
        if span.x <= 0.0 || span.y <= 0.0 || window.x <= 0.0 || window.y <= 0.0 {
            return Vec::new();
        }

        let window_d = window.as_dvec2();
        let to_window = |p: GeoPoint| -> Vec2 {
            let t = (geo::project(p) - vp_min) / span;
            (t * window_d).clamp(DVec2::ZERO, window_d).as_vec2()
        };
        let sw = to_window(self.lower_left);
        let ne = to_window(self.upper_right);

        let flags = self.edges_out_of_view(viewport);
        let mut rects = Vec::with_capacity(4);
        if flags.south {
            rects.push(OverlayRect {
                pos: Vec2::new(sw.x, 0.0),
                size: Vec2::new(ne.x - sw.x, sw.y),
            });
        }
        if flags.north {
            rects.push(OverlayRect {
                pos: Vec2::new(sw.x, ne.y),
                size: Vec2::new(ne.x - sw.x, window.y - ne.y),
            });
        }
        if flags.west {
            rects.push(OverlayRect {
                pos: Vec2::ZERO,
                size: Vec2::new(sw.x, window.y),
            });
        }
        if flags.east {
            rects.push(OverlayRect {
                pos: Vec2::new(ne.x, 0.0),
                size: Vec2::new(window.x - ne.x, window.y),
            });
        }
        rects
    }
}
