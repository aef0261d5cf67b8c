//! The player token

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};
use crate::geo::{self, GeoPoint, MetricOffset};
use crate::snap::{SnapReply, SnapRequest, SnapTarget, Snappable};

/// Added to the direction length so a tap on the player itself stays finite
pub const DIRECTION_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerAgent {
    position: GeoPoint,
    step_size_m: f64,
    /// Number of completed walk steps; tags snap requests
    step: u64,
}

impl PlayerAgent {
    pub fn new(position: GeoPoint, step_size_m: f64) -> GameResult<Self> {
        if !(step_size_m.is_finite() && step_size_m > 0.0) {
            return Err(GameError::InvalidConfig(format!(
                "player step size must be positive, got {step_size_m} m"
            )));
        }
        Ok(Self {
            position,
            step_size_m,
            step: 0,
        })
    }

    pub fn position(&self) -> GeoPoint {
        self.position
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn step_size(&self) -> f64 {
        self.step_size_m
    }

    /// Metric step taken toward `screen_target` from the player's on-screen
    /// position `screen_origin` (screen space with y pointing north).
    pub fn step_toward(&self, screen_target: Vec2, screen_origin: Vec2) -> MetricOffset {
        let direction = (screen_target - screen_origin).as_dvec2();
        let unit = direction / (direction.length() + DIRECTION_EPSILON);
        (unit * self.step_size_m).into()
    }

    /// Take one step toward a tapped screen position.
    ///
    /// The new position is applied immediately; any road correction arrives
    /// later through [`Snappable::apply_correction`].
    pub fn walk(&mut self, screen_target: Vec2, screen_origin: Vec2) -> GeoPoint {
        let delta = self.step_toward(screen_target, screen_origin);
        self.position = geo::offset(self.position, delta, 1.0);
        self.step += 1;
        self.position
    }
}

impl Snappable for PlayerAgent {
    fn snap_request(&self, session: u64) -> SnapRequest {
        SnapRequest {
            session,
            target: SnapTarget::Player,
            step: self.step,
            point: self.position,
        }
    }

    /// Only a correction for the current step is applied; anything older
    /// would overwrite a position the player has since walked away from.
    fn apply_correction(&mut self, reply: &SnapReply) -> bool {
        if reply.request.target != SnapTarget::Player {
            return false;
        }
        if reply.request.step != self.step {
            log::debug!(
                "Discarding stale snap for step {} (player at step {})",
                reply.request.step,
                self.step
            );
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
