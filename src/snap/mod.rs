//! Road snapping
//!
//! Positions computed by walking are refined by an external "nearest point on
//! a path" service. Requests never block the game: a service takes the
//! request plus a one-shot reply sender and returns immediately. Replies are
//! drained on the event loop and applied only while still current, so a slow
//! response can never drag the player back to where they used to be.

pub mod osrm;

use std::sync::mpsc::Sender;

use serde::Deserialize;

use crate::config::GameConfig;
use crate::error::SnapError;
use crate::geo::GeoPoint;

pub use osrm::OsrmSnapService;

/// Which entity a correction is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapTarget {
    Player,
    Feature(u32),
}

/// A single correction request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapRequest {
    /// Session that issued the request
    pub session: u64,
    pub target: SnapTarget,
    /// Movement step index at request time (always 0 for features)
    pub step: u64,
    /// Uncorrected position
    pub point: GeoPoint,
}

/// Outcome of a request; `corrected` is `None` on any failure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapReply {
    pub request: SnapRequest,
    pub corrected: Option<GeoPoint>,
}

impl SnapReply {
    pub fn failed(request: SnapRequest) -> Self {
        Self {
            request,
            corrected: None,
        }
    }
}

/// An asynchronous source of road corrections.
///
/// `request_snap` must return without waiting on the network. The reply, if
/// any, is delivered through `reply`, which is consumed by the send and so
/// fires at most once.
pub trait RoadSnapService {
    fn request_snap(&mut self, request: SnapRequest, reply: Sender<SnapReply>);
}

/// Entities whose position can be refined by the snap service
pub trait Snappable {
    /// Build a request for the entity's current position
    fn snap_request(&self, session: u64) -> SnapRequest;

    /// Apply a reply if it is still current for this entity.
    ///
    /// Returns whether the position changed.
    fn apply_correction(&mut self, reply: &SnapReply) -> bool;
}

/// Snapping turned off: requests are dropped and positions always stand.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSnap;

impl RoadSnapService for DisabledSnap {
    fn request_snap(&mut self, request: SnapRequest, _reply: Sender<SnapReply>) {
        log::trace!("Snapping disabled, dropping request for {:?}", request.target);
    }
}

/// Build the snap service a config asks for.
///
/// A client that cannot be built is logged and replaced by [`DisabledSnap`].
pub fn service_for(config: &GameConfig) -> Box<dyn RoadSnapService> {
    let Some(base_url) = &config.snap_base_url else {
        log::info!("Road snapping disabled");
        return Box::new(DisabledSnap);
    };
    match OsrmSnapService::new(base_url.clone(), config.snap_timeout()) {
        Ok(service) => {
            log::info!("Road snapping via {}", base_url);
            Box::new(service)
        }
        Err(e) => {
            log::warn!("Could not set up road snapping ({}), continuing without", e);
            Box::new(DisabledSnap)
        }
    }
}

#[derive(Debug, Deserialize)]
struct NearestResponse {
    code: String,
    #[serde(default)]
    waypoints: Vec<Waypoint>,
}

#[derive(Debug, Deserialize)]
struct Waypoint {
    /// `[longitude, latitude]`
    location: [f64; 2],
}

/// Parse a nearest-point response body.
///
/// Only `code == "Ok"` with at least one waypoint yields a point.
pub fn parse_nearest(body: &str) -> Result<GeoPoint, SnapError> {
    let response: NearestResponse = serde_json::from_str(body)?;
    if response.code != "Ok" {
        return Err(SnapError::Rejected(response.code));
    }
    let [longitude, latitude] = response
        .waypoints
        .first()
        .ok_or(SnapError::NoWaypoints)?
        .location;

    let point = GeoPoint::new(latitude, longitude);
    if point.is_projectable() {
        Ok(point)
    } else {
        Err(SnapError::OutOfRange {
            latitude,
            longitude,
        })
    }
}
