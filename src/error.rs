//! Error types
//!
//! Configuration problems and invalid state transitions are caller bugs and
//! surface as `GameError`. Road-snap failures are transient and never leave
//! the `snap` module as anything but a missing correction.

use crate::sim::GamePhase;

/// Errors raised by the simulation core.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GameError {
    /// Degenerate geometry or out-of-range configuration values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A transition that is not valid from the current phase.
    #[error("invalid transition '{event}' from {from:?}")]
    InvalidTransition { from: GamePhase, event: &'static str },
}

pub type GameResult<T> = Result<T, GameError>;

/// Failures of a single road-snap lookup.
#[derive(thiserror::Error, Debug)]
pub enum SnapError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("service rejected request with code '{0}'")]
    Rejected(String),

    #[error("response carried no waypoints")]
    NoWaypoints,

    #[error("waypoint at lat {latitude}, lon {longitude} is outside the projectable range")]
    OutOfRange { latitude: f64, longitude: f64 },
}
