//! Geoglow - a geolocated light-gathering exploration game
//!
//! Core modules:
//! - `geo`: Geographic <-> metric plane projection
//! - `sim`: Simulation (boundary, visibility, features, player, level state machine)
//! - `snap`: Asynchronous road-snap corrections
//! - `config`: Data-driven game tuning

pub mod config;
pub mod error;
pub mod geo;
pub mod sim;
pub mod snap;

pub use config::{GameConfig, TreasurePolicy};
pub use error::{GameError, GameResult, SnapError};
pub use geo::{GeoPoint, MetricOffset};

/// Game configuration defaults
pub mod consts {
    use crate::geo::GeoPoint;

    /// Default play-area center (Tübingen old town)
    pub const DEFAULT_CENTER: GeoPoint = GeoPoint::new(48.40, 9.03);
    /// Default play-area edge length (meters)
    pub const DEFAULT_AREA_SIZE_M: f64 = 500.0;

    /// Collect radius (meters)
    pub const COLLECT_RADIUS_M: f64 = 10.0;
    /// Starting visibility radius (meters)
    pub const VISIBILITY_RADIUS_M: f64 = 60.0;
    /// Visibility gained per collected light (meters)
    pub const LIGHT_BOOST_M: f64 = 15.0;
    /// Visibility lost per step (meters)
    pub const DECAY_PER_STEP_M: f64 = 2.0;

    /// Player step length (meters)
    pub const STEP_SIZE_M: f64 = 10.0;

    /// Features in the first level
    pub const INITIAL_FEATURE_COUNT: u32 = 10;
    /// Extra features per level
    pub const FEATURE_COUNT_INCREMENT: u32 = 5;

    /// Road-snap request timeout
    pub const SNAP_TIMEOUT_MS: u64 = 3000;
}
