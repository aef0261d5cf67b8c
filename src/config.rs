//! Game configuration
//!
//! Every tunable of a run lives here and is handed to the controller at
//! construction; nothing is read from globals. Stored as JSON.

use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{GameError, GameResult};
use crate::geo::{GeoPoint, MetricOffset};

/// Whether spawn batches carry a treasure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TreasurePolicy {
    /// One treasure per level; collecting it advances the level
    #[default]
    EveryLevel,
    /// Lights only; the run ends when the light runs out
    Never,
}

impl TreasurePolicy {
    pub fn includes_treasure(&self) -> bool {
        matches!(self, TreasurePolicy::EveryLevel)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Play area ===
    /// Center of the play area
    pub center: GeoPoint,
    /// Full width/height of the play area (meters)
    pub size_m: MetricOffset,

    // === Light budget ===
    /// Radius within which features are collected
    pub collect_radius_m: f64,
    /// Starting visibility radius
    pub visibility_radius_m: f64,
    /// Visibility gained per collected light
    pub light_boost_m: f64,
    /// Visibility lost per step
    pub decay_per_step_m: f64,

    // === Movement ===
    pub step_size_m: f64,

    // === Spawning ===
    pub initial_feature_count: u32,
    /// Added to the feature count on every level up
    pub feature_count_increment: u32,
    pub treasure_policy: TreasurePolicy,

    // === Road snapping ===
    /// Base URL of the nearest-point service; `None` disables snapping
    pub snap_base_url: Option<String>,
    pub snap_timeout_ms: u64,
    /// Also snap freshly spawned features onto the path network
    pub snap_features: bool,

    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            size_m: MetricOffset::new(DEFAULT_AREA_SIZE_M, DEFAULT_AREA_SIZE_M),

            collect_radius_m: COLLECT_RADIUS_M,
            visibility_radius_m: VISIBILITY_RADIUS_M,
            light_boost_m: LIGHT_BOOST_M,
            decay_per_step_m: DECAY_PER_STEP_M,

            step_size_m: STEP_SIZE_M,

            initial_feature_count: INITIAL_FEATURE_COUNT,
            feature_count_increment: FEATURE_COUNT_INCREMENT,
            treasure_policy: TreasurePolicy::EveryLevel,

            snap_base_url: None,
            snap_timeout_ms: SNAP_TIMEOUT_MS,
            snap_features: false,

            seed: None,
        }
    }
}

fn non_negative(name: &str, value: f64) -> GameResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(GameError::InvalidConfig(format!(
            "{name} must be a finite, non-negative number of meters, got {value}"
        )))
    }
}

impl GameConfig {
    /// Parse a JSON config; missing fields take their defaults
    pub fn from_json(json: &str) -> GameResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| GameError::InvalidConfig(format!("unreadable config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a JSON file.
    ///
    /// A missing, unreadable or unparsable file falls back to the defaults
    /// (only a missing one is silent); a file that
    /// parses but describes a degenerate game is an error.
    pub fn load(path: &Path) -> GameResult<Self> {
        let config = match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<Self>(&json) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Invalid config at {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("Could not read config at {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would produce degenerate geometry
    pub fn validate(&self) -> GameResult<()> {
        if !self.center.is_projectable() {
            return Err(GameError::InvalidConfig(format!(
                "center {:?} is outside the projectable range",
                self.center
            )));
        }
        if !(self.size_m.dx > 0.0 && self.size_m.dy > 0.0)
            || !self.size_m.dx.is_finite()
            || !self.size_m.dy.is_finite()
        {
            return Err(GameError::InvalidConfig(format!(
                "play-area size must be positive, got {} x {} m",
                self.size_m.dx, self.size_m.dy
            )));
        }
        if !(self.step_size_m.is_finite() && self.step_size_m > 0.0) {
            return Err(GameError::InvalidConfig(format!(
                "step size must be positive, got {} m",
                self.step_size_m
            )));
        }
        non_negative("collect radius", self.collect_radius_m)?;
        non_negative("visibility radius", self.visibility_radius_m)?;
        non_negative("light boost", self.light_boost_m)?;
        non_negative("decay per step", self.decay_per_step_m)?;

        if self.collect_radius_m > self.visibility_radius_m {
            log::warn!(
                "Collect radius {} m exceeds visibility radius {} m; features may be collected unseen",
                self.collect_radius_m,
                self.visibility_radius_m
            );
        }
        Ok(())
    }

    pub fn snap_timeout(&self) -> Duration {
        Duration::from_millis(self.snap_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.center, GeoPoint::new(48.40, 9.03));
        assert_eq!(config.size_m, MetricOffset::new(500.0, 500.0));
        assert!(config.snap_base_url.is_none());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = GameConfig::from_json(
            r#"{ "step_size_m": 5.0, "treasure_policy": "never", "seed": 12 }"#,
        )
        .unwrap();
        assert_eq!(config.step_size_m, 5.0);
        assert_eq!(config.treasure_policy, TreasurePolicy::Never);
        assert_eq!(config.seed, Some(12));
        assert_eq!(config.initial_feature_count, INITIAL_FEATURE_COUNT);
    }

    #[test]
    fn test_degenerate_values_rejected() {
        let zero_area = GameConfig {
            size_m: MetricOffset::new(0.0, 500.0),
            ..Default::default()
        };
        assert!(matches!(zero_area.validate(), Err(GameError::InvalidConfig(_))));

        let zero_step = GameConfig {
            step_size_m: 0.0,
            ..Default::default()
        };
        assert!(zero_step.validate().is_err());

        let negative_radius = GameConfig {
            visibility_radius_m: -1.0,
            ..Default::default()
        };
        assert!(negative_radius.validate().is_err());

        assert!(GameConfig::from_json(r#"{ "size_m": { "dx": 100.0, "dy": 0.0 } }"#).is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = GameConfig::load(Path::new("/nonexistent/geoglow.json")).unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_unreadable_path_falls_back_to_defaults() {
        // A directory exists but cannot be read as a file
        let dir = std::env::temp_dir();
        let config = GameConfig::load(&dir).unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_unparsable_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!("geoglow-bad-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let config = GameConfig::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.unwrap(), GameConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let config = GameConfig {
            snap_base_url: Some("http://localhost:5000/nearest/v1/foot".into()),
            seed: Some(5),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(GameConfig::from_json(&json).unwrap(), config);
    }
}
