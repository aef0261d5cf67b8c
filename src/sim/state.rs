//! Game state and core simulation types
//!
//! A `Session` is everything that lives for exactly one run: created when
//! play starts, dropped when the light runs out.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boundary::GameBoundary;
use super::feature::FeatureManager;
use super::player::PlayerAgent;
use super::visibility::VisibilityField;
use crate::config::GameConfig;
use crate::error::GameResult;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, no session
    Menu,
    /// Active gameplay
    Playing,
    /// Treasure found, waiting to continue to the next level
    LevelUp,
    /// Light ran out; the run summary is shown until restart
    GameOver,
}

/// Transition notifications for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Started { level: u32, feature_count: u32 },
    LevelCleared { level: u32 },
    LevelStarted { level: u32, feature_count: u32 },
    GameOver(RunSummary),
    ReturnedToMenu,
}

/// Level progression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelState {
    pub level_number: u32,
    pub feature_count: u32,
}

impl LevelState {
    pub fn first(config: &GameConfig) -> Self {
        Self {
            level_number: 1,
            feature_count: config.initial_feature_count,
        }
    }

    /// Move to the next level; the feature count never shrinks
    pub fn advance(&mut self, increment: u32) {
        self.level_number += 1;
        self.feature_count = self.feature_count.saturating_add(increment);
    }
}

/// What is left of a run after it ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub level_reached: u32,
    pub steps: u64,
    pub lights_collected: u32,
    pub seed: u64,
}

/// All state owned by one run
#[derive(Debug, Clone)]
pub struct Session {
    /// Distinguishes snap replies of this run from earlier ones
    pub id: u64,
    pub seed: u64,
    pub level: LevelState,
    pub boundary: GameBoundary,
    pub field: VisibilityField,
    pub player: PlayerAgent,
    pub features: FeatureManager,
    pub lights_collected: u32,
    rng: Pcg32,
}

impl Session {
    /// Fresh level-1 session with the player at the play-area center
    pub fn new(id: u64, config: &GameConfig, seed: u64) -> GameResult<Self> {
        let boundary = GameBoundary::new(config.center, config.size_m)?;
        let player = PlayerAgent::new(boundary.center(), config.step_size_m)?;

        let mut session = Self {
            id,
            seed,
            level: LevelState::first(config),
            boundary,
            field: VisibilityField::new(config.collect_radius_m, config.visibility_radius_m),
            player,
            features: FeatureManager::new(config.light_boost_m),
            lights_collected: 0,
            rng: Pcg32::seed_from_u64(seed),
        };
        session.respawn(config);

        Ok(session)
    }

    /// Scatter this level's features over the play area
    pub fn respawn(&mut self, config: &GameConfig) {
        self.features.spawn(
            &mut self.rng,
            self.boundary.center(),
            self.boundary.size(),
            self.level.feature_count,
            config.treasure_policy.includes_treasure(),
        );
        // Reveal whatever starts inside the light without collecting it
        self.features
            .refresh_visibility(&self.field, self.player.position());
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            level_reached: self.level.level_number,
            steps: self.player.step(),
            lights_collected: self.lights_collected,
            seed: self.seed,
        }
    }
}
