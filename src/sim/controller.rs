//! Level state machine
//!
//! ```text
//! Menu --start--> Playing --treasure--> LevelUp --continue--> Playing
//!                    |
//!                    +--light exhausted--> GameOver --restart--> Menu
//! ```
//!
//! Every input event and every snap reply is processed on the caller's
//! thread. Within one step the order is fixed: decay, then movement, then
//! feature evaluation.

use std::sync::mpsc::{self, Receiver, Sender};

use glam::Vec2;

use super::boundary::{EdgeFlags, ViewportBounds};
use super::feature::{Evaluation, Feature};
use super::state::{GameEvent, GamePhase, LevelState, RunSummary, Session};
use crate::config::GameConfig;
use crate::error::{GameError, GameResult};
use crate::geo::GeoPoint;
use crate::snap::{RoadSnapService, SnapReply, SnapTarget, Snappable};

/// Result of a single walk input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// Not playing; the input was dropped
    Ignored,
    /// The player moved; `evaluation` says what was collected
    Walked {
        position: GeoPoint,
        evaluation: Evaluation,
    },
    /// The step burned the last of the light; the run is over
    Exhausted,
}

pub struct LevelController {
    config: GameConfig,
    phase: GamePhase,
    session: Option<Session>,
    /// Summary of the run that just ended, kept for the game-over screen
    summary: Option<RunSummary>,
    snap: Box<dyn RoadSnapService>,
    reply_tx: Sender<SnapReply>,
    reply_rx: Receiver<SnapReply>,
    next_session_id: u64,
    events: Vec<GameEvent>,
}

impl LevelController {
    pub fn new(config: GameConfig, snap: Box<dyn RoadSnapService>) -> GameResult<Self> {
        config.validate()?;
        let (reply_tx, reply_rx) = mpsc::channel();
        Ok(Self {
            config,
            phase: GamePhase::Menu,
            session: None,
            summary: None,
            snap,
            reply_tx,
            reply_rx,
            next_session_id: 0,
            events: Vec::new(),
        })
    }

    fn require(&self, phase: GamePhase, event: &'static str) -> GameResult<()> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(GameError::InvalidTransition {
                from: self.phase,
                event,
            })
        }
    }

    /// Menu -> Playing: fresh level-1 session
    pub fn start(&mut self) -> GameResult<()> {
        self.require(GamePhase::Menu, "start")?;

        let seed = self.config.seed.unwrap_or_else(rand::random);
        self.next_session_id += 1;
        let session = Session::new(self.next_session_id, &self.config, seed)?;
        log::info!(
            "Session {} started (seed {}) with {} features",
            session.id,
            seed,
            session.level.feature_count
        );

        self.events.push(GameEvent::Started {
            level: session.level.level_number,
            feature_count: session.level.feature_count,
        });
        self.session = Some(session);
        self.summary = None;
        self.phase = GamePhase::Playing;
        self.request_feature_snaps();
        Ok(())
    }

    /// LevelUp -> Playing: next level, more features, radii carried over
    pub fn continue_level(&mut self) -> GameResult<()> {
        // LevelUp is only ever entered with a live session
        let phase = self.phase;
        let Some(session) = self
            .session
            .as_mut()
            .filter(|_| phase == GamePhase::LevelUp)
        else {
            return Err(GameError::InvalidTransition {
                from: phase,
                event: "continue",
            });
        };

        session.level.advance(self.config.feature_count_increment);
        session.respawn(&self.config);
        log::info!(
            "Level {} started with {} features",
            session.level.level_number,
            session.level.feature_count
        );

        self.events.push(GameEvent::LevelStarted {
            level: session.level.level_number,
            feature_count: session.level.feature_count,
        });
        self.phase = GamePhase::Playing;
        self.request_feature_snaps();
        Ok(())
    }

    /// GameOver -> Menu: forget the finished run
    pub fn restart(&mut self) -> GameResult<()> {
        self.require(GamePhase::GameOver, "restart")?;
        self.summary = None;
        self.phase = GamePhase::Menu;
        self.events.push(GameEvent::ReturnedToMenu);
        log::info!("Returned to menu");
        Ok(())
    }

    /// Take one step toward a tapped screen position.
    ///
    /// `screen_origin` is where the player is currently drawn. Inputs outside
    /// `Playing` are ignored.
    pub fn walk(&mut self, screen_target: Vec2, screen_origin: Vec2) -> StepOutcome {
        if self.phase != GamePhase::Playing {
            log::debug!("Ignoring walk in {:?}", self.phase);
            return StepOutcome::Ignored;
        }
        // Land any corrections that arrived since the last step first
        self.apply_snap_replies();

        let Some(session) = self.session.as_mut() else {
            return StepOutcome::Ignored;
        };

        if session.field.decay(self.config.decay_per_step_m) {
            self.end_run();
            return StepOutcome::Exhausted;
        }

        let position = session.player.walk(screen_target, screen_origin);
        self.snap
            .request_snap(session.player.snap_request(session.id), self.reply_tx.clone());

        let evaluation = session.features.evaluate(&mut session.field, position);
        session.lights_collected += evaluation.lights_collected;
        log::debug!(
            "Step {}: visibility {:.1} m, {} features left",
            session.player.step(),
            session.field.visibility_radius(),
            session.features.features().len()
        );

        if evaluation.treasure_collected {
            let level = session.level.level_number;
            log::info!("Level {} cleared", level);
            self.events.push(GameEvent::LevelCleared { level });
            self.phase = GamePhase::LevelUp;
        }

        StepOutcome::Walked {
            position,
            evaluation,
        }
    }

    /// Playing -> GameOver
    fn end_run(&mut self) {
        if let Some(session) = self.session.take() {
            let summary = session.summary();
            log::info!(
                "Light exhausted on level {} after {} steps",
                summary.level_reached,
                summary.steps
            );
            self.events.push(GameEvent::GameOver(summary));
            self.summary = Some(summary);
        }
        self.phase = GamePhase::GameOver;
    }

    fn request_feature_snaps(&mut self) {
        if !self.config.snap_features {
            return;
        }
        if let Some(session) = &self.session {
            for request in session.features.snap_requests(session.id) {
                self.snap.request_snap(request, self.reply_tx.clone());
            }
        }
    }

    /// Apply every snap reply received so far.
    ///
    /// Replies that no longer match the live session, the player's current
    /// step or an active feature are dropped. Returns how many corrections
    /// were applied.
    pub fn apply_snap_replies(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(reply) = self.reply_rx.try_recv() {
            let Some(session) = self.session.as_mut() else {
                continue;
            };
            if reply.request.session != session.id {
                log::debug!("Dropping snap reply from session {}", reply.request.session);
                continue;
            }

            let changed = match reply.request.target {
                SnapTarget::Player => session.player.apply_correction(&reply),
                SnapTarget::Feature(id) => session
                    .features
                    .feature_mut(id)
                    .is_some_and(|feature| feature.apply_correction(&reply)),
            };
            if changed {
                applied += 1;
            }
        }

        if applied > 0 {
            if let Some(session) = self.session.as_mut() {
                session
                    .features
                    .refresh_visibility(&session.field, session.player.position());
            }
        }
        applied
    }

    /// Pending transition notifications, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Scripted setups and tests reach into the live session through this
    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    pub fn level(&self) -> Option<LevelState> {
        self.session.as_ref().map(|s| s.level)
    }

    pub fn summary(&self) -> Option<RunSummary> {
        self.summary
    }

    pub fn player_position(&self) -> Option<GeoPoint> {
        self.session.as_ref().map(|s| s.player.position())
    }

    pub fn features(&self) -> &[Feature] {
        self.session
            .as_ref()
            .map(|s| s.features.features())
            .unwrap_or(&[])
    }

    /// Boundary sides to shade for the given viewport
    pub fn edges_out_of_view(&self, viewport: &ViewportBounds) -> Option<EdgeFlags> {
        self.session
            .as_ref()
            .map(|s| s.boundary.edges_out_of_view(viewport))
    }
}
