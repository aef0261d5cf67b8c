//! Simulation module
//!
//! All gameplay logic lives here. It must stay free of rendering and
//! platform code:
//! - Positions are geographic, distances go through `geo`
//! - Seeded RNG only
//! - Stable iteration order (by feature ID)
//! - Network work happens elsewhere; only its replies come in

pub mod autopilot;
pub mod boundary;
pub mod controller;
pub mod feature;
pub mod player;
pub mod state;
pub mod visibility;

pub use autopilot::Autopilot;
pub use boundary::{EdgeFlags, GameBoundary, OverlayRect, ViewportBounds};
pub use controller::{LevelController, StepOutcome};
pub use feature::{Evaluation, Feature, FeatureKind, FeatureManager};
pub use player::PlayerAgent;
pub use state::{GameEvent, GamePhase, LevelState, RunSummary, Session};
pub use visibility::VisibilityField;
