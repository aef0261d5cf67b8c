//! Geoglow entry point
//!
//! Headless demo: loads a config, lets the autopilot play until the light
//! runs out (or the step limit is hit) and prints the run summary.
//!
//! Usage: `geoglow [config.json]`

use std::path::PathBuf;
use std::time::Duration;

use glam::Vec2;

use geoglow::GameConfig;
use geoglow::sim::{Autopilot, GameEvent, GamePhase, LevelController, StepOutcome};
use geoglow::snap;

/// Stop the demo after this many steps even if the player survives
const MAX_STEPS: u32 = 2000;
/// Where the player sits on the imaginary screen
const SCREEN_CENTER: Vec2 = Vec2::new(400.0, 300.0);
/// Pause between steps when snapping, so replies have a chance to land
const SNAP_STEP_DELAY: Duration = Duration::from_millis(200);

fn main() {
    env_logger::init();
    log::info!("Geoglow (headless) starting...");

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("geoglow.json"));

    let config = match GameConfig::load(&path) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };
    let snapping = config.snap_base_url.is_some();
    let pilot_seed = config.seed.unwrap_or_else(rand::random);

    let mut controller = match LevelController::new(config.clone(), snap::service_for(&config)) {
        Ok(controller) => controller,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = controller.start() {
        log::error!("{}", e);
        std::process::exit(1);
    }

    let mut pilot = Autopilot::new(pilot_seed);
    for _ in 0..MAX_STEPS {
        match controller.phase() {
            GamePhase::LevelUp => {
                if let Err(e) = controller.continue_level() {
                    log::error!("{}", e);
                    break;
                }
            }
            GamePhase::Playing => {}
            _ => break,
        }

        let Some(session) = controller.session() else {
            break;
        };
        let target = pilot.next_target(session, SCREEN_CENTER);
        if let StepOutcome::Walked { position, evaluation } = controller.walk(target, SCREEN_CENTER) {
            log::debug!(
                "At {:.6}, {:.6} ({} lights)",
                position.latitude,
                position.longitude,
                evaluation.lights_collected
            );
        }

        for event in controller.drain_events() {
            match event {
                GameEvent::LevelCleared { level } => println!("Level {level} cleared!"),
                GameEvent::GameOver(summary) => println!(
                    "Game Over! Reached level {} in {} steps, {} lights collected (seed {})",
                    summary.level_reached, summary.steps, summary.lights_collected, summary.seed
                ),
                other => log::info!("{:?}", other),
            }
        }

        if snapping {
            std::thread::sleep(SNAP_STEP_DELAY);
            controller.apply_snap_replies();
        }
    }

    if let Some(level) = controller.level() {
        println!(
            "Still going after {} steps on level {}",
            MAX_STEPS, level.level_number
        );
    }
}
