//! Headless demo runner
//!
//! Drives the engine with a scripted autopilot for a fixed stretch of
//! simulated time and logs the outcome. Useful for smoke-testing balance
//! changes without a front end.

use glam::Vec2;

use pentipede::consts::SIM_DT;
use pentipede::persistence::JsonFileStore;
use pentipede::sim::TickInput;
use pentipede::{Engine, Phase, Settings};

/// Simulated seconds the demo runs for.
const DEMO_SECONDS: f64 = 120.0;

fn main() {
    env_logger::init();

    let store = JsonFileStore::new("pentipede_state.json");
    let settings = Settings::default();
    let mut engine = Engine::new(settings, Box::new(store));

    engine.set_observer(|snapshot| {
        log::info!(
            "phase {:?}: score {} (best {}), level {}, lives {}",
            snapshot.phase,
            snapshot.score,
            snapshot.high_score,
            snapshot.level,
            snapshot.lives
        );
    });

    engine.start();

    // Scripted autopilot: sweep side to side along the bottom, firing
    // continuously, with a dash thrown in every few seconds.
    let mut now = 0.0_f64;
    let mut frame = 0u64;
    while now < DEMO_SECONDS {
        let sweep = if (now as u64 / 3) % 2 == 0 { 1.0 } else { -1.0 };
        engine.set_input(TickInput {
            move_dir: Vec2::new(sweep, 0.0),
            fire: true,
            special: false,
            dash: frame % 240 == 0,
        });
        engine.frame(now);
        if engine.snapshot().phase == Phase::GameOver {
            break;
        }
        now += SIM_DT as f64;
        frame += 1;
    }

    let end = engine.snapshot();
    log::info!(
        "demo finished after {now:.1}s: score {}, level {}, phase {:?}",
        end.score,
        end.level,
        end.phase
    );
}
