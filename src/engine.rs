//! Engine lifecycle and frame driver
//!
//! Owns the simulation state, drains fixed steps out of wall-clock frame
//! time, tracks the high score through the key-value store and reports
//! externally visible changes through an observer callback. All services
//! are passed in at construction; the engine holds no ambient state.

use serde::Serialize;

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::persistence::KeyValueStore;
use crate::settings::Settings;
use crate::sim::{GameState, TickInput, tick};
use crate::sim::rng::DEFAULT_SEED;

const HIGH_SCORE_KEY: &str = "pentipede_hi";

/// Engine lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Title,
    Playing,
    Paused,
    GameOver,
}

/// Externally visible state, handed to the observer on every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub score: u64,
    pub high_score: u64,
    pub level: u32,
    pub lives: u32,
}

type Observer = Box<dyn FnMut(&Snapshot)>;

/// The game engine.
pub struct Engine {
    settings: Settings,
    store: Box<dyn KeyValueStore>,
    state: Option<GameState>,
    phase: Phase,
    high_score: u64,
    input: TickInput,
    observer: Option<Observer>,
    last_snapshot: Option<Snapshot>,
    accumulator: f64,
    last_time: Option<f64>,
}

impl Engine {
    /// Build an engine. The high score is read once here; a missing or
    /// malformed value means zero.
    pub fn new(settings: Settings, store: Box<dyn KeyValueStore>) -> Self {
        let high_score = store
            .get(HIGH_SCORE_KEY)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        log::info!("engine created, high score {high_score}");
        Self {
            settings,
            store,
            state: None,
            phase: Phase::Title,
            high_score,
            input: TickInput::default(),
            observer: None,
            last_snapshot: None,
            accumulator: 0.0,
            last_time: None,
        }
    }

    pub fn set_observer(&mut self, observer: impl FnMut(&Snapshot) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Start a run with the default seed.
    pub fn start(&mut self) {
        self.start_new_game(DEFAULT_SEED);
    }

    /// Start a run with an explicit seed (replays, tests).
    pub fn start_new_game(&mut self, seed: u64) {
        log::info!("new game: seed {seed}, mode {:?}", self.settings.mode);
        self.state = Some(GameState::new(seed, self.settings.mode));
        self.phase = Phase::Playing;
        self.accumulator = 0.0;
        self.notify();
    }

    pub fn pause(&mut self) {
        if self.phase == Phase::Playing {
            self.phase = Phase::Paused;
            self.notify();
        }
    }

    pub fn resume(&mut self) {
        if self.phase == Phase::Paused {
            self.phase = Phase::Playing;
            self.notify();
        }
    }

    /// Tear down the run and return to the title phase.
    pub fn destroy(&mut self) {
        self.state = None;
        self.phase = Phase::Title;
        self.accumulator = 0.0;
        self.last_time = None;
        self.notify();
    }

    /// Install the input applied to every simulation step until replaced.
    pub fn set_input(&mut self, input: TickInput) {
        self.input = input;
    }

    /// Advance by wall-clock time, draining whole fixed steps. Paused and
    /// non-running phases accumulate nothing.
    pub fn frame(&mut self, now_secs: f64) {
        let dt = match self.last_time {
            Some(last) => (now_secs - last).max(0.0),
            None => 0.0,
        };
        self.last_time = Some(now_secs);

        if self.phase != Phase::Playing {
            return;
        }
        self.accumulator += dt;

        if let Some(state) = self.state.as_mut() {
            let mut substeps = 0;
            while self.accumulator >= SIM_DT as f64 && substeps < MAX_SUBSTEPS {
                tick(state, &self.input, SIM_DT);
                self.accumulator -= SIM_DT as f64;
                substeps += 1;
            }
            // Don't let a long frame snowball into a catch-up spiral.
            if substeps == MAX_SUBSTEPS {
                self.accumulator = 0.0;
            }
            // Dash is a one-shot intent.
            self.input.dash = false;

            if state.board.score > self.high_score {
                self.high_score = state.board.score;
                self.store.set(HIGH_SCORE_KEY, &self.high_score.to_string());
            }
            if state.game_over {
                self.phase = Phase::GameOver;
            }
        }

        self.notify();
    }

    pub fn snapshot(&self) -> Snapshot {
        let (score, level, lives) = self
            .state
            .as_ref()
            .map(|s| (s.board.score, s.board.level, s.board.lives))
            .unwrap_or((0, 1, 0));
        Snapshot {
            phase: self.phase,
            score,
            high_score: self.high_score,
            level,
            lives,
        }
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    /// Invoke the observer when the visible snapshot changed.
    fn notify(&mut self) {
        let snapshot = self.snapshot();
        if self.last_snapshot == Some(snapshot) {
            return;
        }
        self.last_snapshot = Some(snapshot);
        if let Some(observer) = self.observer.as_mut() {
            observer(&snapshot);
        }
    }
}
