//! Game state and transient-actor arenas
//!
//! Everything the tick mutates lives here. Transient actors (falling
//! obstacles, reflected shots, coins, pickups) sit in fixed-capacity slot
//! arenas with per-slot active flags; exhausted spawn requests are
//! silently dropped.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::creature::Chain;
use super::enemies::{Crosser, Dropper, Flyer, Saucer};
use super::field::Field;
use super::player::{Player, PowerUp};
use super::rng::GameRng;
use super::score::Scoreboard;
use crate::consts::*;
use crate::tuning::{self, DifficultyMode};

/// A destroyed obstacle tumbling down the field. Can be juggled with
/// bullets for escalating bonuses; replants where it lands.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FallingObstacle {
    pub pos: Vec2,
    pub vel_y: f32,
    pub poisoned: bool,
    pub juggles: u32,
    pub active: bool,
}

/// Hostile shot spawned when a bullet strikes a reflective obstacle.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ReflectedShot {
    pub pos: Vec2,
    pub active: bool,
}

/// Collectible coin.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Coin {
    pub pos: Vec2,
    pub active: bool,
}

/// Power-up pickup drifting down the field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pickup {
    pub pos: Vec2,
    pub kind: PowerUp,
    pub active: bool,
}

impl Default for Pickup {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            kind: PowerUp::RapidFire,
            active: false,
        }
    }
}

fn serialize_slots<S, T>(pool: &[T], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
    T: Serialize,
{
    serializer.collect_seq(pool)
}

/// Complete simulation state. Serialized for state dumps and determinism
/// checks; runs are reconstructed from the seed, never deserialized.
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    pub seed: u64,
    pub rng: GameRng,
    pub mode: DifficultyMode,
    pub field: Field,
    pub chains: Vec<Chain>,
    pub flyers: Vec<Flyer>,
    pub droppers: Vec<Dropper>,
    pub crossers: Vec<Crosser>,
    pub saucers: Vec<Saucer>,
    pub player: Player,
    pub board: Scoreboard,

    pub falling: [FallingObstacle; FALLING_POOL],
    pub reflected: [ReflectedShot; REFLECTED_POOL],
    // Serde has no array impls past 32 slots, so this pool goes out as a
    // sequence.
    #[serde(serialize_with = "serialize_slots")]
    pub coins: [Coin; COIN_POOL],
    pub pickups: [Pickup; PICKUP_POOL],

    // Spawn timers (seconds until next spawn/check).
    pub flyer_timer: f32,
    pub dropper_timer: f32,
    pub crosser_timer: f32,
    pub saucer_timer: f32,
    pub coin_timer: f32,
    /// Cooldown before a touchdown may spawn a bonus flyer.
    pub touchdown_bonus_timer: f32,

    /// Freeze window between clearing the last segment and the next level.
    pub clear_timer: f32,
    pub game_over: bool,
    pub time_ticks: u64,
}

impl GameState {
    pub fn new(seed: u64, mode: DifficultyMode) -> Self {
        let mut state = Self {
            seed,
            rng: GameRng::new(seed),
            mode,
            field: Field::new(),
            chains: Vec::new(),
            flyers: Vec::new(),
            droppers: Vec::new(),
            crossers: Vec::new(),
            saucers: Vec::new(),
            player: Player::new(),
            board: Scoreboard::new(tuning::uses_advanced_scoring(mode)),
            falling: [FallingObstacle::default(); FALLING_POOL],
            reflected: [ReflectedShot::default(); REFLECTED_POOL],
            coins: [Coin::default(); COIN_POOL],
            pickups: [Pickup::default(); PICKUP_POOL],
            flyer_timer: 0.0,
            dropper_timer: DROPPER_SPAWN_COOLDOWN,
            crosser_timer: 0.0,
            saucer_timer: 0.0,
            coin_timer: 0.0,
            touchdown_bonus_timer: 0.0,
            clear_timer: 0.0,
            game_over: false,
            time_ticks: 0,
        };
        state.start_level();
        state
    }

    /// Seed the field and spawn the level's creature chain. Called at game
    /// start and after every level clear.
    pub fn start_level(&mut self) {
        let level = self.board.level;
        let tuning = tuning::level_tuning(level, self.mode);

        self.field.seed(tuning.density, level, self.mode, &mut self.rng);

        self.chains.clear();
        let start_col = self.rng.range_i32(COLS / 4, 3 * COLS / 4);
        let dir = if self.rng.chance(0.5) { 1 } else { -1 };
        self.chains
            .push(Chain::new(tuning.chain_length, start_col, dir, level));

        self.flyers.clear();
        self.droppers.clear();
        self.crossers.clear();
        self.saucers.clear();
        self.falling = [FallingObstacle::default(); FALLING_POOL];
        self.reflected = [ReflectedShot::default(); REFLECTED_POOL];
        self.coins = [Coin::default(); COIN_POOL];
        self.pickups = [Pickup::default(); PICKUP_POOL];

        self.flyer_timer = self.rng.range_f32(tuning.flyer_window.0, tuning.flyer_window.1);
        self.crosser_timer = self
            .rng
            .range_f32(tuning.crosser_window.0, tuning.crosser_window.1);
        self.saucer_timer = self.rng.range_f32(SAUCER_SPAWN_MIN, SAUCER_SPAWN_MAX);
        self.coin_timer = self.rng.range_f32(COIN_SPAWN_MIN, COIN_SPAWN_MAX);
        self.dropper_timer = DROPPER_SPAWN_COOLDOWN;
        self.touchdown_bonus_timer = 0.0;
        self.clear_timer = 0.0;

        self.board.begin_level();

        log::debug!(
            "level {level} started: density {:.3}, chain length {}",
            tuning.density,
            tuning.chain_length
        );
    }

    /// Live creature segments across all chains.
    pub fn total_segments(&self) -> usize {
        self.chains.iter().map(Chain::len).sum()
    }

    pub fn spawn_falling(&mut self, pos: Vec2, poisoned: bool) {
        if let Some(slot) = self.falling.iter_mut().find(|f| !f.active) {
            *slot = FallingObstacle {
                pos,
                vel_y: FALLING_OBSTACLE_SPEED,
                poisoned,
                juggles: 0,
                active: true,
            };
        }
    }

    pub fn spawn_reflected(&mut self, pos: Vec2) {
        if let Some(slot) = self.reflected.iter_mut().find(|s| !s.active) {
            *slot = ReflectedShot { pos, active: true };
        }
    }

    pub fn spawn_coin(&mut self, pos: Vec2) {
        if let Some(slot) = self.coins.iter_mut().find(|c| !c.active) {
            *slot = Coin { pos, active: true };
        }
    }

    pub fn spawn_pickup(&mut self, pos: Vec2, kind: PowerUp) {
        if let Some(slot) = self.pickups.iter_mut().find(|p| !p.active) {
            *slot = Pickup {
                pos,
                kind,
                active: true,
            };
        }
    }
}
