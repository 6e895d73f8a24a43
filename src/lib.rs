//! Pentipede - deterministic core for a segmented-creature arcade shooter
//!
//! Core modules:
//! - `sim`: deterministic simulation (field, creature, enemies, scoring)
//! - `engine`: lifecycle state machine and fixed-timestep frame driver
//! - `tuning`: data-driven per-level difficulty curves
//! - `persistence`: high-score key-value storage
//! - `settings`: player preferences (only the difficulty mode is read here)

pub mod engine;
pub mod persistence;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use engine::{Engine, Phase, Snapshot};
pub use settings::{DensityTier, Settings};
pub use tuning::DifficultyMode;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Field dimensions (cells)
    pub const CELL: f32 = 16.0;
    pub const COLS: i32 = 40;
    pub const ROWS: i32 = 50;
    /// Rows at the bottom reserved for the player; never seeded with obstacles
    pub const PLAYER_ROWS: i32 = 4;
    /// Lowest row a creature head may occupy before touchdown
    pub const MAX_ENEMY_ROW: i32 = ROWS - PLAYER_ROWS - 1;
    pub const FIELD_W: f32 = COLS as f32 * CELL;
    pub const FIELD_H: f32 = ROWS as f32 * CELL;

    /// Obstacle hit points at spawn
    pub const OBSTACLE_MAX_HP: i32 = 4;

    /// Base speeds (cells/sec or px/sec)
    pub const CREATURE_CELLS_PER_SEC: f32 = 8.0;
    pub const CREATURE_SPEED_CAP: f32 = 12.0;
    pub const BULLET_SPEED: f32 = 640.0;
    pub const PLAYER_SPEED: f32 = 360.0;
    pub const PLAYER_VERTICAL_MULT: f32 = 0.85;
    pub const FLYER_SPEED_X: f32 = 130.0;
    pub const FLYER_SPEED_Y: f32 = 95.0;
    pub const DROPPER_SPEED_Y: f32 = 220.0;
    pub const CROSSER_SPEED_X: f32 = 140.0;
    pub const SAUCER_SPEED_X: f32 = 180.0;
    /// Radius (px) in which a saucer erases obstacles
    pub const SAUCER_CLEAR_RADIUS: f32 = 24.0;
    /// Hostile shots off reflective obstacles move this much faster than bullets
    pub const REFLECTED_SPEED_MULT: f32 = 2.0;
    pub const COIN_FALL_SPEED: f32 = 180.0;
    pub const FALLING_OBSTACLE_SPEED: f32 = 150.0;
    /// Upward kick applied to a juggled falling obstacle
    pub const JUGGLE_BOUNCE_SPEED: f32 = 200.0;
    /// Gravity pulling a juggled obstacle back down (px/s^2)
    pub const FALLING_GRAVITY: f32 = 400.0;
    pub const PICKUP_FALL_SPEED: f32 = 60.0;

    /// Weapon timing
    pub const FIRE_COOLDOWN: f32 = 0.18;
    pub const RAPID_FIRE_COOLDOWN: f32 = 0.05;

    /// Spawn windows (seconds); flyer/crosser bounds are level-scaled in `tuning`
    pub const FLYER_SPAWN_MIN: f32 = 5.0;
    pub const FLYER_SPAWN_MAX: f32 = 10.0;
    pub const DROPPER_SPAWN_COOLDOWN: f32 = 2.0;
    pub const CROSSER_SPAWN_MIN: f32 = 6.0;
    pub const CROSSER_SPAWN_MAX: f32 = 12.0;
    pub const SAUCER_SPAWN_MIN: f32 = 15.0;
    pub const SAUCER_SPAWN_MAX: f32 = 30.0;
    pub const COIN_SPAWN_MIN: f32 = 10.0;
    pub const COIN_SPAWN_MAX: f32 = 20.0;

    /// Spawn a dropper when the player-zone rows hold fewer obstacles than this
    pub const PLAYER_ZONE_MIN_OBSTACLES: usize = 5;
    /// Per-tick chance a dropper deposits an obstacle while falling
    pub const DROPPER_DEPOSIT_CHANCE: f32 = 0.08;

    /// Base point values
    pub const SCORE_SEGMENT: u32 = 10;
    pub const SCORE_HEAD: u32 = 100;
    pub const SCORE_DROPPER: u32 = 200;
    pub const SCORE_FLYER_NEAR: u32 = 900;
    pub const SCORE_FLYER_MED: u32 = 600;
    pub const SCORE_FLYER_FAR: u32 = 300;
    pub const SCORE_CROSSER: u32 = 1500;
    pub const SCORE_SAUCER_MIN: u32 = 500;
    pub const SCORE_SAUCER_MAX: u32 = 3000;
    pub const SCORE_OBSTACLE_HIT: u32 = 1;
    pub const SCORE_POISON_HIT: u32 = 5;
    pub const SCORE_OBSTACLE_CLEAR: u32 = 4;
    pub const SCORE_RAINBOW: u32 = 500;
    pub const SCORE_COIN: u32 = 100;
    pub const SCORE_FALLING: u32 = 3000;
    pub const SCORE_FALLING_POISON: u32 = 6000;
    /// Juggle score doubles per consecutive hit
    pub const JUGGLE_MULTIPLIER: u32 = 2;
    /// A falling obstacle is destroyed for good after this many juggles
    pub const JUGGLE_CAP: u32 = 5;

    /// Combo / chain mechanics (aggressive mode only)
    pub const COMBO_WINDOW: f32 = 0.8;
    pub const MAX_COMBO: f32 = 16.0;
    pub const COMBO_DECAY_RATE: f32 = 2.0;
    pub const CHAIN_TIMEOUT: f32 = 2.0;
    /// (multiplier, consecutive hits required)
    pub const CHAIN_TIERS: [(u32, u32); 7] =
        [(2, 3), (3, 5), (4, 8), (5, 12), (6, 16), (7, 20), (8, 25)];

    /// Level-clear bonuses (aggressive mode only)
    pub const BONUS_LEVEL_COMPLETION: u32 = 1000;
    pub const BONUS_PERFECT_FIELD: u32 = 5000;
    pub const BONUS_SPEED_CLEAR: u32 = 2000;
    pub const BONUS_NO_HIT: u32 = 3000;
    pub const BONUS_PER_OBSTACLE: u32 = 100;
    /// Each level adds 50% to normal score events
    pub const LEVEL_SCORE_MULT: f32 = 0.5;

    /// Rainbow obstacle effect
    pub const RAINBOW_DURATION: f32 = 4.0;
    pub const RAINBOW_SCORE_MULT: f32 = 3.0;

    /// Freeze window after the last segment dies, before the next level
    pub const LEVEL_CLEAR_FREEZE: f32 = 0.6;
    /// Segments in a touchdown-spawned replacement chain
    pub const TOUCHDOWN_CHAIN_LENGTH: usize = 4;

    /// Lives
    pub const START_LIVES: u32 = 3;
    pub const MAX_LIVES: u32 = 6;
    pub const EXTRA_LIFE_STEP: u64 = 20_000;

    /// Drop chances on enemy kill
    pub const COIN_DROP_CHANCE: f32 = 0.15;
    pub const POWERUP_DROP_CHANCE: f32 = 0.2;

    /// Pool capacities
    pub const BULLET_POOL: usize = 24;
    pub const FALLING_POOL: usize = 8;
    pub const REFLECTED_POOL: usize = 8;
    pub const COIN_POOL: usize = 50;
    pub const PICKUP_POOL: usize = 2;

    /// Player energy / special mechanics
    pub const MAX_ENERGY: f32 = 100.0;
    pub const ENERGY_REGEN: f32 = 10.0;
    pub const DASH_SPEED_MULT: f32 = 3.0;
    pub const DASH_DURATION: f32 = 0.15;
    pub const DASH_COOLDOWN: f32 = 0.35;
    pub const DASH_ENERGY_COST: f32 = 25.0;
    pub const DASH_IMMUNITY: f32 = 0.2;
    pub const MEGA_CHARGE_RATE: f32 = 50.0;
    pub const MEGA_CHARGE_FULL: f32 = 100.0;
    pub const MEGA_RADIUS: f32 = 100.0;
    pub const MEGA_DAMAGE: i32 = 5;
}

/// Cell coordinates containing a pixel position
#[inline]
pub fn cell_of(pos: Vec2) -> (i32, i32) {
    (
        (pos.x / consts::CELL).floor() as i32,
        (pos.y / consts::CELL).floor() as i32,
    )
}

/// Pixel origin (top-left corner) of a cell
#[inline]
pub fn cell_origin(col: i32, row: i32) -> Vec2 {
    Vec2::new(col as f32 * consts::CELL, row as f32 * consts::CELL)
}

/// Pixel center of a cell
#[inline]
pub fn cell_center(col: i32, row: i32) -> Vec2 {
    cell_origin(col, row) + Vec2::splat(consts::CELL / 2.0)
}
