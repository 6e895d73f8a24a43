//! Per-level difficulty tuning
//!
//! Pure functions from (level, mode) to tuning values. The aggressive
//! curve is a fixed transform of the baseline curve rather than an
//! independent table, so the two modes can never drift apart.

use serde::{Deserialize, Serialize};

/// Which tuning curve and scoring rule set a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyMode {
    #[default]
    Baseline,
    Aggressive,
}

/// Tuning values for one level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelTuning {
    /// Obstacle density over the non-player-zone grid at level seed.
    pub density: f32,
    /// Segments in the level's initial creature chain.
    pub chain_length: usize,
    /// Flyer respawn window (seconds).
    pub flyer_window: (f32, f32),
    /// Crosser respawn window (seconds).
    pub crosser_window: (f32, f32),
    /// Chance that a destroyed obstacle falls out of the field.
    pub falling_chance: f32,
    /// Touchdown stops spawning chains past this many live segments.
    pub touchdown_segment_cap: usize,
    /// Seconds between touchdown-triggered bonus flyers.
    pub touchdown_bonus_cooldown: f32,
}

/// Tuning for `level` (1-based) under `mode`.
pub fn level_tuning(level: u32, mode: DifficultyMode) -> LevelTuning {
    let l = level.max(1) as f32;

    let base = LevelTuning {
        density: 0.14 + ((l - 1.0) * 0.018).min(0.13),
        chain_length: (10 + 2 * level.max(1) as usize).min(16),
        flyer_window: ((5.0 - 0.2 * l).max(1.5), (10.0 - 0.3 * l).max(3.0)),
        crosser_window: ((6.0 - 0.25 * l).max(3.0), (12.0 - 0.4 * l).max(6.0)),
        falling_chance: (0.04 + 0.01 * l).min(0.25),
        touchdown_segment_cap: 42,
        touchdown_bonus_cooldown: 1.4,
    };

    match mode {
        DifficultyMode::Baseline => base,
        DifficultyMode::Aggressive => LevelTuning {
            density: (base.density + 0.03).min(0.34),
            chain_length: (base.chain_length + 2).min(20),
            flyer_window: (
                (base.flyer_window.0 * 0.82).max(1.2),
                (base.flyer_window.1 * 0.82).max(2.5),
            ),
            crosser_window: (
                (base.crosser_window.0 * 0.82).max(2.5),
                (base.crosser_window.1 * 0.82).max(5.0),
            ),
            falling_chance: (base.falling_chance * 1.45).min(0.40),
            touchdown_segment_cap: 56,
            touchdown_bonus_cooldown: 0.9,
        },
    }
}

/// Advanced scoring (combo, chain, level and rainbow multipliers, clear
/// bonuses) only runs in aggressive mode.
pub fn uses_advanced_scoring(mode: DifficultyMode) -> bool {
    mode == DifficultyMode::Aggressive
}
