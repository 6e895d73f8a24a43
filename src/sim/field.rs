//! Obstacle field
//!
//! A column-major flat grid of optional obstacles. All accessors validate
//! coordinates: out-of-range reads return `None` and out-of-range writes
//! are ignored, so callers never need to bounds-check.

use serde::{Deserialize, Serialize};

use super::rng::GameRng;
use crate::consts::*;
use crate::tuning::DifficultyMode;

/// A destructible field obstacle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Obstacle {
    pub hp: i32,
    pub poisoned: bool,
    /// Bounces bullets back as hostile shots instead of taking damage.
    pub reflective: bool,
    /// Awards points and a temporary score multiplier instead of taking damage.
    pub rainbow: bool,
}

impl Obstacle {
    pub fn new() -> Self {
        Self {
            hp: OBSTACLE_MAX_HP,
            poisoned: false,
            reflective: false,
            rainbow: false,
        }
    }
}

impl Default for Obstacle {
    fn default() -> Self {
        Self::new()
    }
}

/// The obstacle grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    cells: Vec<Option<Obstacle>>,
}

impl Field {
    pub fn new() -> Self {
        Self {
            cells: vec![None; (COLS * ROWS) as usize],
        }
    }

    #[inline]
    fn index(col: i32, row: i32) -> Option<usize> {
        if (0..COLS).contains(&col) && (0..ROWS).contains(&row) {
            Some((row * COLS + col) as usize)
        } else {
            None
        }
    }

    pub fn get(&self, col: i32, row: i32) -> Option<&Obstacle> {
        Self::index(col, row).and_then(|i| self.cells[i].as_ref())
    }

    pub fn get_mut(&mut self, col: i32, row: i32) -> Option<&mut Obstacle> {
        Self::index(col, row).and_then(|i| self.cells[i].as_mut())
    }

    /// Write a cell. Out-of-range writes are dropped.
    pub fn set(&mut self, col: i32, row: i32, obstacle: Option<Obstacle>) {
        if let Some(i) = Self::index(col, row) {
            self.cells[i] = obstacle;
        }
    }

    pub fn is_occupied(&self, col: i32, row: i32) -> bool {
        self.get(col, row).is_some()
    }

    /// Count obstacles in rows `r0..=r1` (clamped to the grid).
    pub fn count_in_row_range(&self, r0: i32, r1: i32) -> usize {
        let r0 = r0.clamp(0, ROWS - 1);
        let r1 = r1.clamp(0, ROWS - 1);
        let mut n = 0;
        for row in r0..=r1 {
            for col in 0..COLS {
                if self.is_occupied(col, row) {
                    n += 1;
                }
            }
        }
        n
    }

    pub fn count_all(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Clear the grid and place `floor(cells_above_player_zone * density)`
    /// obstacles in random empty cells above the player zone. Reflective and
    /// rainbow variants only appear in aggressive mode once their levels
    /// unlock.
    pub fn seed(&mut self, density: f32, level: u32, mode: DifficultyMode, rng: &mut GameRng) {
        self.cells.fill(None);

        let seed_rows = ROWS - PLAYER_ROWS;
        let free = (COLS * seed_rows) as usize;
        // An over-unity density would otherwise spin the rejection loop
        // forever.
        let target = ((free as f32 * density).floor() as usize).min(free);

        let reflective_chance = if mode == DifficultyMode::Aggressive && level >= 15 {
            (0.015 * (level - 14) as f32).min(0.12)
        } else {
            0.0
        };
        let rainbow_chance = if mode == DifficultyMode::Aggressive && level >= 3 {
            0.02
        } else {
            0.0
        };

        let mut placed = 0;
        while placed < target {
            let col = rng.range_i32(0, COLS);
            let row = rng.range_i32(0, seed_rows);
            if self.is_occupied(col, row) {
                continue;
            }
            let mut obstacle = Obstacle::new();
            if rng.chance(reflective_chance) {
                obstacle.reflective = true;
            } else if rng.chance(rainbow_chance) {
                obstacle.rainbow = true;
            }
            self.set(col, row, Some(obstacle));
            placed += 1;
        }
    }
}

impl Default for Field {
    fn default() -> Self {
        Self::new()
    }
}
