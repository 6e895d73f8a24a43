//! Roaming enemies
//!
//! Four independent actor kinds, each with its own spawn cadence and
//! movement rule. Every kind sets its own `dead` flag on exit; the tick
//! compacts dead entries out of the pools.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::field::{Field, Obstacle};
use super::rng::GameRng;
use crate::consts::*;
use crate::{cell_center, cell_of};

/// Rows the flyer is allowed to roam, measured up from the bottom edge.
const FLYER_BAND_ROWS: i32 = 12;

/// Erratic flyer. Crosses horizontally while flipping its vertical leg on
/// a short random timer, staying inside the lower band of the field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flyer {
    pub pos: Vec2,
    pub speed_x: f32,
    /// +1 entering from the left, -1 from the right.
    pub dir: i32,
    pub vy: f32,
    pub turn_timer: f32,
    pub dead: bool,
}

impl Flyer {
    pub fn spawn(level: u32, rng: &mut GameRng) -> Self {
        let dir = if rng.chance(0.5) { 1 } else { -1 };
        let band_top = (ROWS - FLYER_BAND_ROWS) as f32 * CELL;
        Self {
            pos: Vec2::new(
                if dir == 1 { -CELL } else { FIELD_W + CELL },
                rng.range_f32(band_top, FIELD_H - CELL),
            ),
            speed_x: FLYER_SPEED_X + (level as f32 * 12.0).min(120.0),
            dir,
            vy: if rng.chance(0.5) {
                FLYER_SPEED_Y
            } else {
                -FLYER_SPEED_Y
            },
            turn_timer: rng.range_f32(0.4, 1.2),
            dead: false,
        }
    }

    pub fn tick(&mut self, dt: f32, rng: &mut GameRng) {
        self.pos.x += self.dir as f32 * self.speed_x * dt;

        self.turn_timer -= dt;
        if self.turn_timer <= 0.0 {
            self.vy = -self.vy;
            self.turn_timer = rng.range_f32(0.4, 1.2);
        }
        self.pos.y += self.vy * dt;

        let band_top = (ROWS - FLYER_BAND_ROWS) as f32 * CELL;
        let band_bottom = FIELD_H - CELL;
        if self.pos.y < band_top {
            self.pos.y = band_top;
            self.vy = self.vy.abs();
        } else if self.pos.y > band_bottom {
            self.pos.y = band_bottom;
            self.vy = -self.vy.abs();
        }

        if (self.dir == 1 && self.pos.x > FIELD_W + CELL)
            || (self.dir == -1 && self.pos.x < -CELL)
        {
            self.dead = true;
        }
    }
}

/// Dropper. Falls from a random column and may deposit obstacles on the
/// way down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dropper {
    pub pos: Vec2,
    pub dead: bool,
}

impl Dropper {
    pub fn spawn(rng: &mut GameRng) -> Self {
        let col = rng.range_i32(0, COLS);
        Self {
            pos: Vec2::new(cell_center(col, 0).x, -CELL),
            dead: false,
        }
    }

    pub fn tick(&mut self, dt: f32, field: &mut Field, rng: &mut GameRng) {
        self.pos.y += DROPPER_SPEED_Y * dt;

        // Deposits only into empty cells above the player zone.
        if rng.chance(DROPPER_DEPOSIT_CHANCE) {
            let (col, row) = cell_of(self.pos);
            if row >= 0 && row < ROWS - PLAYER_ROWS && !field.is_occupied(col, row) {
                field.set(col, row, Some(Obstacle::new()));
            }
        }

        if self.pos.y > FIELD_H + CELL {
            self.dead = true;
        }
    }
}

/// Ground crosser. Walks straight across an upper-field row, poisoning the
/// obstacle under its center every tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crosser {
    pub pos: Vec2,
    pub dir: i32,
    pub dead: bool,
}

impl Crosser {
    pub fn spawn(rng: &mut GameRng) -> Self {
        let dir = if rng.chance(0.5) { 1 } else { -1 };
        let row = rng.range_i32(5, 15);
        Self {
            pos: Vec2::new(
                if dir == 1 { -CELL } else { FIELD_W + CELL },
                cell_center(0, row).y,
            ),
            dir,
            dead: false,
        }
    }

    pub fn tick(&mut self, dt: f32, field: &mut Field) {
        self.pos.x += self.dir as f32 * CROSSER_SPEED_X * dt;

        let (col, row) = cell_of(self.pos);
        if let Some(obstacle) = field.get_mut(col, row) {
            obstacle.poisoned = true;
        }

        if (self.dir == 1 && self.pos.x > FIELD_W + CELL)
            || (self.dir == -1 && self.pos.x < -CELL)
        {
            self.dead = true;
        }
    }
}

/// Saucer. Crosses the top third of the field, erasing obstacles within a
/// fixed radius of its center.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Saucer {
    pub pos: Vec2,
    pub dir: i32,
    pub dead: bool,
}

impl Saucer {
    pub fn spawn(rng: &mut GameRng) -> Self {
        let dir = if rng.chance(0.5) { 1 } else { -1 };
        let row = rng.range_i32(1, ROWS / 3);
        Self {
            pos: Vec2::new(
                if dir == 1 { -CELL } else { FIELD_W + CELL },
                cell_center(0, row).y,
            ),
            dir,
            dead: false,
        }
    }

    pub fn tick(&mut self, dt: f32, field: &mut Field) {
        self.pos.x += self.dir as f32 * SAUCER_SPEED_X * dt;

        // Only cells in the bounding box of the clear radius are candidates.
        let r = SAUCER_CLEAR_RADIUS;
        let (c0, r0) = cell_of(self.pos - Vec2::splat(r));
        let (c1, r1) = cell_of(self.pos + Vec2::splat(r));
        for row in r0..=r1 {
            for col in c0..=c1 {
                if field.is_occupied(col, row)
                    && cell_center(col, row).distance_squared(self.pos) <= r * r
                {
                    field.set(col, row, None);
                }
            }
        }

        if (self.dir == 1 && self.pos.x > FIELD_W + CELL)
            || (self.dir == -1 && self.pos.x < -CELL)
        {
            self.dead = true;
        }
    }
}
