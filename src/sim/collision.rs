//! Axis-aligned collision geometry
//!
//! Every actor in the game occupies an axis-aligned rectangle in pixel
//! space, so overlap tests reduce to AABB intersection. Cell-sized rects
//! are built from grid coordinates for obstacle checks.

use glam::Vec2;

use crate::consts::CELL;
use crate::cell_origin;

/// Axis-aligned rectangle, origin at top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    /// Rect centered on `center`.
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self {
            pos: center - size / 2.0,
            size,
        }
    }

    /// The full cell at (col, row).
    pub fn cell(col: i32, row: i32) -> Self {
        Self {
            pos: cell_origin(col, row),
            size: Vec2::splat(CELL),
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.pos.x < other.pos.x + other.size.x
            && self.pos.x + self.size.x > other.pos.x
            && self.pos.y < other.pos.y + other.size.y
            && self.pos.y + self.size.y > other.pos.y
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.pos.x
            && point.x < self.pos.x + self.size.x
            && point.y >= self.pos.y
            && point.y < self.pos.y + self.size.y
    }
}

/// True when `center` lies within `radius` of the rect's center.
/// Coarse circle test used by area effects; precise enough for cell-sized
/// targets.
pub fn within_radius(center: Vec2, rect: &Rect, radius: f32) -> bool {
    center.distance_squared(rect.center()) <= radius * radius
}
