//! Segmented creature chains
//!
//! Each chain is an ordered run of segments moving in lockstep over the
//! obstacle grid. The head walks a small state machine; every segment
//! behind it copies the position its predecessor held before the step
//! (follow-the-leader with one-step lag).

use serde::{Deserialize, Serialize};

use super::field::Field;
use crate::consts::*;

/// One element of a chain. Exactly one segment per chain has `head` set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub col: i32,
    pub row: i32,
    /// Horizontal travel direction, +1 or -1.
    pub dir: i32,
    pub head: bool,
}

/// Head movement state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainMode {
    /// Normal horizontal travel with bounce-and-descend at edges/obstacles.
    Advancing,
    /// Vertical plunge triggered by a poisoned obstacle ahead.
    Diving,
}

/// A chain of creature segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chain {
    pub segments: Vec<Segment>,
    pub mode: ChainMode,
    /// Fractional cell movement accumulator.
    pub acc: f32,
    /// Cells per second.
    pub speed: f32,
    touched_down: bool,
}

impl Chain {
    /// Spawn a chain with its head at (start_col, 0) and the body trailing
    /// opposite the travel direction.
    pub fn new(length: usize, start_col: i32, dir: i32, level: u32) -> Self {
        let dir = if dir >= 0 { 1 } else { -1 };
        let length = length.max(1);
        let segments = (0..length)
            .map(|i| Segment {
                col: start_col - dir * i as i32,
                row: 0,
                dir,
                head: i == 0,
            })
            .collect();
        Self {
            segments,
            mode: ChainMode::Advancing,
            acc: 0.0,
            speed: (CREATURE_CELLS_PER_SEC + level as f32 * 0.6).min(CREATURE_SPEED_CAP),
            touched_down: false,
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn head(&self) -> Option<&Segment> {
        self.segments.first()
    }

    /// Accumulate movement and perform one discrete step per whole cell.
    pub fn tick(&mut self, dt: f32, field: &Field) {
        if self.segments.is_empty() {
            return;
        }
        self.acc += self.speed * dt;
        while self.acc >= 1.0 {
            self.acc -= 1.0;
            self.step(field);
        }
    }

    /// One discrete cell step for the whole chain.
    pub fn step(&mut self, field: &Field) {
        let Some(head) = self.segments.first().copied() else {
            return;
        };

        // Body segments take the position their predecessor held before
        // this step.
        let previous: Vec<(i32, i32, i32)> = self
            .segments
            .iter()
            .map(|s| (s.col, s.row, s.dir))
            .collect();

        let mut next = head;
        match self.mode {
            ChainMode::Advancing => {
                let ahead_col = head.col + head.dir;
                let off_field = !(0..COLS).contains(&ahead_col);
                let blocking = field.get(ahead_col, head.row);
                match blocking {
                    Some(o) if o.poisoned && !off_field => {
                        self.mode = ChainMode::Diving;
                        next.row += 1;
                    }
                    Some(_) => {
                        next.dir = -head.dir;
                        next.row += 1;
                    }
                    None if off_field => {
                        next.dir = -head.dir;
                        next.row += 1;
                    }
                    None => {
                        next.col = ahead_col;
                    }
                }
            }
            ChainMode::Diving => {
                next.row += 1;
                if next.row >= MAX_ENEMY_ROW {
                    self.mode = ChainMode::Advancing;
                }
            }
        }

        // Reaching the player zone wraps the head back to the top and
        // latches the touchdown signal.
        if next.row >= MAX_ENEMY_ROW {
            next.row = 0;
            self.mode = ChainMode::Advancing;
            self.touched_down = true;
        }

        self.segments[0] = next;
        for i in 1..self.segments.len() {
            let (col, row, dir) = previous[i - 1];
            self.segments[i].col = col;
            self.segments[i].row = row;
            self.segments[i].dir = dir;
        }
    }

    /// Take the pending touchdown signal. Returns true at most once per
    /// touchdown.
    pub fn consume_touchdown(&mut self) -> bool {
        std::mem::take(&mut self.touched_down)
    }

    /// Remove the segment at `index` and split the remainder into up to two
    /// chains, each re-rooted with its own head. Total segment count across
    /// the returned chains is `self.len() - 1`.
    pub fn split(mut self, index: usize) -> Vec<Chain> {
        if index >= self.segments.len() {
            return vec![self];
        }
        let speed = self.speed;
        let rear: Vec<Segment> = self.segments.split_off(index + 1);
        self.segments.truncate(index);

        let mut out = Vec::with_capacity(2);
        if !self.segments.is_empty() {
            out.push(self);
        }
        if !rear.is_empty() {
            let mut chain = Chain {
                speed,
                segments: rear,
                mode: ChainMode::Advancing,
                acc: 0.0,
                touched_down: false,
            };
            for (i, s) in chain.segments.iter_mut().enumerate() {
                s.head = i == 0;
            }
            out.push(chain);
        }
        // Front part keeps its head flag; re-assert in case index == 0 was
        // not taken and the old head survived.
        if let Some(front) = out.first_mut() {
            for (i, s) in front.segments.iter_mut().enumerate() {
                s.head = i == 0;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::field::Obstacle;

    fn empty_field() -> Field {
        Field::new()
    }

    #[test]
    fn head_bounces_at_left_edge() {
        let field = empty_field();
        let mut chain = Chain::new(10, 0, -1, 1);
        chain.step(&field);
        let head = chain.head().copied().unwrap();
        assert_eq!(head.dir, 1);
        assert_eq!(head.row, 1);
        assert_eq!(head.col, 0);
        // Body shifted to follow.
        assert_eq!(chain.segments[1].col, 0);
        assert_eq!(chain.segments[1].row, 0);
    }

    #[test]
    fn head_advances_into_empty_cell() {
        let field = empty_field();
        let mut chain = Chain::new(3, 10, 1, 1);
        chain.step(&field);
        let head = chain.head().copied().unwrap();
        assert_eq!((head.col, head.row), (11, 0));
        assert_eq!((chain.segments[1].col, chain.segments[1].row), (10, 0));
    }

    #[test]
    fn non_poisoned_obstacle_bounces() {
        let mut field = empty_field();
        field.set(11, 0, Some(Obstacle::new()));
        let mut chain = Chain::new(1, 10, 1, 1);
        chain.step(&field);
        let head = chain.head().copied().unwrap();
        assert_eq!(head.dir, -1);
        assert_eq!(head.row, 1);
        assert_eq!(chain.mode, ChainMode::Advancing);
    }

    #[test]
    fn poisoned_obstacle_triggers_dive() {
        let mut field = empty_field();
        let mut poisoned = Obstacle::new();
        poisoned.poisoned = true;
        field.set(11, 0, Some(poisoned));
        let mut chain = Chain::new(1, 10, 1, 1);
        chain.step(&field);
        let head = chain.head().copied().unwrap();
        assert_eq!(chain.mode, ChainMode::Diving);
        assert_eq!(head.dir, 1, "dive keeps direction");
        assert_eq!(head.row, 1);

        // Subsequent steps drop straight down; the head never enters the
        // poisoned cell.
        chain.step(&field);
        assert_eq!(chain.head().unwrap().row, 2);
        assert_eq!(chain.head().unwrap().col, 10);
    }

    #[test]
    fn dive_keeps_column() {
        let mut field = empty_field();
        let mut poisoned = Obstacle::new();
        poisoned.poisoned = true;
        field.set(6, 0, Some(poisoned));
        let mut chain = Chain::new(1, 5, 1, 1);
        chain.step(&field);
        let col = chain.head().unwrap().col;
        chain.step(&field);
        chain.step(&field);
        assert_eq!(chain.head().unwrap().col, col);
    }

    #[test]
    fn touchdown_wraps_and_latches_once() {
        let field = empty_field();
        let mut chain = Chain::new(1, 5, 1, 1);
        chain.mode = ChainMode::Diving;
        chain.segments[0].row = MAX_ENEMY_ROW - 1;
        chain.step(&field);
        let head = chain.head().copied().unwrap();
        assert_eq!(head.row, 0);
        assert_eq!(chain.mode, ChainMode::Advancing);
        assert!(chain.consume_touchdown());
        assert!(!chain.consume_touchdown(), "signal is one-shot");
    }

    #[test]
    fn touchdown_from_advancing_bounce() {
        let field = empty_field();
        let mut chain = Chain::new(1, 0, -1, 1);
        chain.segments[0].row = MAX_ENEMY_ROW - 1;
        chain.step(&field);
        assert_eq!(chain.head().unwrap().row, 0);
        assert!(chain.consume_touchdown());
    }

    #[test]
    fn split_conserves_segments() {
        let chain = Chain::new(10, 20, 1, 1);
        let parts = chain.split(3);
        assert_eq!(parts.len(), 2);
        let total: usize = parts.iter().map(Chain::len).sum();
        assert_eq!(total, 9);
        for part in &parts {
            assert!(part.head().unwrap().head);
            assert_eq!(part.segments.iter().filter(|s| s.head).count(), 1);
        }
    }

    #[test]
    fn split_at_head_leaves_one_chain() {
        let chain = Chain::new(5, 20, 1, 1);
        let parts = chain.split(0);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].len(), 4);
        assert!(parts[0].head().unwrap().head);
    }

    #[test]
    fn split_at_tail_leaves_one_chain() {
        let chain = Chain::new(5, 20, 1, 1);
        let parts = chain.split(4);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].len(), 4);
    }

    #[test]
    fn fractional_accumulator_steps_whole_cells() {
        let field = empty_field();
        let mut chain = Chain::new(1, 10, 1, 1);
        chain.speed = 8.0;
        chain.tick(0.0625, &field); // 0.5 cells, no step
        assert_eq!(chain.head().unwrap().col, 10);
        chain.tick(0.0625, &field); // 1.0 cells total, one step
        assert_eq!(chain.head().unwrap().col, 11);
    }

    #[test]
    fn speed_is_capped() {
        let chain = Chain::new(1, 0, 1, 99);
        assert_eq!(chain.speed, CREATURE_SPEED_CAP);
    }
}
