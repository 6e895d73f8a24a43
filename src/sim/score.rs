//! Layered scoring rules
//!
//! Baseline mode awards raw per-event values. Aggressive mode layers a
//! combo multiplier, a consecutive-hit chain bonus, a level multiplier and
//! a temporary rainbow multiplier on top, plus a level-clear bonus bundle.
//! Extra-life thresholds apply in both modes.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// How a score application participates in the multiplier rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreEvent {
    /// Multiplied by combo/level/rainbow and feeds the chain counter.
    Normal,
    /// Added raw (level-clear bundles, juggle bonuses).
    Bonus,
}

/// Score, lives, level and the ephemeral scoring accumulators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scoreboard {
    pub score: u64,
    pub lives: u32,
    pub level: u32,
    next_extra_life: u64,
    /// Advanced (aggressive-mode) rules active.
    advanced: bool,

    pub combo: f32,
    combo_timer: f32,
    pub chain_hits: u32,
    chain_timer: f32,
    chain_tier: usize,
    pub rainbow_timer: f32,

    // Per-level accumulators, reset at level start.
    pub level_time: f32,
    pub hits_taken: u32,
    pub obstacles_lost: u32,
}

impl Scoreboard {
    pub fn new(advanced: bool) -> Self {
        Self {
            score: 0,
            lives: START_LIVES,
            level: 1,
            next_extra_life: EXTRA_LIFE_STEP,
            advanced,
            combo: 1.0,
            combo_timer: 0.0,
            chain_hits: 0,
            chain_timer: 0.0,
            chain_tier: 0,
            rainbow_timer: 0.0,
            level_time: 0.0,
            hits_taken: 0,
            obstacles_lost: 0,
        }
    }

    /// Advance the decay timers. Runs once per tick.
    pub fn tick(&mut self, dt: f32) {
        self.level_time += dt;

        if self.combo_timer > 0.0 {
            self.combo_timer -= dt;
        } else {
            self.combo = (self.combo - COMBO_DECAY_RATE * dt).max(1.0);
        }

        if self.chain_timer > 0.0 {
            self.chain_timer -= dt;
            if self.chain_timer <= 0.0 {
                self.chain_hits = 0;
                self.chain_tier = 0;
            }
        }

        self.rainbow_timer = (self.rainbow_timer - dt).max(0.0);
    }

    /// Apply a score event and return the points actually awarded.
    pub fn add(&mut self, base: u32, event: ScoreEvent) -> u64 {
        let amount = match event {
            ScoreEvent::Bonus => base as u64,
            ScoreEvent::Normal if !self.advanced => base as u64,
            ScoreEvent::Normal => {
                self.chain_hits += 1;
                self.chain_timer = CHAIN_TIMEOUT;
                let mut chain_bonus = 0u64;
                if let Some(&(mult, required)) = CHAIN_TIERS.get(self.chain_tier)
                    && self.chain_hits >= required
                {
                    chain_bonus = base as u64 * (mult as u64 - 1);
                    self.chain_tier += 1;
                }

                let level_mult = 1.0 + (self.level - 1) as f32 * LEVEL_SCORE_MULT;
                let rainbow = if self.rainbow_timer > 0.0 {
                    RAINBOW_SCORE_MULT
                } else {
                    1.0
                };
                let scaled = (base as f32 * self.combo * level_mult * rainbow).round() as u64;

                self.combo = (self.combo + 0.5).min(MAX_COMBO);
                self.combo_timer = COMBO_WINDOW;

                scaled + chain_bonus
            }
        };
        self.score += amount;
        self.check_extra_lives();
        amount
    }

    /// Start the temporary rainbow multiplier window.
    pub fn activate_rainbow(&mut self) {
        self.rainbow_timer = RAINBOW_DURATION;
    }

    /// Grant one life, subject to the cap.
    pub fn grant_life(&mut self) {
        self.lives = (self.lives + 1).min(MAX_LIVES);
    }

    /// Record a life loss. Returns false when the run ends: the counter
    /// displays down to zero and the hit at zero is fatal.
    pub fn lose_life(&mut self) -> bool {
        self.hits_taken += 1;
        if self.lives == 0 {
            return false;
        }
        self.lives -= 1;
        self.combo = 1.0;
        self.combo_timer = 0.0;
        self.chain_hits = 0;
        self.chain_tier = 0;
        true
    }

    /// Par time for the current level band.
    pub fn par_time(&self) -> f32 {
        const PAR_TIMES: [f32; 4] = [45.0, 60.0, 75.0, 90.0];
        let band = ((self.level - 1) / 3).min(3) as usize;
        PAR_TIMES[band]
    }

    /// Compute and apply the level-clear bonus bundle as a single bonus
    /// event. Baseline mode awards nothing.
    pub fn level_clear(&mut self, remaining_obstacles: usize) -> u64 {
        if !self.advanced {
            return 0;
        }
        let mut bundle = BONUS_LEVEL_COMPLETION;
        if self.obstacles_lost == 0 {
            bundle += BONUS_PERFECT_FIELD;
        }
        if self.level_time <= self.par_time() {
            bundle += BONUS_SPEED_CLEAR;
        }
        if self.hits_taken == 0 {
            bundle += BONUS_NO_HIT;
        }
        bundle += BONUS_PER_OBSTACLE * remaining_obstacles as u32;
        self.add(bundle, ScoreEvent::Bonus)
    }

    /// Advance to the next level and reset the per-level accumulators.
    pub fn advance_level(&mut self) {
        self.level += 1;
        self.begin_level();
    }

    /// Reset the per-level accumulators.
    pub fn begin_level(&mut self) {
        self.level_time = 0.0;
        self.hits_taken = 0;
        self.obstacles_lost = 0;
        self.combo = 1.0;
        self.combo_timer = 0.0;
        self.chain_hits = 0;
        self.chain_tier = 0;
        self.rainbow_timer = 0.0;
    }

    /// A single large event can cross several thresholds at once, so this
    /// loops.
    fn check_extra_lives(&mut self) {
        while self.score >= self.next_extra_life {
            self.next_extra_life += EXTRA_LIFE_STEP;
            self.grant_life();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_awards_raw_values() {
        let mut board = Scoreboard::new(false);
        assert_eq!(board.add(100, ScoreEvent::Normal), 100);
        assert_eq!(board.add(100, ScoreEvent::Normal), 100);
        assert_eq!(board.combo, 1.0);
        assert_eq!(board.score, 200);
    }

    #[test]
    fn combo_grows_and_multiplies() {
        let mut board = Scoreboard::new(true);
        assert_eq!(board.add(10, ScoreEvent::Normal), 10); // combo 1.0 applied
        assert_eq!(board.add(10, ScoreEvent::Normal), 15); // combo 1.5
        assert_eq!(board.combo, 2.0);
    }

    #[test]
    fn combo_stays_in_bounds() {
        let mut board = Scoreboard::new(true);
        for _ in 0..100 {
            board.add(10, ScoreEvent::Normal);
            assert!(board.combo >= 1.0 && board.combo <= MAX_COMBO);
        }
        assert_eq!(board.combo, MAX_COMBO);
        // Decay after the window lapses, floored at 1.
        for _ in 0..6000 {
            board.tick(SIM_DT);
            assert!(board.combo >= 1.0);
        }
        assert_eq!(board.combo, 1.0);
    }

    #[test]
    fn chain_tier_bonus_awarded_once() {
        let mut board = Scoreboard::new(true);
        let mut tier_hits = Vec::new();
        for i in 1..=6u32 {
            board.combo = 1.0; // isolate the chain contribution
            board.combo_timer = 0.0;
            let awarded = board.add(10, ScoreEvent::Normal);
            if awarded > 10 {
                tier_hits.push(i);
            }
            board.combo = 1.0;
        }
        // First tier requires 3 hits at multiplier 2 (bonus base * 1).
        assert_eq!(tier_hits.first(), Some(&3));
    }

    #[test]
    fn chain_resets_on_timeout() {
        let mut board = Scoreboard::new(true);
        board.add(10, ScoreEvent::Normal);
        board.add(10, ScoreEvent::Normal);
        assert_eq!(board.chain_hits, 2);
        for _ in 0..(2.5 / SIM_DT) as u32 {
            board.tick(SIM_DT);
        }
        assert_eq!(board.chain_hits, 0);
    }

    #[test]
    fn extra_life_loop_crosses_multiple_thresholds() {
        let mut board = Scoreboard::new(false);
        board.add(45_000, ScoreEvent::Bonus);
        // 20k and 40k both crossed in one event.
        assert_eq!(board.lives, START_LIVES + 2);
        board.add(20_000, ScoreEvent::Bonus);
        assert_eq!(board.lives, START_LIVES + 3);
    }

    #[test]
    fn lives_never_exceed_cap() {
        let mut board = Scoreboard::new(false);
        board.add(1_000_000, ScoreEvent::Bonus);
        assert_eq!(board.lives, MAX_LIVES);
    }

    #[test]
    fn life_loss_ends_run_at_zero() {
        let mut board = Scoreboard::new(false);
        assert!(board.lose_life());
        assert!(board.lose_life());
        assert!(board.lose_life());
        assert_eq!(board.lives, 0);
        assert!(!board.lose_life(), "the hit at zero lives is fatal");
    }

    #[test]
    fn level_clear_bundle_composition() {
        let mut board = Scoreboard::new(true);
        // Perfect clear: fast, no losses, no hits, 10 obstacles left.
        let awarded = board.level_clear(10);
        assert_eq!(
            awarded,
            (BONUS_LEVEL_COMPLETION
                + BONUS_PERFECT_FIELD
                + BONUS_SPEED_CLEAR
                + BONUS_NO_HIT
                + BONUS_PER_OBSTACLE * 10) as u64
        );

        let mut slow = Scoreboard::new(true);
        slow.level_time = 1000.0;
        slow.hits_taken = 1;
        slow.obstacles_lost = 4;
        assert_eq!(slow.level_clear(0), BONUS_LEVEL_COMPLETION as u64);
    }

    #[test]
    fn baseline_level_clear_awards_nothing() {
        let mut board = Scoreboard::new(false);
        assert_eq!(board.level_clear(30), 0);
    }

    #[test]
    fn rainbow_multiplier_applies_while_active() {
        let mut board = Scoreboard::new(true);
        board.activate_rainbow();
        assert_eq!(board.add(10, ScoreEvent::Normal), 30);
        for _ in 0..(RAINBOW_DURATION / SIM_DT) as u32 + 2 {
            board.tick(SIM_DT);
        }
        board.combo = 1.0;
        assert_eq!(board.add(10, ScoreEvent::Normal), 10);
    }
}
