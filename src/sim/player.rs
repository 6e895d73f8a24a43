//! Player ship, bullet pool and power-ups

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::field::Field;
use crate::consts::*;
use crate::cell_of;

/// Power-up kinds. Timed kinds carry a duration; instant kinds resolve at
/// pickup and never occupy a timer slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUp {
    RapidFire,
    PassThrough,
    Shield,
    /// Carries the whole timed set across death to the replacement player.
    Lock,
    /// Instant: wipes every obstacle from the field.
    FieldSweep,
    /// Instant: grants one life (subject to the cap).
    ExtraLife,
}

/// Number of timed power-up slots.
pub const TIMED_POWERUPS: usize = 4;

impl PowerUp {
    /// Duration in seconds for timed kinds, `None` for instants. The match
    /// is exhaustive so a new kind cannot ship without a duration decision.
    pub fn duration(self) -> Option<f32> {
        match self {
            PowerUp::RapidFire => Some(10.0),
            PowerUp::PassThrough => Some(10.0),
            PowerUp::Shield => Some(6.0),
            PowerUp::Lock => Some(12.0),
            PowerUp::FieldSweep => None,
            PowerUp::ExtraLife => None,
        }
    }

    /// Timer slot index for timed kinds.
    fn slot(self) -> Option<usize> {
        match self {
            PowerUp::RapidFire => Some(0),
            PowerUp::PassThrough => Some(1),
            PowerUp::Shield => Some(2),
            PowerUp::Lock => Some(3),
            PowerUp::FieldSweep | PowerUp::ExtraLife => None,
        }
    }
}

/// One slot in the bullet pool.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub mega: bool,
    pub active: bool,
}

/// The player ship.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Remaining seconds per timed power-up slot; 0 = inactive.
    pub timers: [f32; TIMED_POWERUPS],
    pub bullets: [Bullet; BULLET_POOL],
    pub fire_cooldown: f32,
    pub energy: f32,
    pub dash_timer: f32,
    pub dash_cooldown: f32,
    /// Post-dash grace period absorbing collisions.
    pub immunity_timer: f32,
    pub mega_charge: f32,
    /// Special intent was held last tick (mega fires on release).
    pub charging: bool,
}

impl Player {
    pub fn new() -> Self {
        Self {
            pos: Vec2::new(FIELD_W / 2.0, FIELD_H - CELL * 1.5),
            timers: [0.0; TIMED_POWERUPS],
            bullets: [Bullet::default(); BULLET_POOL],
            fire_cooldown: 0.0,
            energy: MAX_ENERGY,
            dash_timer: 0.0,
            dash_cooldown: 0.0,
            immunity_timer: 0.0,
            mega_charge: 0.0,
            charging: false,
        }
    }

    /// Fresh player after a life loss. The timed set survives only when the
    /// lock power-up was active.
    pub fn respawn(old: &Player) -> Self {
        let mut player = Self::new();
        if old.has(PowerUp::Lock) {
            player.timers = old.timers;
        }
        player
    }

    pub fn has(&self, kind: PowerUp) -> bool {
        kind.slot().is_some_and(|i| self.timers[i] > 0.0)
    }

    /// Start (or refresh) a timed power-up. Instants are handled by the
    /// caller and ignored here.
    pub fn apply(&mut self, kind: PowerUp) {
        if let (Some(i), Some(duration)) = (kind.slot(), kind.duration()) {
            self.timers[i] = duration;
        }
    }

    /// Decrement timed effects, cooldowns and regen. Runs once per tick.
    pub fn tick_timers(&mut self, dt: f32) {
        for timer in &mut self.timers {
            *timer = (*timer - dt).max(0.0);
        }
        self.fire_cooldown = (self.fire_cooldown - dt).max(0.0);
        self.dash_timer = (self.dash_timer - dt).max(0.0);
        self.dash_cooldown = (self.dash_cooldown - dt).max(0.0);
        self.immunity_timer = (self.immunity_timer - dt).max(0.0);
        self.energy = (self.energy + ENERGY_REGEN * dt).min(MAX_ENERGY);
    }

    /// Apply a movement intent. The vector is clamped to unit length, speed
    /// is scaled for vertical travel and dash, position is clamped to the
    /// player zone, and movement into an obstacle cell is reverted unless
    /// pass-through is held.
    pub fn apply_movement(&mut self, move_dir: Vec2, dt: f32, field: &Field) {
        let before = self.pos;

        let dir = if move_dir.length_squared() > 1.0 {
            move_dir.normalize()
        } else {
            move_dir
        };
        let speed = if self.dash_timer > 0.0 {
            PLAYER_SPEED * DASH_SPEED_MULT
        } else {
            PLAYER_SPEED
        };
        self.pos.x += dir.x * speed * dt;
        self.pos.y += dir.y * speed * PLAYER_VERTICAL_MULT * dt;

        let half = CELL / 2.0;
        let zone_top = (ROWS - PLAYER_ROWS) as f32 * CELL + half;
        self.pos.x = self.pos.x.clamp(half, FIELD_W - half);
        self.pos.y = self.pos.y.clamp(zone_top, FIELD_H - half);

        if !self.has(PowerUp::PassThrough) {
            let (col, row) = cell_of(self.pos);
            if field.is_occupied(col, row) {
                self.pos = before;
            }
        }
    }

    /// Attempt to dash. Costs energy and grants brief immunity.
    pub fn try_dash(&mut self) {
        if self.dash_cooldown > 0.0 || self.energy < DASH_ENERGY_COST {
            return;
        }
        self.energy -= DASH_ENERGY_COST;
        self.dash_timer = DASH_DURATION;
        self.dash_cooldown = DASH_COOLDOWN;
        self.immunity_timer = self.immunity_timer.max(DASH_IMMUNITY);
    }

    /// True while any damage-absorbing effect is active.
    pub fn is_invulnerable(&self) -> bool {
        self.has(PowerUp::Shield) || self.immunity_timer > 0.0
    }

    fn live_bullets(&self) -> usize {
        self.bullets.iter().filter(|b| b.active).count()
    }

    /// Fire one bullet if the cooldown has elapsed and a pool slot is free.
    /// Without rapid-fire at most one bullet may be live at a time.
    pub fn try_fire(&mut self) -> bool {
        if self.fire_cooldown > 0.0 {
            return false;
        }
        let rapid = self.has(PowerUp::RapidFire);
        if !rapid && self.live_bullets() > 0 {
            return false;
        }
        let spawn = self.pos - Vec2::new(0.0, CELL / 2.0);
        for bullet in &mut self.bullets {
            if !bullet.active {
                *bullet = Bullet {
                    pos: spawn,
                    mega: false,
                    active: true,
                };
                self.fire_cooldown = if rapid { RAPID_FIRE_COOLDOWN } else { FIRE_COOLDOWN };
                return true;
            }
        }
        // Pool exhausted; the request is dropped.
        false
    }

    /// Charge while the special intent is held; fire the mega bullet on
    /// release once the charge is full. Returns true when a mega bullet was
    /// launched this tick.
    pub fn update_special(&mut self, held: bool, dt: f32) -> bool {
        let mut fired = false;
        if held {
            self.mega_charge = (self.mega_charge + MEGA_CHARGE_RATE * dt).min(MEGA_CHARGE_FULL);
        } else {
            if self.charging && self.mega_charge >= MEGA_CHARGE_FULL {
                let spawn = self.pos - Vec2::new(0.0, CELL / 2.0);
                for bullet in &mut self.bullets {
                    if !bullet.active {
                        *bullet = Bullet {
                            pos: spawn,
                            mega: true,
                            active: true,
                        };
                        fired = true;
                        break;
                    }
                }
            }
            self.mega_charge = 0.0;
        }
        self.charging = held;
        fired
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::field::Obstacle;

    #[test]
    fn blocked_movement_reverts_exactly() {
        let mut field = Field::new();
        let mut player = Player::new();
        let before = player.pos;
        let (col, row) = cell_of(before + Vec2::new(PLAYER_SPEED * SIM_DT, 0.0));
        field.set(col, row, Some(Obstacle::new()));
        player.apply_movement(Vec2::new(1.0, 0.0), SIM_DT, &field);
        assert_eq!(player.pos, before);
    }

    #[test]
    fn pass_through_ignores_obstacles() {
        let mut field = Field::new();
        let mut player = Player::new();
        player.apply(PowerUp::PassThrough);
        let before = player.pos;
        let (col, row) = cell_of(before + Vec2::new(PLAYER_SPEED * SIM_DT, 0.0));
        field.set(col, row, Some(Obstacle::new()));
        player.apply_movement(Vec2::new(1.0, 0.0), SIM_DT, &field);
        assert!(player.pos.x > before.x);
    }

    #[test]
    fn position_clamped_to_player_zone() {
        let field = Field::new();
        let mut player = Player::new();
        for _ in 0..600 {
            player.apply_movement(Vec2::new(0.0, -1.0), SIM_DT, &field);
        }
        let zone_top = (ROWS - PLAYER_ROWS) as f32 * CELL + CELL / 2.0;
        assert_eq!(player.pos.y, zone_top);
        for _ in 0..600 {
            player.apply_movement(Vec2::new(-1.0, 1.0), SIM_DT, &field);
        }
        assert_eq!(player.pos.x, CELL / 2.0);
        assert_eq!(player.pos.y, FIELD_H - CELL / 2.0);
    }

    #[test]
    fn single_live_bullet_without_rapid_fire() {
        let mut player = Player::new();
        assert!(player.try_fire());
        player.fire_cooldown = 0.0;
        assert!(!player.try_fire(), "second bullet refused while one is live");
        player.bullets[0].active = false;
        assert!(player.try_fire());
    }

    #[test]
    fn rapid_fire_allows_multiple_bullets() {
        let mut player = Player::new();
        player.apply(PowerUp::RapidFire);
        for _ in 0..4 {
            assert!(player.try_fire());
            player.fire_cooldown = 0.0;
        }
        assert_eq!(player.bullets.iter().filter(|b| b.active).count(), 4);
    }

    #[test]
    fn timed_powerups_expire() {
        let mut player = Player::new();
        player.apply(PowerUp::Shield);
        assert!(player.has(PowerUp::Shield));
        for _ in 0..(6.5 / SIM_DT) as u32 {
            player.tick_timers(SIM_DT);
        }
        assert!(!player.has(PowerUp::Shield));
    }

    #[test]
    fn lock_carries_timers_across_death() {
        let mut player = Player::new();
        player.apply(PowerUp::Lock);
        player.apply(PowerUp::RapidFire);
        let replacement = Player::respawn(&player);
        assert!(replacement.has(PowerUp::RapidFire));
        assert!(replacement.has(PowerUp::Lock));

        let mut unlocked = Player::new();
        unlocked.apply(PowerUp::RapidFire);
        let replacement = Player::respawn(&unlocked);
        assert!(!replacement.has(PowerUp::RapidFire));
    }

    #[test]
    fn dash_costs_energy_and_grants_immunity() {
        let mut player = Player::new();
        player.try_dash();
        assert_eq!(player.energy, MAX_ENERGY - DASH_ENERGY_COST);
        assert!(player.is_invulnerable());
        // Cooldown blocks an immediate second dash.
        player.try_dash();
        assert_eq!(player.energy, MAX_ENERGY - DASH_ENERGY_COST);
    }

    #[test]
    fn mega_fires_on_release_when_full() {
        let mut player = Player::new();
        for _ in 0..(2.5 / SIM_DT) as u32 {
            assert!(!player.update_special(true, SIM_DT));
        }
        assert_eq!(player.mega_charge, MEGA_CHARGE_FULL);
        assert!(player.update_special(false, SIM_DT));
        assert!(player.bullets.iter().any(|b| b.active && b.mega));
        assert_eq!(player.mega_charge, 0.0);
    }

    #[test]
    fn partial_charge_does_not_fire() {
        let mut player = Player::new();
        player.update_special(true, 0.5);
        assert!(!player.update_special(false, SIM_DT));
        assert!(player.bullets.iter().all(|b| !b.active));
    }
}
