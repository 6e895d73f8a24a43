//! Fixed-timestep simulation tick
//!
//! One call advances the world by `dt` (the engine always passes the fixed
//! step). Update order is fixed: scoring timers, player, creatures,
//! roaming enemies, spawn timers, transient actors, bullet resolution,
//! player-side collisions, pool compaction, touchdown handling, level-clear
//! check.

use glam::Vec2;

use super::collision::{Rect, within_radius};
use super::creature::Chain;
use super::enemies::{Crosser, Dropper, Flyer, Saucer};
use super::field::Obstacle;
use super::player::{Player, PowerUp};
use super::score::ScoreEvent;
use super::state::GameState;
use crate::consts::*;
use crate::tuning::{self, LevelTuning};
use crate::{cell_center, cell_of};

/// Resolved player intent for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// Movement direction; clamped to unit length by the player update.
    pub move_dir: Vec2,
    pub fire: bool,
    /// Held to charge the mega bullet; released to fire it.
    pub special: bool,
    pub dash: bool,
}

impl TickInput {
    /// Build an input from discrete direction flags, normalizing diagonals.
    pub fn from_flags(left: bool, right: bool, up: bool, down: bool, fire: bool) -> Self {
        let mut dir = Vec2::ZERO;
        if left {
            dir.x -= 1.0;
        }
        if right {
            dir.x += 1.0;
        }
        if up {
            dir.y -= 1.0;
        }
        if down {
            dir.y += 1.0;
        }
        if dir.length_squared() > 1.0 {
            dir = dir.normalize();
        }
        Self {
            move_dir: dir,
            fire,
            special: false,
            dash: false,
        }
    }
}

/// Advance the simulation by one step.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if state.game_over {
        return;
    }
    state.time_ticks += 1;

    // Level-clear freeze: nothing moves, then the bonus bundle lands and
    // the next level starts.
    if state.clear_timer > 0.0 {
        state.clear_timer -= dt;
        if state.clear_timer <= 0.0 {
            let remaining = state.field.count_all();
            let bonus = state.board.level_clear(remaining);
            log::info!(
                "level {} cleared: bonus {bonus}, score {}",
                state.board.level,
                state.board.score
            );
            state.board.advance_level();
            state.start_level();
        }
        return;
    }

    let tuning = tuning::level_tuning(state.board.level, state.mode);

    state.board.tick(dt);

    update_player(state, input, dt);
    for chain in &mut state.chains {
        chain.tick(dt, &state.field);
    }
    update_enemies(state, dt);
    update_spawn_timers(state, dt, &tuning);
    update_transients(state, dt);
    resolve_bullets(state, &tuning);
    resolve_player_collisions(state);
    collect_pickups(state);
    compact(state);
    handle_touchdowns(state, &tuning);

    if state.chains.is_empty() && state.clear_timer <= 0.0 {
        state.clear_timer = LEVEL_CLEAR_FREEZE;
    }
}

fn update_player(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.dash {
        state.player.try_dash();
    }
    state.player.tick_timers(dt);
    state.player.apply_movement(input.move_dir, dt, &state.field);
    if input.fire {
        state.player.try_fire();
    }
    state.player.update_special(input.special, dt);

    for bullet in &mut state.player.bullets {
        if bullet.active {
            bullet.pos.y -= BULLET_SPEED * dt;
            if bullet.pos.y < -CELL {
                bullet.active = false;
            }
        }
    }
}

fn update_enemies(state: &mut GameState, dt: f32) {
    for flyer in &mut state.flyers {
        flyer.tick(dt, &mut state.rng);
    }
    for dropper in &mut state.droppers {
        dropper.tick(dt, &mut state.field, &mut state.rng);
    }
    for crosser in &mut state.crossers {
        crosser.tick(dt, &mut state.field);
    }
    for saucer in &mut state.saucers {
        saucer.tick(dt, &mut state.field);
    }
}

fn update_spawn_timers(state: &mut GameState, dt: f32, tuning: &LevelTuning) {
    state.flyer_timer -= dt;
    if state.flyer_timer <= 0.0 {
        let level = state.board.level;
        state.flyers.push(Flyer::spawn(level, &mut state.rng));
        state.flyer_timer = state
            .rng
            .range_f32(tuning.flyer_window.0, tuning.flyer_window.1);
    }

    // Droppers replenish the player-zone cover; checked on a fixed cadence.
    state.dropper_timer -= dt;
    if state.dropper_timer <= 0.0 {
        state.dropper_timer = DROPPER_SPAWN_COOLDOWN;
        let zone_count = state.field.count_in_row_range(ROWS - PLAYER_ROWS, ROWS - 1);
        if zone_count < PLAYER_ZONE_MIN_OBSTACLES {
            let dropper = Dropper::spawn(&mut state.rng);
            state.droppers.push(dropper);
        }
    }

    state.crosser_timer -= dt;
    if state.crosser_timer <= 0.0 {
        let crosser = Crosser::spawn(&mut state.rng);
        state.crossers.push(crosser);
        state.crosser_timer = state
            .rng
            .range_f32(tuning.crosser_window.0, tuning.crosser_window.1);
    }

    state.saucer_timer -= dt;
    if state.saucer_timer <= 0.0 {
        let saucer = Saucer::spawn(&mut state.rng);
        state.saucers.push(saucer);
        state.saucer_timer = state.rng.range_f32(SAUCER_SPAWN_MIN, SAUCER_SPAWN_MAX);
    }

    state.coin_timer -= dt;
    if state.coin_timer <= 0.0 {
        let col = state.rng.range_i32(0, COLS);
        let pos = Vec2::new(cell_center(col, 0).x, -CELL);
        state.spawn_coin(pos);
        state.coin_timer = state.rng.range_f32(COIN_SPAWN_MIN, COIN_SPAWN_MAX);
    }

    state.touchdown_bonus_timer = (state.touchdown_bonus_timer - dt).max(0.0);
}

fn update_transients(state: &mut GameState, dt: f32) {
    for falling in &mut state.falling {
        if !falling.active {
            continue;
        }
        falling.vel_y = (falling.vel_y + FALLING_GRAVITY * dt).min(FALLING_OBSTACLE_SPEED);
        falling.pos.y += falling.vel_y * dt;

        // Replants as a plain obstacle once it reaches the bottom row.
        if falling.pos.y >= FIELD_H - CELL / 2.0 {
            let (col, _) = cell_of(falling.pos);
            if !state.field.is_occupied(col, ROWS - 1) {
                let mut obstacle = Obstacle::new();
                obstacle.poisoned = falling.poisoned;
                state.field.set(col, ROWS - 1, Some(obstacle));
            }
            falling.active = false;
        }
    }

    for shot in &mut state.reflected {
        if shot.active {
            shot.pos.y += BULLET_SPEED * REFLECTED_SPEED_MULT * dt;
            if shot.pos.y > FIELD_H + CELL {
                shot.active = false;
            }
        }
    }

    for coin in &mut state.coins {
        if coin.active {
            coin.pos.y += COIN_FALL_SPEED * dt;
            if coin.pos.y > FIELD_H + CELL {
                coin.active = false;
            }
        }
    }

    for pickup in &mut state.pickups {
        if pickup.active {
            pickup.pos.y += PICKUP_FALL_SPEED * dt;
            if pickup.pos.y > FIELD_H + CELL {
                pickup.active = false;
            }
        }
    }
}

/// Score a flyer kill by its distance to the player; closer is worth more.
fn flyer_score(flyer_pos: Vec2, player_pos: Vec2) -> u32 {
    let distance = flyer_pos.distance(player_pos);
    if distance < 4.0 * CELL {
        SCORE_FLYER_NEAR
    } else if distance < 8.0 * CELL {
        SCORE_FLYER_MED
    } else {
        SCORE_FLYER_FAR
    }
}

/// Roll the kill drops for a destroyed roaming enemy.
fn roll_drops(state: &mut GameState, pos: Vec2) {
    if state.rng.chance(POWERUP_DROP_CHANCE) {
        let kind = match state.rng.range_i32(0, 6) {
            0 => PowerUp::RapidFire,
            1 => PowerUp::PassThrough,
            2 => PowerUp::Shield,
            3 => PowerUp::Lock,
            4 => PowerUp::FieldSweep,
            _ => PowerUp::ExtraLife,
        };
        state.spawn_pickup(pos, kind);
    } else if state.rng.chance(COIN_DROP_CHANCE) {
        state.spawn_coin(pos);
    }
}

fn resolve_bullets(state: &mut GameState, tuning: &LevelTuning) {
    for i in 0..BULLET_POOL {
        let bullet = state.player.bullets[i];
        if !bullet.active {
            continue;
        }
        let consumed = if bullet.mega {
            resolve_mega(state, bullet.pos, tuning)
        } else {
            resolve_regular(state, bullet.pos, tuning)
        };
        if consumed {
            state.player.bullets[i].active = false;
        }
    }
}

/// Regular bullet resolution in fixed priority order; the first match
/// consumes the bullet.
fn resolve_regular(state: &mut GameState, pos: Vec2, tuning: &LevelTuning) -> bool {
    // (1) Field obstacle at the bullet's cell.
    let (col, row) = cell_of(pos);
    if let Some(obstacle) = state.field.get_mut(col, row) {
        if obstacle.reflective {
            let origin = cell_center(col, row);
            state.spawn_reflected(origin);
            return true;
        }
        if obstacle.rainbow {
            obstacle.rainbow = false;
            state.board.activate_rainbow();
            state.board.add(SCORE_RAINBOW, ScoreEvent::Normal);
            return true;
        }
        obstacle.hp -= 1;
        let destroyed = obstacle.hp <= 0;
        let poisoned = obstacle.poisoned;
        state.board.add(
            if poisoned {
                SCORE_POISON_HIT
            } else {
                SCORE_OBSTACLE_HIT
            },
            ScoreEvent::Normal,
        );
        if destroyed {
            state.field.set(col, row, None);
            state.board.obstacles_lost += 1;
            state.board.add(SCORE_OBSTACLE_CLEAR, ScoreEvent::Normal);
            if state.rng.chance(tuning.falling_chance) {
                state.spawn_falling(cell_center(col, row), poisoned);
            }
        }
        return true;
    }

    // (2) Falling obstacles (juggling).
    for j in 0..FALLING_POOL {
        let falling = state.falling[j];
        if falling.active && Rect::centered(falling.pos, Vec2::splat(CELL)).contains(pos) {
            juggle(state, j);
            return true;
        }
    }

    // (3) Creature segments.
    if let Some((ci, si)) = find_segment_at(state, pos) {
        destroy_segment(state, ci, si);
        return true;
    }

    // (4) Roaming enemies, kind by kind.
    let player_pos = state.player.pos;
    for j in 0..state.flyers.len() {
        if !state.flyers[j].dead
            && Rect::centered(state.flyers[j].pos, Vec2::splat(CELL)).contains(pos)
        {
            state.flyers[j].dead = true;
            let enemy_pos = state.flyers[j].pos;
            state
                .board
                .add(flyer_score(enemy_pos, player_pos), ScoreEvent::Normal);
            roll_drops(state, enemy_pos);
            return true;
        }
    }
    for j in 0..state.droppers.len() {
        if !state.droppers[j].dead
            && Rect::centered(state.droppers[j].pos, Vec2::splat(CELL)).contains(pos)
        {
            state.droppers[j].dead = true;
            let enemy_pos = state.droppers[j].pos;
            state.board.add(SCORE_DROPPER, ScoreEvent::Normal);
            roll_drops(state, enemy_pos);
            return true;
        }
    }
    for j in 0..state.crossers.len() {
        if !state.crossers[j].dead
            && Rect::centered(state.crossers[j].pos, Vec2::splat(CELL)).contains(pos)
        {
            state.crossers[j].dead = true;
            let enemy_pos = state.crossers[j].pos;
            state.board.add(SCORE_CROSSER, ScoreEvent::Normal);
            roll_drops(state, enemy_pos);
            return true;
        }
    }
    for j in 0..state.saucers.len() {
        if !state.saucers[j].dead
            && Rect::centered(state.saucers[j].pos, Vec2::splat(CELL)).contains(pos)
        {
            state.saucers[j].dead = true;
            let enemy_pos = state.saucers[j].pos;
            let score = saucer_score(state);
            state.board.add(score, ScoreEvent::Normal);
            roll_drops(state, enemy_pos);
            return true;
        }
    }

    false
}

/// Saucer kills are worth a random amount, rounded to a 100-point step.
fn saucer_score(state: &mut GameState) -> u32 {
    let raw = state
        .rng
        .range_i32(SCORE_SAUCER_MIN as i32, SCORE_SAUCER_MAX as i32 + 1);
    (raw as u32 / 100) * 100
}

/// Apply one juggle hit to the falling obstacle in slot `j`.
fn juggle(state: &mut GameState, j: usize) {
    let falling = &mut state.falling[j];
    falling.juggles += 1;
    let base = if falling.poisoned {
        SCORE_FALLING_POISON
    } else {
        SCORE_FALLING
    };
    let bonus = base * JUGGLE_MULTIPLIER.pow(falling.juggles - 1);
    falling.vel_y = -JUGGLE_BOUNCE_SPEED;
    if falling.juggles >= JUGGLE_CAP {
        falling.active = false;
    }
    state.board.add(bonus, ScoreEvent::Bonus);
}

fn find_segment_at(state: &GameState, pos: Vec2) -> Option<(usize, usize)> {
    for (ci, chain) in state.chains.iter().enumerate() {
        for (si, segment) in chain.segments.iter().enumerate() {
            if Rect::cell(segment.col, segment.row).contains(pos) {
                return Some((ci, si));
            }
        }
    }
    None
}

/// Score a segment kill, leave a plain obstacle in its cell and split the
/// chain around the gap.
fn destroy_segment(state: &mut GameState, ci: usize, si: usize) {
    let segment = state.chains[ci].segments[si];
    state.board.add(
        if segment.head { SCORE_HEAD } else { SCORE_SEGMENT },
        ScoreEvent::Normal,
    );
    if !state.field.is_occupied(segment.col, segment.row) {
        state.field.set(segment.col, segment.row, Some(Obstacle::new()));
    }
    let chain = state.chains.remove(ci);
    let parts = chain.split(si);
    state.chains.extend(parts);
}

/// Mega bullet: one area evaluation over every candidate category, always
/// consumed, never propagating further. Triggered on first contact with
/// anything; otherwise the bullet flies on.
fn resolve_mega(state: &mut GameState, pos: Vec2, tuning: &LevelTuning) -> bool {
    let (col, row) = cell_of(pos);
    let touching = state.field.is_occupied(col, row)
        || find_segment_at(state, pos).is_some()
        || state
            .falling
            .iter()
            .any(|f| f.active && Rect::centered(f.pos, Vec2::splat(CELL)).contains(pos))
        || state
            .flyers
            .iter()
            .any(|f| !f.dead && Rect::centered(f.pos, Vec2::splat(CELL)).contains(pos))
        || state
            .droppers
            .iter()
            .any(|d| !d.dead && Rect::centered(d.pos, Vec2::splat(CELL)).contains(pos))
        || state
            .crossers
            .iter()
            .any(|c| !c.dead && Rect::centered(c.pos, Vec2::splat(CELL)).contains(pos))
        || state
            .saucers
            .iter()
            .any(|s| !s.dead && Rect::centered(s.pos, Vec2::splat(CELL)).contains(pos));
    if !touching {
        return false;
    }

    // Obstacles: heavy damage to every cell in the radius.
    let (c0, r0) = cell_of(pos - Vec2::splat(MEGA_RADIUS));
    let (c1, r1) = cell_of(pos + Vec2::splat(MEGA_RADIUS));
    for row in r0..=r1 {
        for col in c0..=c1 {
            if cell_center(col, row).distance_squared(pos) > MEGA_RADIUS * MEGA_RADIUS {
                continue;
            }
            let Some(obstacle) = state.field.get_mut(col, row) else {
                continue;
            };
            // Special-obstacle rules do not apply inside the blast; every
            // cell just takes damage.
            obstacle.hp -= MEGA_DAMAGE;
            let poisoned = obstacle.poisoned;
            if obstacle.hp <= 0 {
                state.field.set(col, row, None);
                state.board.obstacles_lost += 1;
                state.board.add(SCORE_OBSTACLE_CLEAR, ScoreEvent::Normal);
                if state.rng.chance(tuning.falling_chance) {
                    state.spawn_falling(cell_center(col, row), poisoned);
                }
            }
        }
    }

    // Falling obstacles caught in the blast take one juggle hit each.
    for j in 0..FALLING_POOL {
        if state.falling[j].active
            && within_radius(pos, &Rect::centered(state.falling[j].pos, Vec2::splat(CELL)), MEGA_RADIUS)
        {
            juggle(state, j);
        }
    }

    // Segments, rear-most first so indices stay valid across splits.
    loop {
        let mut target = None;
        'outer: for (ci, chain) in state.chains.iter().enumerate() {
            for (si, segment) in chain.segments.iter().enumerate() {
                if within_radius(pos, &Rect::cell(segment.col, segment.row), MEGA_RADIUS) {
                    target = Some((ci, si));
                    break 'outer;
                }
            }
        }
        match target {
            Some((ci, si)) => destroy_segment(state, ci, si),
            None => break,
        }
    }

    let player_pos = state.player.pos;
    for j in 0..state.flyers.len() {
        if !state.flyers[j].dead
            && within_radius(pos, &Rect::centered(state.flyers[j].pos, Vec2::splat(CELL)), MEGA_RADIUS)
        {
            state.flyers[j].dead = true;
            let enemy_pos = state.flyers[j].pos;
            state
                .board
                .add(flyer_score(enemy_pos, player_pos), ScoreEvent::Normal);
            roll_drops(state, enemy_pos);
        }
    }
    for j in 0..state.droppers.len() {
        if !state.droppers[j].dead
            && within_radius(pos, &Rect::centered(state.droppers[j].pos, Vec2::splat(CELL)), MEGA_RADIUS)
        {
            state.droppers[j].dead = true;
            let enemy_pos = state.droppers[j].pos;
            state.board.add(SCORE_DROPPER, ScoreEvent::Normal);
            roll_drops(state, enemy_pos);
        }
    }
    for j in 0..state.crossers.len() {
        if !state.crossers[j].dead
            && within_radius(pos, &Rect::centered(state.crossers[j].pos, Vec2::splat(CELL)), MEGA_RADIUS)
        {
            state.crossers[j].dead = true;
            let enemy_pos = state.crossers[j].pos;
            state.board.add(SCORE_CROSSER, ScoreEvent::Normal);
            roll_drops(state, enemy_pos);
        }
    }
    for j in 0..state.saucers.len() {
        if !state.saucers[j].dead
            && within_radius(pos, &Rect::centered(state.saucers[j].pos, Vec2::splat(CELL)), MEGA_RADIUS)
        {
            state.saucers[j].dead = true;
            let enemy_pos = state.saucers[j].pos;
            let score = saucer_score(state);
            state.board.add(score, ScoreEvent::Normal);
            roll_drops(state, enemy_pos);
        }
    }

    true
}

/// Player-side collisions. At most one life loss per tick; invulnerability
/// absorbs the hit.
fn resolve_player_collisions(state: &mut GameState) {
    let player_rect = Rect::centered(state.player.pos, Vec2::splat(CELL * 0.8));

    let mut hit = false;

    for chain in &state.chains {
        for segment in &chain.segments {
            if Rect::cell(segment.col, segment.row).intersects(&player_rect) {
                hit = true;
            }
        }
    }
    hit |= state
        .flyers
        .iter()
        .any(|f| !f.dead && Rect::centered(f.pos, Vec2::splat(CELL)).intersects(&player_rect));
    hit |= state
        .droppers
        .iter()
        .any(|d| !d.dead && Rect::centered(d.pos, Vec2::splat(CELL)).intersects(&player_rect));
    hit |= state
        .crossers
        .iter()
        .any(|c| !c.dead && Rect::centered(c.pos, Vec2::splat(CELL)).intersects(&player_rect));
    hit |= state
        .saucers
        .iter()
        .any(|s| !s.dead && Rect::centered(s.pos, Vec2::splat(CELL)).intersects(&player_rect));

    // Projectile-class threats are consumed by the contact either way.
    for shot in &mut state.reflected {
        if shot.active && Rect::centered(shot.pos, Vec2::splat(CELL / 2.0)).intersects(&player_rect)
        {
            shot.active = false;
            hit = true;
        }
    }
    for falling in &mut state.falling {
        if falling.active
            && Rect::centered(falling.pos, Vec2::splat(CELL)).intersects(&player_rect)
        {
            falling.active = false;
            hit = true;
        }
    }

    if !hit || state.player.is_invulnerable() {
        return;
    }

    if state.board.lose_life() {
        state.player = Player::respawn(&state.player);
        log::info!("life lost, {} remaining", state.board.lives);
    } else {
        state.game_over = true;
        log::info!("game over at score {}", state.board.score);
    }
}

fn collect_pickups(state: &mut GameState) {
    let player_rect = Rect::centered(state.player.pos, Vec2::splat(CELL));

    for i in 0..COIN_POOL {
        if state.coins[i].active
            && Rect::centered(state.coins[i].pos, Vec2::splat(CELL / 2.0)).intersects(&player_rect)
        {
            state.coins[i].active = false;
            state.board.add(SCORE_COIN, ScoreEvent::Normal);
        }
    }

    for i in 0..PICKUP_POOL {
        if !state.pickups[i].active
            || !Rect::centered(state.pickups[i].pos, Vec2::splat(CELL)).intersects(&player_rect)
        {
            continue;
        }
        state.pickups[i].active = false;
        match state.pickups[i].kind {
            PowerUp::FieldSweep => {
                for row in 0..ROWS {
                    for col in 0..COLS {
                        state.field.set(col, row, None);
                    }
                }
            }
            PowerUp::ExtraLife => state.board.grant_life(),
            kind => state.player.apply(kind),
        }
    }
}

fn compact(state: &mut GameState) {
    state.flyers.retain(|f| !f.dead);
    state.droppers.retain(|d| !d.dead);
    state.crossers.retain(|c| !c.dead);
    state.saucers.retain(|s| !s.dead);
    state.chains.retain(|c| !c.is_empty());
}

/// Consume touchdown signals: spawn a replacement chain at the top unless
/// the live segment count exceeds the cap, and possibly a bonus flyer.
fn handle_touchdowns(state: &mut GameState, tuning: &LevelTuning) {
    let mut touchdowns = 0;
    for chain in &mut state.chains {
        if chain.consume_touchdown() {
            touchdowns += 1;
        }
    }
    for _ in 0..touchdowns {
        if state.total_segments() + TOUCHDOWN_CHAIN_LENGTH <= tuning.touchdown_segment_cap {
            let col = state.rng.range_i32(0, COLS);
            let dir = if state.rng.chance(0.5) { 1 } else { -1 };
            let level = state.board.level;
            state
                .chains
                .push(Chain::new(TOUCHDOWN_CHAIN_LENGTH, col, dir, level));
        }
        if state.touchdown_bonus_timer <= 0.0 {
            let level = state.board.level;
            let flyer = Flyer::spawn(level, &mut state.rng);
            state.flyers.push(flyer);
            state.touchdown_bonus_timer = tuning.touchdown_bonus_cooldown;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::DifficultyMode;

    fn quiet_state(seed: u64) -> GameState {
        let mut state = GameState::new(seed, DifficultyMode::Baseline);
        // Park the spawn timers so tests control the population.
        state.flyer_timer = 1e6;
        state.dropper_timer = 1e6;
        state.crosser_timer = 1e6;
        state.saucer_timer = 1e6;
        state.coin_timer = 1e6;
        state
    }

    #[test]
    fn one_hp_obstacle_destroyed_with_clear_bonus_same_tick() {
        let mut state = quiet_state(1);
        state.chains.clear();
        let (col, row) = (10, 20);
        let mut obstacle = Obstacle::new();
        obstacle.hp = 1;
        state.field.set(col, row, Some(obstacle));

        state.player.bullets[0].active = true;
        state.player.bullets[0].pos = cell_center(col, row) + Vec2::new(0.0, BULLET_SPEED * SIM_DT);

        let before = state.board.score;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(!state.field.is_occupied(col, row));
        assert_eq!(
            state.board.score - before,
            (SCORE_OBSTACLE_HIT + SCORE_OBSTACLE_CLEAR) as u64
        );
        assert!(!state.player.bullets[0].active);
    }

    #[test]
    fn reflective_obstacle_spawns_hostile_shot_without_damage() {
        let mut state = quiet_state(2);
        state.chains.clear();
        let (col, row) = (5, 10);
        let mut obstacle = Obstacle::new();
        obstacle.reflective = true;
        state.field.set(col, row, Some(obstacle));

        state.player.bullets[0].active = true;
        state.player.bullets[0].pos = cell_center(col, row) + Vec2::new(0.0, BULLET_SPEED * SIM_DT);

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.field.get(col, row).map(|o| o.hp), Some(OBSTACLE_MAX_HP));
        assert!(state.reflected.iter().any(|s| s.active));
        assert!(!state.player.bullets[0].active);
    }

    #[test]
    fn segment_kill_leaves_obstacle_and_splits() {
        let mut state = quiet_state(3);
        state.chains.clear();
        state.chains.push(Chain::new(8, 20, 1, 1));
        // Move the chain to a known row clear of the field top.
        for segment in &mut state.chains[0].segments {
            segment.row = 25;
        }
        let target = state.chains[0].segments[3];
        // Remove any seeded obstacles near the chain so it advances freely.
        for col in 0..COLS {
            state.field.set(col, 25, None);
        }

        state.player.bullets[0].active = true;
        state.player.bullets[0].pos =
            cell_center(target.col, target.row) + Vec2::new(0.0, BULLET_SPEED * SIM_DT);

        let before = state.total_segments();
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.total_segments(), before - 1);
        assert_eq!(state.chains.len(), 2);
    }

    #[test]
    fn saucer_kill_scores_a_rounded_random_amount() {
        let mut state = quiet_state(14);
        state.chains.clear();
        let mut saucer = Saucer::spawn(&mut state.rng);
        saucer.pos = Vec2::new(FIELD_W / 2.0, 5.0 * CELL);
        state.saucers.push(saucer);

        // Land the bullet on the saucer after its move this tick.
        let drift = Vec2::new(state.saucers[0].dir as f32 * SAUCER_SPEED_X * SIM_DT, 0.0);
        state.player.bullets[0].active = true;
        state.player.bullets[0].pos =
            state.saucers[0].pos + drift + Vec2::new(0.0, BULLET_SPEED * SIM_DT);

        let before = state.board.score;
        tick(&mut state, &TickInput::default(), SIM_DT);
        let awarded = state.board.score - before;
        assert!((SCORE_SAUCER_MIN as u64..=SCORE_SAUCER_MAX as u64).contains(&awarded));
        assert_eq!(awarded % 100, 0);
        assert!(state.saucers.is_empty(), "dead saucer compacted out");
        assert!(!state.player.bullets[0].active);
    }

    #[test]
    fn chain_destruction_conserves_segments() {
        let mut state = quiet_state(9);
        let before = state.total_segments();
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.total_segments(), before, "no destruction, no change");
    }

    #[test]
    fn player_hit_by_reflected_shot_loses_life() {
        let mut state = quiet_state(4);
        state.chains.clear();
        state.spawn_reflected(
            state.player.pos - Vec2::new(0.0, BULLET_SPEED * REFLECTED_SPEED_MULT * SIM_DT),
        );
        let lives = state.board.lives;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.board.lives, lives - 1);
        assert!(state.reflected.iter().all(|s| !s.active));
    }

    #[test]
    fn shield_absorbs_player_hit() {
        let mut state = quiet_state(5);
        state.chains.clear();
        state.player.apply(PowerUp::Shield);
        state.spawn_reflected(
            state.player.pos - Vec2::new(0.0, BULLET_SPEED * REFLECTED_SPEED_MULT * SIM_DT),
        );
        let lives = state.board.lives;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.board.lives, lives);
    }

    #[test]
    fn hit_at_zero_lives_ends_the_game() {
        let mut state = quiet_state(6);
        state.chains.clear();
        state.board.lives = 0;
        state.spawn_reflected(
            state.player.pos - Vec2::new(0.0, BULLET_SPEED * REFLECTED_SPEED_MULT * SIM_DT),
        );
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.game_over);
    }

    #[test]
    fn clearing_all_chains_advances_level_after_freeze() {
        let mut state = quiet_state(7);
        state.chains.clear();
        let level = state.board.level;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.clear_timer > 0.0);
        for _ in 0..(LEVEL_CLEAR_FREEZE / SIM_DT) as u32 + 2 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.board.level, level + 1);
        assert_eq!(state.chains.len(), 1);
    }

    #[test]
    fn coin_collection_scores() {
        let mut state = quiet_state(8);
        state.chains.clear();
        state.spawn_coin(state.player.pos - Vec2::new(0.0, COIN_FALL_SPEED * SIM_DT));
        let before = state.board.score;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.board.score - before, SCORE_COIN as u64);
    }

    #[test]
    fn juggle_bonus_doubles_each_hit() {
        let mut state = quiet_state(10);
        state.chains.clear();
        state.spawn_falling(Vec2::new(100.0, 100.0), false);

        let mut last = 0;
        for expected in [SCORE_FALLING, SCORE_FALLING * 2, SCORE_FALLING * 4] {
            juggle(&mut state, 0);
            let awarded = state.board.score - last;
            assert_eq!(awarded, expected as u64);
            last = state.board.score;
        }
    }

    #[test]
    fn juggle_cap_destroys_actor() {
        let mut state = quiet_state(11);
        state.spawn_falling(Vec2::new(100.0, 100.0), false);
        for _ in 0..JUGGLE_CAP {
            juggle(&mut state, 0);
        }
        assert!(!state.falling[0].active);
    }

    #[test]
    fn diagonal_input_is_normalized() {
        let input = TickInput::from_flags(false, true, true, false, false);
        assert!((input.move_dir.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn touchdown_spawns_replacement_chain_under_cap() {
        let mut state = quiet_state(12);
        state.chains.clear();
        let mut chain = Chain::new(2, 5, 1, 1);
        chain.segments.iter_mut().for_each(|s| s.row = MAX_ENEMY_ROW - 1);
        chain.mode = crate::sim::creature::ChainMode::Diving;
        state.chains.push(chain);
        let field = state.field.clone();
        state.chains[0].step(&field);
        assert_eq!(state.chains[0].head().map(|h| h.row), Some(0));

        let tuning = tuning::level_tuning(1, DifficultyMode::Baseline);
        let before = state.chains.len();
        handle_touchdowns(&mut state, &tuning);
        assert_eq!(state.chains.len(), before + 1);
        assert!(!state.flyers.is_empty(), "bonus flyer spawned");
    }

    #[test]
    fn touchdown_respects_segment_cap() {
        let mut state = quiet_state(13);
        state.chains.clear();
        let mut chain = Chain::new(42, 20, 1, 1);
        chain.segments.iter_mut().for_each(|s| s.row = 10);
        chain.segments[0].row = MAX_ENEMY_ROW - 1;
        chain.mode = crate::sim::creature::ChainMode::Diving;
        state.chains.push(chain);
        let field = state.field.clone();
        state.chains[0].step(&field);

        let tuning = tuning::level_tuning(1, DifficultyMode::Baseline);
        handle_touchdowns(&mut state, &tuning);
        assert_eq!(state.chains.len(), 1, "cap blocks the replacement chain");
    }
}
