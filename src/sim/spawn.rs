//! Spawn planning: difficulty curves and placement of new enemies and power-ups

use glam::Vec2;
use rand::Rng;

use super::state::{GameEvent, GameState};
use crate::config::Playfield;
use crate::consts::*;

/// Milliseconds between enemy spawns at the given game time.
///
/// Flat until the scaling threshold, then an exponential decay divided by a
/// log term, floored at the minimum interval.
pub fn enemy_spawn_interval(game_secs: u32) -> f64 {
    if game_secs < ENEMY_SCALING_START_SECS {
        return INITIAL_ENEMY_SPAWN_INTERVAL_MS;
    }

    let t = game_secs as f64;
    let time_factor = (t + 1.0).log10();
    let decayed = INITIAL_ENEMY_SPAWN_INTERVAL_MS * (-t / SPAWN_DECAY_SECS).exp();
    (decayed / (1.0 + time_factor)).max(MIN_ENEMY_SPAWN_INTERVAL_MS)
}

/// Number of enemies created per spawn event at the given game time
pub fn enemy_count_per_spawn(game_secs: u32) -> u32 {
    if game_secs < ENEMY_SCALING_START_SECS {
        return 1;
    }

    let additional = ((game_secs as f64 + 1.0).log10() * ENEMY_COUNT_LOG_FACTOR).floor() as u32;
    (1 + additional).min(MAX_ENEMIES_PER_SPAWN)
}

/// Delay before the next power-up, uniform in [min, max)
pub fn next_powerup_delay<R: Rng>(rng: &mut R) -> u64 {
    rng.random_range(POWERUP_SPAWN_MIN_INTERVAL_MS..POWERUP_SPAWN_MAX_INTERVAL_MS)
}

/// Playfield edge an enemy enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Right, Edge::Bottom, Edge::Left];
}

/// Enemy start position just outside `edge`, jittered on both axes
pub fn enemy_spawn_position<R: Rng>(rng: &mut R, edge: Edge, field: &Playfield) -> Vec2 {
    let along_x = rng.random::<f32>() * field.width;
    let along_y = rng.random::<f32>() * field.height;
    let base = match edge {
        Edge::Top => Vec2::new(along_x, -ENEMY_EDGE_OFFSET),
        Edge::Right => Vec2::new(field.width + ENEMY_EDGE_OFFSET, along_y),
        Edge::Bottom => Vec2::new(along_x, field.height + ENEMY_EDGE_OFFSET),
        Edge::Left => Vec2::new(-ENEMY_EDGE_OFFSET, along_y),
    };
    let jitter = Vec2::new(
        (rng.random::<f32>() - 0.5) * ENEMY_SPAWN_JITTER,
        (rng.random::<f32>() - 0.5) * ENEMY_SPAWN_JITTER,
    );
    base + jitter
}

/// Power-up position, uniform inside the padded playfield
pub fn powerup_spawn_position<R: Rng>(rng: &mut R, field: &Playfield) -> Vec2 {
    let pad = POWERUP_SPAWN_PADDING;
    Vec2::new(
        rng.random::<f32>() * (field.width - 2.0 * pad) + pad,
        rng.random::<f32>() * (field.height - 2.0 * pad) + pad,
    )
}

/// Spawn one wave of enemies, all from the same edge
pub fn spawn_enemy_wave(state: &mut GameState) -> u32 {
    let count = enemy_count_per_spawn(state.clock.game_secs());
    let edge = Edge::ALL[state.rng.random_range(0..Edge::ALL.len())];
    for _ in 0..count {
        let pos = enemy_spawn_position(&mut state.rng, edge, &state.playfield);
        state.store.spawn_enemy(pos);
    }
    state.events.push(GameEvent::EnemiesSpawned { count });
    log::debug!(
        "Spawned {} enemies from {:?} at {}s",
        count,
        edge,
        state.clock.game_secs()
    );
    count
}

/// Spawn a single power-up
pub fn spawn_powerup(state: &mut GameState) -> u32 {
    let pos = powerup_spawn_position(&mut state.rng, &state.playfield);
    let id = state.store.spawn_powerup(pos, state.clock.elapsed_ms);
    state.events.push(GameEvent::PowerupSpawned { id });
    log::debug!("Power-up {} at ({:.0}, {:.0})", id, pos.x, pos.y);
    id
}

/// Run both spawn timers for one tick of `dt_ms`
pub fn run(state: &mut GameState, dt_ms: u64) {
    let game_secs = state.clock.game_secs();
    let enemy_waves = state
        .enemy_timer
        .advance(dt_ms, || enemy_spawn_interval(game_secs).ceil() as u64);
    for _ in 0..enemy_waves {
        spawn_enemy_wave(state);
    }

    let rng = &mut state.rng;
    let powerup_spawns = state.powerup_timer.advance(dt_ms, || next_powerup_delay(rng));
    for _ in 0..powerup_spawns {
        spawn_powerup(state);
    }
}
