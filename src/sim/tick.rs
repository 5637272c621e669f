//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. Within a tick the
//! order is fixed: spawn timers, buff expiry, player movement, auto-fire,
//! bullets, enemies, kills, explosion expiry, player hit, power-up pickup.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{any_within, pursue, within};
use super::spawn;
use super::state::{GameEvent, GameState};
use crate::consts::*;

/// Directional input already decoded by the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveInput {
    /// Per-axis direction in screen coordinates (y grows downward).
    /// Opposite keys cancel out; diagonals are not normalized.
    pub fn direction(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down))
    }
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub movement: MoveInput,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the game state by one fixed timestep of `dt_ms`
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: u64) {
    if input.pause {
        state.toggle_pause();
    }

    // Don't tick if paused or game over
    if !state.is_running() {
        return;
    }

    state.clock.advance(dt_ms);

    spawn::run(state, dt_ms);
    expire_buffs(state, dt_ms);
    move_player(state, input.movement);
    drop_malformed(state);

    auto_fire(state);
    advance_bullets(state);
    advance_enemies(state);
    resolve_kills(state);
    prune_explosions(state);

    if player_hit(state) {
        state.game_over();
        return;
    }

    collect_powerups(state);
    state.store.player.powered_up = state.effects.powered_up;
}

fn expire_buffs(state: &mut GameState, dt_ms: u64) {
    for handle in state.effects.advance(dt_ms) {
        state.events.push(GameEvent::BuffExpired(handle));
        log::debug!(
            "Buff {:?} expired, fire rate now {:.2}",
            handle,
            state.effects.fire_rate
        );
    }
    state.store.player.powered_up = state.effects.powered_up;
}

fn move_player(state: &mut GameState, movement: MoveInput) {
    let player = &mut state.store.player;
    if !player.pos.is_finite() {
        log::warn!("Player position {:?} is not finite, recentering", player.pos);
        player.pos = state.playfield.center();
    }

    let dir = movement.direction();
    if dir != Vec2::ZERO {
        player.facing = dir;
    }
    player.pos = crate::clamp_to_bounds(
        player.pos + dir * PLAYER_SPEED,
        state.playfield.width,
        state.playfield.height,
        PLAYER_PADDING,
    );
}

/// Drop bullets and power-ups whose position is not finite rather than let
/// them poison distance checks. Enemies are never dropped here: a malformed
/// enemy is skipped by movement and collision until it is fixed or the run ends.
fn drop_malformed(state: &mut GameState) {
    let store = &mut state.store;
    let before = store.bullets.len() + store.powerups.len();
    store.bullets.retain(|b| b.pos.is_finite() && b.vel.is_finite());
    store.powerups.retain(|p| p.pos.is_finite());
    let dropped = before - (store.bullets.len() + store.powerups.len());
    if dropped > 0 {
        log::warn!("Dropped {} bullets/power-ups with non-finite positions", dropped);
    }

    let skipped = store.enemies.iter().filter(|e| !e.pos.is_finite()).count();
    if skipped > 0 {
        log::warn!("Skipping {} enemies with non-finite positions", skipped);
    }
}

fn auto_fire(state: &mut GameState) {
    let now = state.clock.elapsed_ms;
    let ready = state
        .last_fire_ms
        .is_none_or(|last| (now - last) as f32 >= state.effects.fire_cooldown_ms());
    if !ready {
        return;
    }

    // The shot is spent even when the bullet cap refuses it
    state.last_fire_ms = Some(now);
    let player = &state.store.player;
    let vel = crate::fire_direction(player.facing) * BULLET_SPEED;
    let pos = player.pos;
    if let Some(id) = state.store.spawn_bullet(pos, vel, now, MAX_BULLETS) {
        state.events.push(GameEvent::BulletFired { id });
    }
}

fn advance_bullets(state: &mut GameState) {
    let now = state.clock.elapsed_ms;
    let field = state.playfield;
    state.store.bullets.retain_mut(|bullet| {
        bullet.pos += bullet.vel;
        field.contains(bullet.pos) && now - bullet.created_ms < BULLET_MAX_AGE_MS
    });
}

fn advance_enemies(state: &mut GameState) {
    let target = state.store.player.pos;
    for enemy in state.store.enemies.iter_mut().filter(|e| e.pos.is_finite()) {
        enemy.pos = pursue(enemy.pos, target, ENEMY_SPEED);
    }
}

/// Kill every enemy touching a bullet or inside a live explosion.
/// Bullets are not consumed, so one bullet can take out several enemies.
fn resolve_kills(state: &mut GameState) {
    let now = state.clock.elapsed_ms;
    let radius = state.effects.explosion_radius;
    let bullets: Vec<Vec2> = state.store.bullets.iter().map(|b| b.pos).collect();
    let explosions: Vec<Vec2> = state.store.explosions.iter().map(|e| e.pos).collect();

    let kills = state.store.kill_enemies_where(now, |enemy| {
        enemy.pos.is_finite()
            && (any_within(enemy.pos, &bullets, HIT_RADIUS)
                || any_within(enemy.pos, &explosions, radius))
    });

    for kill in kills {
        state.kills += 1;
        state.events.push(GameEvent::EnemyKilled {
            id: kill.enemy_id,
            pos: kill.pos,
        });
    }
}

fn prune_explosions(state: &mut GameState) {
    let now = state.clock.elapsed_ms;
    state
        .store
        .explosions
        .retain(|e| now - e.created_ms < EXPLOSION_LIFETIME_MS);
}

/// Uses post-movement positions of the enemies that survived this tick
fn player_hit(state: &GameState) -> bool {
    let player = state.store.player.pos;
    state
        .store
        .enemies
        .iter()
        .any(|e| e.pos.is_finite() && within(e.pos, player, HIT_RADIUS))
}

fn collect_powerups(state: &mut GameState) {
    let player = state.store.player.pos;
    while let Some(powerup) = state
        .store
        .take_powerup_where(|p| within(p.pos, player, PICKUP_RADIUS))
    {
        state.powerups_collected += 1;
        let handle = state.effects.apply_pickup();
        state.events.push(GameEvent::PowerupCollected {
            id: powerup.id,
            buff: handle,
        });
        log::debug!(
            "Power-up {} collected ({:?}), fire rate {:.2}",
            powerup.id,
            handle,
            state.effects.fire_rate
        );
    }

    let now = state.clock.elapsed_ms;
    state
        .store
        .powerups
        .retain(|p| now - p.spawned_ms <= POWERUP_VISIBLE_MS);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Playfield;
    use crate::sim::state::{GamePhase, SessionStats};
    use proptest::prelude::*;

    fn field() -> Playfield {
        Playfield {
            width: 800.0,
            height: 600.0,
        }
    }

    /// State with spawn timers off so tests control every entity
    fn quiet_state(player: Vec2) -> GameState {
        let mut state = GameState::new(12345, field(), player);
        state.enemy_timer.cancel();
        state.powerup_timer.cancel();
        state
    }

    fn run(state: &mut GameState, ticks: u32) {
        let input = TickInput::default();
        for _ in 0..ticks {
            tick(state, &input, TICK_MS);
        }
    }

    #[test]
    fn test_move_input_direction() {
        let up_left = MoveInput {
            up: true,
            left: true,
            ..Default::default()
        };
        assert_eq!(up_left.direction(), Vec2::new(-1.0, -1.0));
        let opposed = MoveInput {
            up: true,
            down: true,
            ..Default::default()
        };
        assert_eq!(opposed.direction(), Vec2::ZERO);
    }

    #[test]
    fn test_player_moves_and_faces() {
        let mut state = quiet_state(Vec2::new(400.0, 300.0));
        let input = TickInput {
            movement: MoveInput {
                right: true,
                ..Default::default()
            },
            ..Default::default()
        };
        tick(&mut state, &input, TICK_MS);
        assert_eq!(state.store.player.pos, Vec2::new(405.0, 300.0));
        assert_eq!(state.store.player.facing, Vec2::new(1.0, 0.0));

        // Releasing keys keeps the last facing
        run(&mut state, 1);
        assert_eq!(state.store.player.facing, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_first_shot_goes_up_then_opposite_to_movement() {
        let mut state = quiet_state(Vec2::new(400.0, 300.0));
        run(&mut state, 1);
        assert_eq!(state.store.bullets.len(), 1);
        assert_eq!(state.store.bullets[0].vel, Vec2::new(0.0, -BULLET_SPEED));

        let input = TickInput {
            movement: MoveInput {
                right: true,
                ..Default::default()
            },
            ..Default::default()
        };
        // Wait out the cooldown while moving right
        for _ in 0..25 {
            tick(&mut state, &input, TICK_MS);
        }
        let last = state.store.bullets.last().unwrap();
        assert_eq!(last.vel, Vec2::new(-BULLET_SPEED, 0.0));
    }

    #[test]
    fn test_fire_rate_cooldown() {
        let mut state = quiet_state(Vec2::new(400.0, 300.0));
        // 333ms cooldown at 3 shots/s: shots at 16ms and 352ms
        run(&mut state, 21);
        assert_eq!(state.store.bullets.len(), 1);
        run(&mut state, 1);
        assert_eq!(state.store.bullets.len(), 2);
    }

    #[test]
    fn test_bullets_leave_playfield() {
        let mut state = quiet_state(Vec2::new(400.0, 30.0));
        run(&mut state, 6);
        assert_eq!(state.store.bullets.len(), 1);
        assert_eq!(state.store.bullets[0].pos.y, 0.0);
        run(&mut state, 1);
        assert!(state.store.bullets.is_empty());
    }

    #[test]
    fn test_bullets_expire_with_age() {
        let mut state = quiet_state(Vec2::new(400.0, 300.0));
        let id = state
            .store
            .spawn_bullet(Vec2::new(100.0, 100.0), Vec2::ZERO, 0, MAX_BULLETS)
            .unwrap();
        // Age reaches 4992ms after 312 ticks, 5008ms after 313
        run(&mut state, 312);
        assert!(state.store.bullets.iter().any(|b| b.id == id));
        run(&mut state, 1);
        assert!(!state.store.bullets.iter().any(|b| b.id == id));
    }

    #[test]
    fn test_enemy_moves_strictly_closer() {
        let player = Vec2::new(100.0, 100.0);
        let mut state = quiet_state(player);
        state.store.spawn_enemy(Vec2::new(300.0, 100.0));
        let before = state.store.enemies[0].pos.distance(player);
        run(&mut state, 1);
        let after = state.store.enemies[0].pos.distance(player);
        assert!(after < before);
        assert!((before - after - ENEMY_SPEED).abs() < 1e-4);
    }

    #[test]
    fn test_bullet_kill_spawns_explosion_and_keeps_bullet() {
        let mut state = quiet_state(Vec2::new(400.0, 300.0));
        let enemy = state.store.spawn_enemy(Vec2::new(400.0, 280.0));
        run(&mut state, 1);

        assert!(state.store.enemies.is_empty());
        assert_eq!(state.kills, 1);
        assert_eq!(state.store.explosions.len(), 1);
        assert_eq!(state.store.explosions[0].pos, Vec2::new(400.0, 282.0));
        assert_eq!(state.store.bullets.len(), 1);
        assert_eq!(state.phase, GamePhase::Running);
        assert!(state.drain_events().contains(&GameEvent::EnemyKilled {
            id: enemy,
            pos: Vec2::new(400.0, 282.0)
        }));
    }

    #[test]
    fn test_explosion_chains_on_next_tick() {
        let mut state = quiet_state(Vec2::new(400.0, 300.0));
        state.store.spawn_enemy(Vec2::new(400.0, 280.0));
        state.store.spawn_enemy(Vec2::new(440.0, 282.0));

        run(&mut state, 1);
        assert_eq!(state.kills, 1);
        assert_eq!(state.store.enemies.len(), 1);

        run(&mut state, 1);
        assert_eq!(state.kills, 2);
        assert!(state.store.enemies.is_empty());
        assert_eq!(state.store.explosions.len(), 2);
    }

    #[test]
    fn test_explosion_lifetime() {
        let mut state = quiet_state(Vec2::new(400.0, 300.0));
        state.store.spawn_enemy(Vec2::new(400.0, 280.0));
        run(&mut state, 1);
        assert_eq!(state.store.explosions.len(), 1);
        // Created at 16ms; still alive at 512ms, gone at 528ms
        run(&mut state, 31);
        assert_eq!(state.store.explosions.len(), 1);
        run(&mut state, 1);
        assert!(state.store.explosions.is_empty());
    }

    #[test]
    fn test_enemy_contact_ends_game_with_current_stats() {
        let mut state = quiet_state(Vec2::new(400.0, 300.0));
        state.kills = 2;
        state.powerups_collected = 1;
        // Hold fire so the enemy is not shot first
        state.last_fire_ms = Some(0);
        state.store.spawn_enemy(Vec2::new(410.0, 300.0));

        run(&mut state, 1);
        assert_eq!(state.phase, GamePhase::GameOver);
        let expected = SessionStats {
            time: 0,
            kills: 2,
            powerups: 1,
        };
        assert!(state.drain_events().contains(&GameEvent::GameOver(expected)));

        // Terminal: further ticks change nothing
        let clock = state.clock;
        run(&mut state, 10);
        assert_eq!(state.clock, clock);
    }

    #[test]
    fn test_coincident_enemy_does_not_produce_nan() {
        let mut state = quiet_state(Vec2::new(400.0, 300.0));
        state.last_fire_ms = Some(0);
        state.store.spawn_enemy(Vec2::new(400.0, 300.0));
        run(&mut state, 1);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.store.enemies[0].pos.is_finite());
    }

    #[test]
    fn test_non_finite_enemy_is_skipped() {
        let mut state = quiet_state(Vec2::new(400.0, 300.0));
        let bad = state.store.spawn_enemy(Vec2::new(f32::NAN, 10.0));
        let ok = state.store.spawn_enemy(Vec2::new(700.0, 500.0));
        run(&mut state, 3);
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.kills, 0);

        // Skipped, not removed: only collisions shrink the population
        let ids: Vec<u32> = state.store.enemies.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![bad, ok]);
        assert!(state.store.enemies[1].pos.x < 700.0);

        // Once its position is sane again it pursues and can be shot
        state.store.enemies[0].pos = Vec2::new(400.0, 280.0);
        state.last_fire_ms = None;
        run(&mut state, 1);
        assert_eq!(state.kills, 1);
        assert!(!state.store.enemies.iter().any(|e| e.id == bad));
    }

    #[test]
    fn test_non_finite_bullets_and_powerups_are_dropped() {
        let mut state = quiet_state(Vec2::new(400.0, 300.0));
        state.last_fire_ms = Some(0);
        state
            .store
            .spawn_bullet(Vec2::new(f32::INFINITY, 5.0), Vec2::ZERO, 0, MAX_BULLETS);
        state.store.spawn_powerup(Vec2::new(f32::NAN, 5.0), 0);
        run(&mut state, 1);
        assert!(state.store.bullets.is_empty());
        assert!(state.store.powerups.is_empty());
        assert_eq!(state.powerups_collected, 0);
    }

    #[test]
    fn test_explosion_uses_current_radius() {
        // 62 units: outside the base radius, inside the boosted one
        let setup = |buffed: bool| {
            let mut state = quiet_state(Vec2::new(700.0, 500.0));
            state.last_fire_ms = Some(0);
            if buffed {
                state.effects.apply_pickup();
            }
            state.store.spawn_explosion(Vec2::new(100.0, 100.0), 0);
            state.store.spawn_enemy(Vec2::new(162.0, 100.0));
            state
        };

        let mut plain = setup(false);
        run(&mut plain, 2);
        assert_eq!(plain.kills, 0);
        assert_eq!(plain.store.enemies.len(), 1);
        assert_eq!(plain.store.explosions.len(), 1);

        let mut buffed = setup(true);
        run(&mut buffed, 2);
        assert_eq!(buffed.kills, 1);
        assert!(buffed.store.enemies.is_empty());
        assert_eq!(buffed.store.explosions.len(), 2);
    }

    #[test]
    fn test_capped_shot_still_restarts_cooldown() {
        let mut state = quiet_state(Vec2::new(400.0, 300.0));
        for _ in 0..MAX_BULLETS {
            state
                .store
                .spawn_bullet(Vec2::new(100.0, 100.0), Vec2::ZERO, 0, MAX_BULLETS);
        }
        run(&mut state, 1);
        assert_eq!(state.last_fire_ms, Some(TICK_MS));
        assert_eq!(state.store.bullets.len(), MAX_BULLETS);
        assert!(
            !state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::BulletFired { .. }))
        );

        // Next ready shot is a full cooldown later, and still refused
        run(&mut state, 20);
        assert_eq!(state.last_fire_ms, Some(TICK_MS));
        run(&mut state, 1);
        assert_eq!(state.last_fire_ms, Some(22 * TICK_MS));
        assert_eq!(state.store.bullets.len(), MAX_BULLETS);
    }

    #[test]
    fn test_buff_events_carry_handles() {
        let player = Vec2::new(400.0, 300.0);
        let mut state = quiet_state(player);
        let id = state.store.spawn_powerup(player, 0);
        run(&mut state, 1);
        let buff = state.events.iter().find_map(|e| match e {
            GameEvent::PowerupCollected { id: got, buff } if *got == id => Some(*buff),
            _ => None,
        });
        let buff = buff.unwrap();
        assert_eq!(state.effects.active[0].handle, buff);

        state.drain_events();
        run(&mut state, 625);
        assert!(state.drain_events().contains(&GameEvent::BuffExpired(buff)));
    }

    #[test]
    fn test_powerup_pickup_and_revert_after_duration() {
        let player = Vec2::new(400.0, 300.0);
        let mut state = quiet_state(player);
        state.store.spawn_powerup(player + Vec2::new(25.0, 0.0), 0);

        run(&mut state, 1);
        assert_eq!(state.powerups_collected, 1);
        assert!(state.store.powerups.is_empty());
        assert!(state.store.player.powered_up);
        assert!((state.effects.fire_rate - 7.5).abs() < 1e-4);
        assert_eq!(state.effects.explosion_radius, 75.0);

        // Picked up at 16ms, reverts at 10016ms
        run(&mut state, 624);
        assert!(state.effects.powered_up);
        run(&mut state, 1);
        assert_eq!(state.effects.fire_rate, BASE_FIRE_RATE);
        assert_eq!(state.effects.explosion_radius, BASE_EXPLOSION_RADIUS);
        assert!(!state.store.player.powered_up);
    }

    #[test]
    fn test_overlapping_pickups_each_revert() {
        let player = Vec2::new(400.0, 300.0);
        let mut state = quiet_state(player);
        state.store.spawn_powerup(player, 0);
        run(&mut state, 1);

        run(&mut state, 99);
        let now = state.clock.elapsed_ms;
        state.store.spawn_powerup(player, now);
        run(&mut state, 1);
        assert_eq!(state.powerups_collected, 2);
        assert!((state.effects.fire_rate - 18.75).abs() < 1e-3);

        // First pickup (16ms) reverts at 10016ms, second (1616ms) at 11616ms
        run(&mut state, 525);
        assert!((state.effects.fire_rate - 7.5).abs() < 1e-3);
        assert!(state.effects.powered_up);
        run(&mut state, 99);
        assert!((state.effects.fire_rate - 7.5).abs() < 1e-3);
        run(&mut state, 1);
        assert_eq!(state.effects.fire_rate, BASE_FIRE_RATE);
        assert!(!state.effects.powered_up);
    }

    #[test]
    fn test_unclaimed_powerup_times_out() {
        let mut state = quiet_state(Vec2::new(400.0, 300.0));
        state.store.spawn_powerup(Vec2::new(100.0, 100.0), 0);
        // Visible through 10000ms, gone at 10016ms
        run(&mut state, 625);
        assert_eq!(state.store.powerups.len(), 1);
        run(&mut state, 1);
        assert!(state.store.powerups.is_empty());
        assert_eq!(state.powerups_collected, 0);
    }

    #[test]
    fn test_pause_freezes_time() {
        let mut state = GameState::new(1, field(), Vec2::new(400.0, 300.0));
        run(&mut state, 10);
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, TICK_MS);
        assert_eq!(state.phase, GamePhase::Paused);
        let clock = state.clock;
        let enemy_remaining = state.enemy_timer.remaining_ms();
        run(&mut state, 300);
        assert_eq!(state.clock, clock);
        assert_eq!(state.enemy_timer.remaining_ms(), enemy_remaining);

        tick(&mut state, &pause, TICK_MS);
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.clock.elapsed_ms, clock.elapsed_ms + TICK_MS);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = GameState::new(99999, field(), Vec2::new(400.0, 300.0));
        let mut state2 = GameState::new(99999, field(), Vec2::new(400.0, 300.0));
        let input = TickInput {
            movement: MoveInput {
                left: true,
                ..Default::default()
            },
            ..Default::default()
        };
        for _ in 0..400 {
            tick(&mut state1, &input, TICK_MS);
            tick(&mut state2, &input, TICK_MS);
        }
        assert_eq!(state1.stats(), state2.stats());
        assert_eq!(state1.store.enemies.len(), state2.store.enemies.len());
        for (a, b) in state1.store.enemies.iter().zip(&state2.store.enemies) {
            assert_eq!(a.pos, b.pos);
        }
    }

    fn decode(bits: u8) -> TickInput {
        TickInput {
            movement: MoveInput {
                up: bits & 1 != 0,
                down: bits & 2 != 0,
                left: bits & 4 != 0,
                right: bits & 8 != 0,
            },
            pause: false,
        }
    }

    proptest! {
        #[test]
        fn prop_player_stays_in_bounds(
            seed in any::<u64>(),
            moves in proptest::collection::vec(0u8..16, 1..400),
        ) {
            let mut state = GameState::new(seed, field(), Vec2::new(400.0, 300.0));
            for bits in moves {
                tick(&mut state, &decode(bits), TICK_MS);
                let p = state.store.player.pos;
                prop_assert!(p.x >= PLAYER_PADDING && p.x <= 800.0 - PLAYER_PADDING);
                prop_assert!(p.y >= PLAYER_PADDING && p.y <= 600.0 - PLAYER_PADDING);
            }
        }

        #[test]
        fn prop_bullets_never_exceed_cap(
            pickups in 0u32..6,
            moves in proptest::collection::vec(0u8..16, 1..500),
        ) {
            let mut state = quiet_state(Vec2::new(400.0, 300.0));
            for _ in 0..pickups {
                state.effects.apply_pickup();
            }
            for bits in moves {
                tick(&mut state, &decode(bits), TICK_MS);
                prop_assert!(state.store.bullets.len() <= MAX_BULLETS);
            }
        }
    }
}
