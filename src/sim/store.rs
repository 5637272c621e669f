//! Entity storage
//!
//! One vector per entity type, kept in insertion order. Ids come from a single
//! counter so no two entities ever share one.

use glam::Vec2;

use super::state::{Bullet, Enemy, Explosion, Player, Powerup};

/// An enemy removed by a kill, with the explosion that replaced it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kill {
    pub enemy_id: u32,
    pub explosion_id: u32,
    pub pos: Vec2,
}

/// Owns the player and every live entity collection
#[derive(Debug, Clone)]
pub struct EntityStore {
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub powerups: Vec<Powerup>,
    pub explosions: Vec<Explosion>,
    /// Next entity ID
    next_id: u32,
}

impl EntityStore {
    pub fn new(player_pos: Vec2) -> Self {
        Self {
            player: Player::new(player_pos),
            enemies: Vec::new(),
            bullets: Vec::new(),
            powerups: Vec::new(),
            explosions: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn spawn_enemy(&mut self, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        self.enemies.push(Enemy { id, pos });
        id
    }

    /// Add a bullet unless `max_bullets` are already in flight
    pub fn spawn_bullet(&mut self, pos: Vec2, vel: Vec2, now_ms: u64, max_bullets: usize) -> Option<u32> {
        if self.bullets.len() >= max_bullets {
            return None;
        }
        let id = self.next_entity_id();
        self.bullets.push(Bullet {
            id,
            pos,
            vel,
            created_ms: now_ms,
        });
        Some(id)
    }

    pub fn spawn_powerup(&mut self, pos: Vec2, now_ms: u64) -> u32 {
        let id = self.next_entity_id();
        self.powerups.push(Powerup {
            id,
            pos,
            spawned_ms: now_ms,
        });
        id
    }

    pub fn spawn_explosion(&mut self, pos: Vec2, now_ms: u64) -> u32 {
        let id = self.next_entity_id();
        self.explosions.push(Explosion {
            id,
            pos,
            created_ms: now_ms,
        });
        id
    }

    /// Remove every enemy matching `doomed`, leaving an explosion where each one stood.
    ///
    /// New explosions are appended after the predicate has seen every enemy, so
    /// they only affect collision checks from the next tick on.
    pub fn kill_enemies_where(&mut self, now_ms: u64, mut doomed: impl FnMut(&Enemy) -> bool) -> Vec<Kill> {
        let mut killed = Vec::new();
        self.enemies.retain(|enemy| {
            if doomed(enemy) {
                killed.push((enemy.id, enemy.pos));
                false
            } else {
                true
            }
        });

        killed
            .into_iter()
            .map(|(enemy_id, pos)| Kill {
                enemy_id,
                explosion_id: self.spawn_explosion(pos, now_ms),
                pos,
            })
            .collect()
    }

    /// Remove the first power-up matching `pred`
    pub fn take_powerup_where(&mut self, pred: impl Fn(&Powerup) -> bool) -> Option<Powerup> {
        let idx = self.powerups.iter().position(pred)?;
        Some(self.powerups.remove(idx))
    }
}
