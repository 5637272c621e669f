//! Game state and core simulation types
//!
//! The session owns exactly one `GameState`; every timer and tick mutates it
//! through its methods.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::{RepeatingTimer, SimClock};
use super::effects::{BuffHandle, PowerupEffects};
use super::store::EntityStore;
use crate::config::Playfield;
use crate::consts::*;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Running,
    /// Game is paused; no simulated time passes
    Paused,
    /// Run ended (terminal)
    GameOver,
}

/// The player entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Last non-zero movement direction (zero until the player first moves)
    pub facing: Vec2,
    pub powered_up: bool,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            facing: Vec2::ZERO,
            powered_up: false,
        }
    }
}

/// A homing enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
}

/// A bullet fired by the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
    /// Displacement per tick
    pub vel: Vec2,
    pub created_ms: u64,
}

/// A collectible power-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Powerup {
    pub id: u32,
    pub pos: Vec2,
    pub spawned_ms: u64,
}

/// A short-lived explosion left behind by a killed enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub id: u32,
    pub pos: Vec2,
    pub created_ms: u64,
}

/// Final or running tally of a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Survival time in whole seconds
    pub time: u32,
    pub kills: u32,
    pub powerups: u32,
}

/// Things that happened during a tick, drained by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EnemiesSpawned { count: u32 },
    PowerupSpawned { id: u32 },
    BulletFired { id: u32 },
    EnemyKilled { id: u32, pos: Vec2 },
    /// `buff` identifies the revert scheduled for this pickup
    PowerupCollected { id: u32, buff: BuffHandle },
    BuffExpired(BuffHandle),
    Paused,
    Resumed,
    GameOver(SessionStats),
}

/// Complete simulation state for one session
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub playfield: Playfield,
    pub clock: SimClock,
    pub store: EntityStore,
    pub effects: PowerupEffects,
    pub enemy_timer: RepeatingTimer,
    pub powerup_timer: RepeatingTimer,
    pub kills: u32,
    pub powerups_collected: u32,
    /// Simulated time of the last shot (None until the first one)
    pub last_fire_ms: Option<u64>,
    /// Events since the host last drained them
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a running session with the player at `player_pos`
    pub fn new(seed: u64, playfield: Playfield, player_pos: Vec2) -> Self {
        let player_pos = crate::clamp_to_bounds(
            player_pos,
            playfield.width,
            playfield.height,
            PLAYER_PADDING,
        );
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Running,
            playfield,
            clock: SimClock::default(),
            store: EntityStore::new(player_pos),
            effects: PowerupEffects::default(),
            enemy_timer: RepeatingTimer::new(INITIAL_ENEMY_SPAWN_INTERVAL_MS as u64),
            powerup_timer: RepeatingTimer::new(POWERUP_SPAWN_MIN_INTERVAL_MS),
            kills: 0,
            powerups_collected: 0,
            last_fire_ms: None,
            events: Vec::new(),
        }
    }

    /// Current tally
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            time: self.clock.game_secs(),
            kills: self.kills,
            powerups: self.powerups_collected,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    /// Flip between Running and Paused. Has no effect once the game is over.
    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Running => {
                self.phase = GamePhase::Paused;
                self.events.push(GameEvent::Paused);
                log::info!("Paused at {}s", self.clock.game_secs());
            }
            GamePhase::Paused => {
                self.phase = GamePhase::Running;
                self.events.push(GameEvent::Resumed);
                log::info!("Resumed at {}s", self.clock.game_secs());
            }
            GamePhase::GameOver => {}
        }
    }

    /// Enter the terminal phase and cancel every pending timer.
    /// Returns the final stats the first time it is called.
    pub fn game_over(&mut self) -> Option<SessionStats> {
        if self.phase == GamePhase::GameOver {
            return None;
        }
        self.phase = GamePhase::GameOver;
        self.cancel_timers();
        let stats = self.stats();
        self.events.push(GameEvent::GameOver(stats));
        log::info!(
            "Game over: {}s survived, {} kills, {} power-ups",
            stats.time,
            stats.kills,
            stats.powerups
        );
        Some(stats)
    }

    /// Cancel spawn timers and every pending buff revert
    pub fn cancel_timers(&mut self) {
        self.enemy_timer.cancel();
        self.powerup_timer.cancel();
        self.effects.cancel_all();
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
