//! Brr Survival - a top-down survival arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, movement, collisions, buffs, game state)
//! - `session`: Host-facing driver (real-time accumulator, pause, observers)
//! - `config`: Session configuration
//! - `highscores`: Leaderboard ranking of finished runs

pub mod config;
pub mod highscores;
pub mod session;
pub mod sim;

pub use config::{ConfigError, Playfield, SessionConfig};
pub use highscores::HighScores;
pub use session::{Session, SessionObserver};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (~60 Hz)
    pub const TICK_MS: u64 = 16;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest real frame the session will simulate (seconds)
    pub const MAX_FRAME_SECS: f32 = 0.1;

    /// Player movement per tick on each pressed axis
    pub const PLAYER_SPEED: f32 = 5.0;
    /// Player is kept this far inside the playfield edges
    pub const PLAYER_PADDING: f32 = 20.0;

    /// Enemy pursuit speed per tick
    pub const ENEMY_SPEED: f32 = 2.0;
    /// Enemies appear this far outside the chosen edge
    pub const ENEMY_EDGE_OFFSET: f32 = 20.0;
    /// Full width of the random jitter applied to spawn positions
    pub const ENEMY_SPAWN_JITTER: f32 = 150.0;

    /// Enemy spawn curve
    pub const INITIAL_ENEMY_SPAWN_INTERVAL_MS: f64 = 1000.0;
    pub const MIN_ENEMY_SPAWN_INTERVAL_MS: f64 = 300.0;
    pub const ENEMY_SCALING_START_SECS: u32 = 15;
    pub const MAX_ENEMIES_PER_SPAWN: u32 = 5;
    /// Decay constant of the spawn interval (seconds)
    pub const SPAWN_DECAY_SECS: f64 = 120.0;
    /// Growth factor applied to log10(t + 1) for enemy count
    pub const ENEMY_COUNT_LOG_FACTOR: f64 = 1.5;

    /// Power-up spawning
    pub const POWERUP_SPAWN_MIN_INTERVAL_MS: u64 = 10_000;
    pub const POWERUP_SPAWN_MAX_INTERVAL_MS: u64 = 15_000;
    pub const POWERUP_VISIBLE_MS: u64 = 10_000;
    pub const POWERUP_SPAWN_PADDING: f32 = 40.0;

    /// Power-up effect
    pub const POWERUP_DURATION_MS: u64 = 10_000;
    pub const POWERUP_FIRE_RATE_MULTIPLIER: f32 = 2.5;
    pub const POWERUP_EXPLOSION_SCALE: f32 = 1.5;

    /// Weapons
    pub const BASE_FIRE_RATE: f32 = 3.0; // shots per second
    pub const BULLET_SPEED: f32 = 5.0;
    pub const MAX_BULLETS: usize = 50;
    pub const BULLET_MAX_AGE_MS: u64 = 5_000;

    /// Explosions
    pub const BASE_EXPLOSION_RADIUS: f32 = 50.0;
    pub const EXPLOSION_LIFETIME_MS: u64 = 500;

    /// Proximity radii
    pub const HIT_RADIUS: f32 = 20.0;
    pub const PICKUP_RADIUS: f32 = 30.0;
}

/// Shooting direction for a facing vector: the opposite way, normalized.
/// Falls back to straight up (screen coordinates) when the player has not moved.
#[inline]
pub fn fire_direction(facing: Vec2) -> Vec2 {
    let dir = (-facing).normalize_or_zero();
    if dir == Vec2::ZERO {
        Vec2::new(0.0, -1.0)
    } else {
        dir
    }
}

/// Clamp a point into `[padding, bound - padding]` on both axes
#[inline]
pub fn clamp_to_bounds(pos: Vec2, width: f32, height: f32, padding: f32) -> Vec2 {
    Vec2::new(
        pos.x.max(padding).min(width - padding),
        pos.y.max(padding).min(height - padding),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fire_direction_defaults_up() {
        assert_eq!(fire_direction(Vec2::ZERO), Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_fire_direction_opposes_facing() {
        let dir = fire_direction(Vec2::new(1.0, 1.0));
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert!(dir.x < 0.0 && dir.y < 0.0);
    }

    #[test]
    fn test_clamp_to_bounds() {
        let p = clamp_to_bounds(Vec2::new(-50.0, 1000.0), 800.0, 600.0, 20.0);
        assert_eq!(p, Vec2::new(20.0, 580.0));
    }
}
