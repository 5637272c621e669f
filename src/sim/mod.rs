//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (insertion order, unique ids)
//! - No rendering, audio or platform dependencies

pub mod clock;
pub mod collision;
pub mod effects;
pub mod spawn;
pub mod state;
pub mod store;
pub mod tick;

pub use clock::{Countdown, RepeatingTimer, SimClock};
pub use effects::{BuffHandle, PowerupEffects};
pub use spawn::{enemy_count_per_spawn, enemy_spawn_interval};
pub use state::{
    Bullet, Enemy, Explosion, GameEvent, GamePhase, GameState, Player, Powerup, SessionStats,
};
pub use store::{EntityStore, Kill};
pub use tick::{MoveInput, TickInput, tick};
