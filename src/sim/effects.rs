//! Power-up buffs
//!
//! Every pickup owns its own revert timer. Overlapping pickups compound the
//! fire-rate multiplier and each revert divides out only its own share.

use serde::{Deserialize, Serialize};

use super::clock::Countdown;
use crate::consts::*;

/// Handle to one pickup's pending revert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuffHandle(pub u32);

/// One pickup's contribution, waiting to be reverted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveBuff {
    pub handle: BuffHandle,
    pub countdown: Countdown,
    /// Multiplier this pickup applied to the fire rate
    pub fire_rate_factor: f32,
}

/// Fire rate, explosion radius and the buffs currently modifying them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerupEffects {
    /// Shots per second
    pub fire_rate: f32,
    pub explosion_radius: f32,
    pub powered_up: bool,
    pub active: Vec<ActiveBuff>,
    next_handle: u32,
}

impl Default for PowerupEffects {
    fn default() -> Self {
        Self {
            fire_rate: BASE_FIRE_RATE,
            explosion_radius: BASE_EXPLOSION_RADIUS,
            powered_up: false,
            active: Vec::new(),
            next_handle: 1,
        }
    }
}

impl PowerupEffects {
    /// Minimum milliseconds between shots at the current fire rate
    pub fn fire_cooldown_ms(&self) -> f32 {
        1000.0 / self.fire_rate
    }

    /// Apply a pickup and schedule its revert
    pub fn apply_pickup(&mut self) -> BuffHandle {
        let handle = BuffHandle(self.next_handle);
        self.next_handle += 1;

        self.fire_rate *= POWERUP_FIRE_RATE_MULTIPLIER;
        self.explosion_radius = BASE_EXPLOSION_RADIUS * POWERUP_EXPLOSION_SCALE;
        self.powered_up = true;
        self.active.push(ActiveBuff {
            handle,
            countdown: Countdown::new(POWERUP_DURATION_MS),
            fire_rate_factor: POWERUP_FIRE_RATE_MULTIPLIER,
        });
        handle
    }

    /// Advance every revert timer, returning the handles that expired
    pub fn advance(&mut self, dt_ms: u64) -> Vec<BuffHandle> {
        let mut expired = Vec::new();
        for buff in &mut self.active {
            if buff.countdown.advance(dt_ms) {
                expired.push(*buff);
            }
        }
        for buff in &expired {
            self.revert(buff);
        }
        expired.into_iter().map(|b| b.handle).collect()
    }

    fn revert(&mut self, buff: &ActiveBuff) {
        self.active.retain(|b| b.handle != buff.handle);
        self.fire_rate /= buff.fire_rate_factor;

        if self.active.is_empty() {
            // Snap back so repeated multiply/divide cannot drift
            self.fire_rate = BASE_FIRE_RATE;
            self.explosion_radius = BASE_EXPLOSION_RADIUS;
            self.powered_up = false;
        }
    }

    /// Cancel one pending revert without applying it.
    /// Returns false if the handle is unknown or already reverted.
    pub fn cancel(&mut self, handle: BuffHandle) -> bool {
        let before = self.active.len();
        self.active.retain(|b| b.handle != handle);
        self.active.len() != before
    }

    /// Cancel every pending revert, one handle at a time (session teardown)
    pub fn cancel_all(&mut self) {
        let handles: Vec<BuffHandle> = self.active.iter().map(|b| b.handle).collect();
        for handle in handles {
            if self.cancel(handle) {
                log::debug!("Cancelled pending revert for {:?}", handle);
            }
        }
    }
}
