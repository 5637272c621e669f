//! Simulated clock and timers
//!
//! Everything here counts simulated milliseconds. The clock only advances when
//! a tick runs, so pausing the game suspends every timer and resuming picks up
//! each one with its remaining delay.

use serde::{Deserialize, Serialize};

/// Elapsed simulated time for a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimClock {
    /// Simulated milliseconds since start
    pub elapsed_ms: u64,
    /// Ticks processed since start
    pub ticks: u64,
}

impl SimClock {
    /// Advance by one tick of `dt_ms`
    pub fn advance(&mut self, dt_ms: u64) {
        self.elapsed_ms += dt_ms;
        self.ticks += 1;
    }

    /// Game time in whole seconds (what the player sees as the score)
    #[inline]
    pub fn game_secs(&self) -> u32 {
        (self.elapsed_ms / 1000) as u32
    }
}

/// A repeating timer whose next delay is chosen each time it fires.
///
/// The delay function is supplied per call to [`RepeatingTimer::advance`], so
/// the same timer type drives fixed-cadence, difficulty-scaled and randomized
/// schedules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatingTimer {
    remaining_ms: u64,
    cancelled: bool,
}

impl RepeatingTimer {
    /// Create a timer that first fires after `first_delay_ms`
    pub fn new(first_delay_ms: u64) -> Self {
        Self {
            remaining_ms: first_delay_ms,
            cancelled: false,
        }
    }

    /// Milliseconds until the next fire
    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Stop the timer for good
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// Advance by `dt_ms`, returning how many times the timer fired.
    ///
    /// After each fire `next_delay` is asked for the following delay. A zero
    /// delay is treated as one millisecond so a bad delay function cannot
    /// spin forever.
    pub fn advance(&mut self, dt_ms: u64, mut next_delay: impl FnMut() -> u64) -> u32 {
        if self.cancelled {
            return 0;
        }

        let mut budget = dt_ms;
        let mut fired = 0;
        while budget >= self.remaining_ms {
            budget -= self.remaining_ms;
            fired += 1;
            self.remaining_ms = next_delay().max(1);
        }
        self.remaining_ms -= budget;
        fired
    }
}

/// A one-shot countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    pub remaining_ms: u64,
}

impl Countdown {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            remaining_ms: duration_ms,
        }
    }

    /// Advance by `dt_ms`; returns true once the countdown reaches zero
    pub fn advance(&mut self, dt_ms: u64) -> bool {
        self.remaining_ms = self.remaining_ms.saturating_sub(dt_ms);
        self.remaining_ms == 0
    }
}
