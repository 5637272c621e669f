//! Session configuration
//!
//! Only the host-facing knobs live here. Difficulty curves and buff values are
//! fixed in [`crate::consts`].

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{MAX_SUBSTEPS, PLAYER_PADDING, POWERUP_SPAWN_PADDING};

/// Rejected configuration or host input
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid playfield {width}x{height}: both sides must be finite and larger than {min}")]
    InvalidPlayfield { width: f32, height: f32, min: f32 },
    #[error("max_substeps must be at least 1")]
    InvalidSubsteps,
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Playable area in screen coordinates, origin top-left
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 900.0,
        }
    }
}

impl Playfield {
    /// Smallest side that still leaves room for the player and power-ups
    pub const MIN_SIDE: f32 = 2.0 * POWERUP_SPAWN_PADDING + 2.0 * PLAYER_PADDING;

    pub fn new(width: f32, height: f32) -> Result<Self, ConfigError> {
        let field = Self { width, height };
        field.validate()?;
        Ok(field)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ok = |side: f32| side.is_finite() && side >= Self::MIN_SIDE;
        if ok(self.width) && ok(self.height) {
            Ok(())
        } else {
            Err(ConfigError::InvalidPlayfield {
                width: self.width,
                height: self.height,
                min: Self::MIN_SIDE,
            })
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Inclusive bounds check
    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= 0.0 && pos.x <= self.width && pos.y >= 0.0 && pos.y <= self.height
    }
}

/// Everything needed to start a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub playfield: Playfield,
    /// RNG seed; same seed and inputs replay the same run
    pub seed: u64,
    /// Maximum ticks simulated per host frame
    pub max_substeps: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            playfield: Playfield::default(),
            seed: 0x6272_7272,
            max_substeps: MAX_SUBSTEPS,
        }
    }
}

impl SessionConfig {
    /// Parse and validate a JSON config; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.playfield.validate()?;
        if self.max_substeps == 0 {
            return Err(ConfigError::InvalidSubsteps);
        }
        Ok(())
    }
}
