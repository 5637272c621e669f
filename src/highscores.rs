//! High score leaderboard
//!
//! Keeps the best 5 runs ranked by survival time. The host decides where the
//! JSON form is stored.

use serde::{Deserialize, Serialize};

use crate::sim::SessionStats;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 5;

/// High score leaderboard (best survival time first)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighScores {
    pub entries: Vec<SessionStats>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a run qualifies for the leaderboard
    pub fn qualifies(&self, stats: &SessionStats) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if it beats the lowest entry
        self.entries.last().is_none_or(|e| stats.time > e.time)
    }

    /// Get the rank a run would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, stats: &SessionStats) -> Option<usize> {
        if !self.qualifies(stats) {
            return None;
        }
        let rank = self.entries.iter().position(|e| stats.time > e.time);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a finished run to the leaderboard (if it qualifies).
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify.
    pub fn add(&mut self, stats: SessionStats) -> Option<usize> {
        let rank = self.potential_rank(&stats)?;
        self.entries.insert(rank - 1, stats);
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the best run (if any)
    pub fn top(&self) -> Option<&SessionStats> {
        self.entries.first()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let mut scores: Self = serde_json::from_str(json)?;
        // Stored data may come from anywhere; restore the ranking invariant
        scores.entries.sort_by(|a, b| b.time.cmp(&a.time));
        scores.entries.truncate(MAX_HIGH_SCORES);
        log::info!("Loaded {} high scores", scores.entries.len());
        Ok(scores)
    }
}
