//! High score leaderboard
//!
//! Top 10 finished runs, persisted as JSON next to the runner.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Simulated seconds survived
    pub elapsed_secs: f64,
    /// RNG seed, so the run can be replayed
    pub seed: u64,
}

/// High score leaderboard, sorted by score descending
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Would `score` make the board?
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Rank a score would get (1-indexed), None if it doesn't qualify
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a run; returns its rank or None if it didn't qualify
    pub fn add_score(&mut self, score: u64, elapsed_secs: f64, seed: u64) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries.insert(
            rank - 1,
            HighScoreEntry {
                score,
                elapsed_secs,
                seed,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load from `path`; a missing file is an empty board
    pub fn load(path: &Path) -> SimResult<Self> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No high scores at {}, starting fresh", path.display());
                return Ok(Self::new());
            }
            Err(source) => {
                return Err(SimError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let scores: Self = serde_json::from_str(&json).map_err(|source| SimError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded {} high scores", scores.entries.len());
        Ok(scores)
    }

    pub fn save(&self, path: &Path) -> SimResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(|source| SimError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}
