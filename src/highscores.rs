//! High score leaderboard system
//!
//! Persisted to LocalStorage, tracks top 10 runs by total home runs.

use serde::{Deserialize, Serialize};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Total home runs across the run
    pub home_runs: u32,
    /// Highest level reached (1-indexed for display)
    pub level: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "dinger_highscores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a run qualifies for the leaderboard
    pub fn qualifies(&self, home_runs: u32) -> bool {
        if home_runs == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries
            .last()
            .map(|e| home_runs > e.home_runs)
            .unwrap_or(true)
    }

    /// Add a run to the leaderboard (if it qualifies).
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify.
    pub fn add_score(&mut self, home_runs: u32, level: u32, timestamp: f64) -> Option<usize> {
        if !self.qualifies(home_runs) {
            return None;
        }

        let entry = HighScoreEntry {
            home_runs,
            level,
            timestamp,
        };

        // Insertion point, sorted descending by home runs
        let pos = self.entries.iter().position(|e| home_runs > e.home_runs);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top run (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.home_runs)
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(scores) = serde_json::from_str::<HighScores>(&json) {
                    log::info!("Loaded {} high scores", scores.entries.len());
                    return scores;
                }
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("High scores saved ({} entries)", self.entries.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_runs_never_qualifies() {
        let scores = HighScores::new();
        assert!(!scores.qualifies(0));
        assert!(scores.qualifies(1));
    }

    #[test]
    fn test_scores_stay_sorted_and_capped() {
        let mut scores = HighScores::new();
        for runs in 1..=12u32 {
            scores.add_score(runs, 1, runs as f64);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.top_score(), Some(12));
        assert!(
            scores
                .entries
                .windows(2)
                .all(|w| w[0].home_runs >= w[1].home_runs)
        );
        // 1 and 2 fell off the bottom
        assert!(scores.entries.iter().all(|e| e.home_runs > 2));
    }

    #[test]
    fn test_rank_is_insertion_position() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(5, 1, 0.0), Some(1));
        assert_eq!(scores.add_score(8, 2, 1.0), Some(1));
        assert_eq!(scores.add_score(6, 1, 2.0), Some(2));
        assert_eq!(scores.add_score(0, 1, 3.0), None);
    }
}
