//! Best score / best level record
//!
//! Both values only ever move upward. Persisted as a small JSON file; the
//! storage location belongs to whoever drives the game.

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighScores {
    pub best_score: u64,
    pub best_level: u32,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a new score. Returns true if it beat the stored best.
    pub fn record_score(&mut self, score: u64) -> bool {
        if score > self.best_score {
            self.best_score = score;
            true
        } else {
            false
        }
    }

    /// Offer a new level. Returns true if it beat the stored best.
    pub fn record_level(&mut self, level: u32) -> bool {
        if level > self.best_level {
            self.best_level = level;
            true
        } else {
            false
        }
    }

    /// Offer a finished run; true if either record moved
    pub fn record(&mut self, score: u64, level: u32) -> bool {
        let score_improved = self.record_score(score);
        let level_improved = self.record_level(level);
        score_improved || level_improved
    }

    pub fn is_empty(&self) -> bool {
        self.best_score == 0 && self.best_level == 0
    }

    pub fn load(path: impl AsRef<Path>) -> io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Load, or start fresh if the file is missing or unreadable
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(scores) => {
                log::info!(
                    "Loaded high scores: {} pts, level {}",
                    scores.best_score,
                    scores.best_level
                );
                scores
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("Ignoring high scores at {}: {}", path.display(), e);
                Self::new()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)?;
        log::info!("High scores saved ({} pts, level {})", self.best_score, self.best_level);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("dodge-run-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_only_moves_upward() {
        let mut scores = HighScores::new();
        assert!(scores.is_empty());
        assert!(scores.record(500, 3));
        assert!(!scores.record(400, 2));
        assert_eq!(scores.best_score, 500);
        assert_eq!(scores.best_level, 3);

        // A lower score can still set a level record
        assert!(scores.record(100, 4));
        assert_eq!(scores.best_score, 500);
        assert_eq!(scores.best_level, 4);
    }

    #[test]
    fn test_equal_is_not_an_improvement() {
        let mut scores = HighScores::new();
        scores.record(100, 2);
        assert!(!scores.record_score(100));
        assert!(!scores.record_level(2));
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("scores");
        let mut scores = HighScores::new();
        scores.record(1234, 5);
        scores.save(&path).unwrap();
        assert_eq!(HighScores::load(&path).unwrap(), scores);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_or_default_recovers() {
        let missing = temp_path("missing");
        let _ = std::fs::remove_file(&missing);
        assert!(HighScores::load_or_default(&missing).is_empty());

        let garbage = temp_path("garbage");
        std::fs::write(&garbage, "{ not json").unwrap();
        assert_eq!(
            HighScores::load(&garbage).unwrap_err().kind(),
            io::ErrorKind::InvalidData
        );
        assert!(HighScores::load_or_default(&garbage).is_empty());
        let _ = std::fs::remove_file(&garbage);
    }
}
