//! Persistent high-score table stored as JSON next to the settings file

use crate::settings::{Settings, SettingsError};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// How many entries the table keeps
pub const MAX_ENTRIES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u64,
    pub lines: u32,
    pub level: u32,
    /// Field the game was played on, e.g. "Bucket" or "Picture: House"
    pub field: String,
    /// Date as YYYY-MM-DD
    pub date: String,
}

/// Top scores, best first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighScores {
    pub entries: Vec<ScoreEntry>,
}

impl HighScores {
    fn scores_path() -> Result<PathBuf, SettingsError> {
        Settings::config_dir().map(|dir| dir.join("highscores.json"))
    }

    /// Load the table, or start an empty one
    pub fn load() -> Self {
        let loaded = Self::scores_path().and_then(|path| Self::load_from(&path));
        match loaded {
            Ok(scores) => scores,
            Err(SettingsError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                warn!(error = %e, "failed to load high scores");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path)?;
        let mut scores: HighScores = serde_json::from_str(&contents)?;
        scores.sort_and_truncate();
        Ok(scores)
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&Self::scores_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        debug!(path = %path.display(), entries = self.entries.len(), "high scores saved");
        Ok(())
    }

    /// Whether a score would make it onto the table
    pub fn qualifies(&self, score: u64) -> bool {
        score > 0
            && (self.entries.len() < MAX_ENTRIES
                || self.entries.last().is_some_and(|e| score > e.score))
    }

    /// Insert a result dated today. Returns its 1-based rank if it was kept.
    pub fn add(&mut self, name: &str, score: u64, lines: u32, level: u32, field: &str) -> Option<usize> {
        let name = match name.trim() {
            "" => "Player",
            trimmed => trimmed,
        };
        let entry = ScoreEntry {
            name: name.to_string(),
            score,
            lines,
            level,
            field: field.to_string(),
            date: Local::now().format("%Y-%m-%d").to_string(),
        };
        // Ties go after existing entries with the same score
        let index = self.entries.partition_point(|e| e.score >= score);
        if index >= MAX_ENTRIES {
            return None;
        }
        self.entries.insert(index, entry);
        self.entries.truncate(MAX_ENTRIES);
        let rank = index + 1;
        info!(name, score, rank, "new high score");
        Some(rank)
    }

    pub fn best(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    // Stable sort keeps earlier entries ahead of later ties
    fn sort_and_truncate(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_ENTRIES);
    }
}
