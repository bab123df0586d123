//! Scoring, lines and level progression

use std::time::Duration;

/// Lines needed per level step
const LINES_PER_LEVEL: u32 = 10;

/// Scoring calculation
#[derive(Debug, Clone)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Current level
    pub level: u32,
    /// Total lines cleared
    pub lines: u32,
}

impl Default for Score {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Score {
    pub fn new(starting_level: u32) -> Self {
        Self {
            points: 0,
            level: starting_level.max(1),
            lines: 0,
        }
    }

    /// Add score for a line clear and level up if enough lines are done.
    /// Returns the action name for display.
    pub fn add_clear(&mut self, lines: usize) -> Option<String> {
        let (base_score, action_name) = match lines {
            0 => return None,
            1 => (100, "Single"),
            2 => (300, "Double"),
            3 => (500, "Triple"),
            4 => (800, "Tetris"),
            // Bucket tops can clear more than four rows at once
            n => (800 + 300 * (n as u64 - 4), "Cascade"),
        };

        self.points += base_score * self.level as u64;
        self.lines += lines as u32;

        let mut action = String::from(action_name);
        if self.lines >= self.level * LINES_PER_LEVEL {
            self.level += 1;
            action.push_str(&format!(" Level {}", self.level));
        }
        Some(action)
    }

    /// Add score for one row of soft drop
    pub fn add_soft_drop(&mut self, rows: u32) {
        self.points += 40 * self.level as u64 * rows as u64;
    }

    /// Add score for a hard drop of `rows` depth
    pub fn add_hard_drop(&mut self, rows: u32) {
        self.points += 50 * self.level as u64 * rows as u64;
    }

    /// Gravity interval for the current level
    pub fn fall_interval(&self) -> Duration {
        let millis = 200i64 - (self.level as i64 - 1) * 15;
        Duration::from_millis(millis.max(50) as u64)
    }
}
