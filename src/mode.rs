//! Game modes: Standard, Bucket, Picture

use crate::board::Board;
use crate::picture::PictureKind;
use std::time::{Duration, Instant};

/// Available game modes, one per field shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameMode {
    #[default]
    Standard, // Rectangular field, level increases every 10 lines
    Bucket,   // Field narrows toward the top
    Picture(PictureKind), // Fill the outline exactly
}

impl GameMode {
    pub fn name(&self) -> &'static str {
        match self {
            GameMode::Standard => "Standard",
            GameMode::Bucket => "Bucket",
            GameMode::Picture(_) => "Picture",
        }
    }

    /// Name including the picture, as stored with high scores
    pub fn label(&self) -> String {
        match self {
            GameMode::Picture(kind) => format!("Picture: {}", kind.name()),
            other => other.name().to_string(),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GameMode::Standard => "Classic field - level up every 10 lines",
            GameMode::Bucket => "The walls close in toward the top",
            GameMode::Picture(_) => "Fill the picture without touching outside it",
        }
    }

    /// Build an empty board for this mode
    pub fn build_board(&self) -> Board {
        match self {
            GameMode::Standard => Board::rectangular(),
            GameMode::Bucket => Board::bucket(),
            GameMode::Picture(kind) => Board::picture(*kind),
        }
    }
}

/// Mode-specific game state
#[derive(Debug, Clone)]
pub struct ModeState {
    pub mode: GameMode,
    pub start_time: Option<Instant>,
    pub elapsed: Duration,
}

impl ModeState {
    pub fn new(mode: GameMode) -> Self {
        Self {
            mode,
            start_time: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Start the timer
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Update elapsed time
    pub fn update(&mut self) {
        if let Some(start) = self.start_time {
            self.elapsed = start.elapsed();
        }
    }

    /// Format elapsed time as MM:SS
    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed.as_secs();
        format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::FieldShape;

    #[test]
    fn test_build_board_matches_mode() {
        assert_eq!(*GameMode::Standard.build_board().shape(), FieldShape::Rectangular);
        assert!(matches!(GameMode::Bucket.build_board().shape(), FieldShape::Bucket(_)));
        let board = GameMode::Picture(PictureKind::House).build_board();
        assert_eq!(board.as_picture().map(|p| p.kind()), Some(PictureKind::House));
    }

    #[test]
    fn test_label() {
        assert_eq!(GameMode::Bucket.label(), "Bucket");
        assert_eq!(GameMode::Picture(PictureKind::Diamond).label(), "Picture: Diamond");
    }

    #[test]
    fn test_format_time() {
        let mut state = ModeState::new(GameMode::Standard);
        state.elapsed = Duration::from_secs(125);
        assert_eq!(state.format_time(), "02:05");
    }
}
