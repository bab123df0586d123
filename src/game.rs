//! Core game state and logic

use crate::bag::{PieceOrder, PieceQueue};
use crate::board::Board;
use crate::engine;
use crate::mode::{GameMode, ModeState};
use crate::piece::Piece;
use crate::score::Score;
use crate::tetromino::TetrominoType;
use std::time::Instant;
use tracing::{debug, info};

/// Game state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Playing,
    Paused,
    GameOver,
    Victory, // Picture completed
    Abandoned, // Left from the pause screen
}

/// Input actions the game can process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    Rotate,
    Pause,
    Quit,
}

/// The main game struct
pub struct Game {
    /// The game board
    pub board: Board,
    /// Current falling piece
    pub current_piece: Option<Piece>,
    /// Upcoming pieces
    queue: PieceQueue,
    /// Score tracking
    pub score: Score,
    /// Current game state
    pub state: GameState,
    /// Game mode state
    pub mode_state: ModeState,
    /// Last gravity tick
    last_fall: Instant,
    /// Last action text to display
    pub last_action: Option<String>,
    /// Pieces locked so far
    pub pieces_placed: u32,
}

impl Game {
    /// Create a new game with a random seed
    pub fn new(mode: GameMode, order: PieceOrder, starting_level: u32) -> Self {
        Self::with_seed(mode, order, starting_level, rand::random())
    }

    /// Create a new game whose bag order is fixed by `seed`
    pub fn with_seed(mode: GameMode, order: PieceOrder, starting_level: u32, seed: u64) -> Self {
        let mut queue = PieceQueue::new(order, seed);
        let first_piece = queue.next();
        let mut mode_state = ModeState::new(mode);
        mode_state.start();
        info!(
            mode = %mode.label(),
            order = order.name(),
            level = starting_level,
            seed,
            "game started"
        );

        Self {
            board: mode.build_board(),
            current_piece: Some(Piece::new(first_piece)),
            queue,
            score: Score::new(starting_level),
            state: GameState::Playing,
            mode_state,
            last_fall: Instant::now(),
            last_action: None,
            pieces_placed: 0,
        }
    }

    /// Get the current game mode
    pub fn mode(&self) -> GameMode {
        self.mode_state.mode
    }

    /// The piece that spawns after the current one
    pub fn next_piece(&self) -> TetrominoType {
        self.queue.peek()
    }

    /// Where the current piece would land
    pub fn ghost_piece(&self) -> Option<Piece> {
        let piece = self.current_piece.as_ref()?;
        let mut ghost = piece.clone();
        ghost.set_position(piece.x, piece.y + engine::drop_depth(&self.board, piece));
        Some(ghost)
    }

    /// (filled, total) target cells in picture mode
    pub fn picture_progress(&self) -> Option<(usize, usize)> {
        self.board.as_picture().map(|target| target.progress())
    }

    /// Process an action
    pub fn process_action(&mut self, action: Action) {
        match self.state {
            GameState::Paused => match action {
                Action::Pause => {
                    self.state = GameState::Playing;
                    self.last_fall = Instant::now();
                }
                Action::Quit => self.state = GameState::GameOver,
                _ => {}
            },
            GameState::Playing => match action {
                Action::MoveLeft => self.shift(-1),
                Action::MoveRight => self.shift(1),
                Action::SoftDrop => self.soft_drop(),
                Action::HardDrop => self.hard_drop(),
                Action::Rotate => self.rotate(),
                Action::Pause => {
                    self.state = GameState::Paused;
                }
                Action::Quit => {
                    info!(score = self.score.points, "game abandoned");
                    self.state = GameState::GameOver;
                }
            },
            GameState::GameOver | GameState::Victory | GameState::Abandoned => {
                // No actions, handled by main loop
            }
        }
    }

    /// Leave a paused game without finishing it. Returns false if the
    /// game was not paused.
    pub fn return_to_menu(&mut self) -> bool {
        if self.state != GameState::Paused {
            return false;
        }
        info!(score = self.score.points, "game left from pause");
        self.state = GameState::Abandoned;
        true
    }

    /// Update game state (call every frame)
    pub fn update(&mut self) {
        if self.state != GameState::Playing {
            return;
        }

        self.mode_state.update();

        if self.last_fall.elapsed() < self.score.fall_interval() {
            return;
        }
        self.last_fall = Instant::now();

        let Some(piece) = &mut self.current_piece else {
            return;
        };
        if engine::can_move(&self.board, piece, 0, 1) {
            piece.move_by(0, 1);
        } else {
            self.lock_piece();
        }
    }

    fn shift(&mut self, dx: i32) {
        if let Some(piece) = &mut self.current_piece {
            if engine::can_move(&self.board, piece, dx, 0) {
                piece.move_by(dx, 0);
            }
        }
    }

    fn soft_drop(&mut self) {
        let Some(piece) = &mut self.current_piece else {
            return;
        };
        if engine::can_move(&self.board, piece, 0, 1) {
            piece.move_by(0, 1);
            self.score.add_soft_drop(1);
            self.last_fall = Instant::now();
        } else {
            self.lock_piece();
        }
    }

    fn hard_drop(&mut self) {
        if let Some(piece) = &mut self.current_piece {
            let depth = engine::drop_depth(&self.board, piece);
            piece.move_by(0, depth);
            self.score.add_hard_drop(depth as u32);
            self.lock_piece();
        }
    }

    fn rotate(&mut self) {
        if let Some(piece) = &mut self.current_piece {
            if engine::can_rotate(&self.board, piece) {
                *piece = piece.rotated();
            }
        }
    }

    /// Lock the current piece and spawn next
    fn lock_piece(&mut self) {
        let Some(piece) = self.current_piece.take() else {
            return;
        };

        self.board.place_figure(&piece);
        self.pieces_placed += 1;
        debug!(kind = piece.kind().name(), x = piece.x, y = piece.y, "piece locked");

        // A touch outside the picture loses even if it also completed it
        if self.board.is_boundary_violated() {
            info!(score = self.score.points, "picture boundary touched");
            self.last_action = Some("Outside the picture!".to_string());
            self.state = GameState::GameOver;
            return;
        }
        if self.board.is_picture_complete() {
            let picture = self.board.as_picture().map(|target| target.kind().name()).unwrap_or_default();
            info!(score = self.score.points, picture, "picture complete");
            self.last_action = Some(format!("{} complete!", picture));
            self.state = GameState::Victory;
            return;
        }

        let level_before = self.score.level;
        let lines_cleared = self.board.clear_full_lines();
        if lines_cleared > 0 {
            self.last_action = self.score.add_clear(lines_cleared);
            debug!(lines = lines_cleared, total = self.score.lines, "lines cleared");
            if self.score.level != level_before {
                info!(level = self.score.level, "level up");
            }
        }

        // Spawn next piece
        let next_piece = Piece::new(self.queue.next());

        // Check for top out
        if !engine::can_move(&self.board, &next_piece, 0, 0) {
            info!(
                score = self.score.points,
                lines = self.score.lines,
                pieces = self.pieces_placed,
                "game over"
            );
            self.state = GameState::GameOver;
            return;
        }

        self.current_piece = Some(next_piece);
        self.last_fall = Instant::now();
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(GameMode::Standard, PieceOrder::Cycle, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;
    use crate::picture::PictureKind;

    fn cycle_game(mode: GameMode) -> Game {
        Game::with_seed(mode, PieceOrder::Cycle, 1, 0)
    }

    #[test]
    fn test_first_piece_spawns() {
        let game = cycle_game(GameMode::Standard);
        let piece = game.current_piece.as_ref().unwrap();
        assert_eq!(piece.kind(), TetrominoType::O);
        assert_eq!(piece.position(), (10, 1));
        assert_eq!(game.next_piece(), TetrominoType::L);
    }

    #[test]
    fn test_hard_drop_locks_and_spawns() {
        let mut game = cycle_game(GameMode::Standard);
        game.process_action(Action::HardDrop);
        // O dropped from row 1 to rows 19-20: depth 18
        assert!(game.board.is_occupied(20, 10));
        assert!(game.board.is_occupied(19, 11));
        assert_eq!(game.score.points, 50 * 18);
        assert_eq!(game.pieces_placed, 1);
        assert_eq!(game.current_piece.as_ref().unwrap().kind(), TetrominoType::L);
    }

    #[test]
    fn test_moves_respect_walls() {
        let mut game = cycle_game(GameMode::Standard);
        for _ in 0..30 {
            game.process_action(Action::MoveLeft);
        }
        assert_eq!(game.current_piece.as_ref().unwrap().x, 1);
        for _ in 0..30 {
            game.process_action(Action::MoveRight);
        }
        assert_eq!(game.current_piece.as_ref().unwrap().x, 19);
    }

    #[test]
    fn test_rotate_applies_i_offset() {
        let mut game = cycle_game(GameMode::Standard);
        game.current_piece = Some(Piece::at(TetrominoType::I, 10, 5));
        game.process_action(Action::Rotate);
        let piece = game.current_piece.as_ref().unwrap();
        assert_eq!(piece.rotation().index(), 1);
        assert_eq!(piece.x, 11);
    }

    #[test]
    fn test_soft_drop_scores() {
        let mut game = cycle_game(GameMode::Standard);
        game.process_action(Action::SoftDrop);
        game.process_action(Action::SoftDrop);
        assert_eq!(game.current_piece.as_ref().unwrap().y, 3);
        assert_eq!(game.score.points, 80);
    }

    #[test]
    fn test_line_clear_scores() {
        let mut game = cycle_game(GameMode::Standard);
        for col in 1..21 {
            if col != 10 && col != 11 {
                game.board.set(20, col, Cell::Filled(TetrominoType::J));
            }
        }
        game.process_action(Action::HardDrop);
        assert_eq!(game.score.lines, 1);
        assert_eq!(game.last_action.as_deref(), Some("Single"));
        // The top half of the O slid down into row 20
        assert!(game.board.is_occupied(20, 10));
        assert!(!game.board.is_occupied(20, 9));
    }

    #[test]
    fn test_pause_blocks_input() {
        let mut game = cycle_game(GameMode::Standard);
        game.process_action(Action::Pause);
        assert_eq!(game.state, GameState::Paused);
        game.process_action(Action::MoveLeft);
        assert_eq!(game.current_piece.as_ref().unwrap().x, 10);
        game.process_action(Action::Pause);
        assert_eq!(game.state, GameState::Playing);
    }

    #[test]
    fn test_return_to_menu_only_from_pause() {
        let mut game = cycle_game(GameMode::Standard);
        assert!(!game.return_to_menu());
        assert_eq!(game.state, GameState::Playing);

        game.process_action(Action::Pause);
        assert!(game.return_to_menu());
        assert_eq!(game.state, GameState::Abandoned);
        // Further input is ignored
        game.process_action(Action::Pause);
        assert_eq!(game.state, GameState::Abandoned);
    }

    #[test]
    fn test_top_out() {
        let mut game = cycle_game(GameMode::Standard);
        for row in 3..21 {
            for col in 10..14 {
                game.board.set(row, col, Cell::Filled(TetrominoType::Z));
            }
        }
        game.process_action(Action::HardDrop);
        assert_eq!(game.state, GameState::GameOver);
        assert!(game.current_piece.is_none());
    }

    #[test]
    fn test_picture_violation_ends_game() {
        let mut game = cycle_game(GameMode::Picture(PictureKind::Square));
        game.current_piece = Some(Piece::at(TetrominoType::O, 1, 1));
        game.process_action(Action::HardDrop);
        assert_eq!(game.state, GameState::GameOver);
        assert!(game.board.is_boundary_violated());
    }

    #[test]
    fn test_picture_completion_wins() {
        let mut game = cycle_game(GameMode::Picture(PictureKind::Square));
        for i in 0..5 {
            for j in 0..5 {
                if (i, j) != (0, 0) {
                    game.board.place_figure(&Piece::at(TetrominoType::O, 6 + 2 * i, 11 + 2 * j));
                }
            }
        }
        assert_eq!(game.picture_progress(), Some((96, 100)));
        game.current_piece = Some(Piece::at(TetrominoType::O, 6, 11));
        game.process_action(Action::HardDrop);
        assert_eq!(game.state, GameState::Victory);
        assert_eq!(game.picture_progress(), Some((100, 100)));
    }

    #[test]
    fn test_spill_on_completing_piece_still_loses() {
        let mut game = cycle_game(GameMode::Picture(PictureKind::Square));
        for i in 0..5 {
            for j in 0..5 {
                let x = if (i, j) == (4, 0) { 13 } else { 6 + 2 * i };
                game.board.place_figure(&Piece::at(TetrominoType::O, x, 11 + 2 * j));
            }
        }
        // Only column 15 of rows 11 and 12 is left
        assert_eq!(game.picture_progress(), Some((98, 100)));
        assert!(!game.board.is_boundary_violated());

        game.current_piece = Some(Piece::at(TetrominoType::O, 15, 11));
        game.process_action(Action::HardDrop);
        assert_eq!(game.picture_progress(), Some((100, 100)));
        assert!(game.board.is_picture_complete());
        assert_eq!(game.state, GameState::GameOver);
        assert_eq!(game.last_action.as_deref(), Some("Outside the picture!"));
    }

    #[test]
    fn test_ghost_piece() {
        let game = cycle_game(GameMode::Standard);
        let ghost = game.ghost_piece().unwrap();
        assert_eq!(ghost.position(), (10, 19));
    }
}
