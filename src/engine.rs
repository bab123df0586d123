//! Collision queries between a piece and a board
//!
//! Nothing here mutates; the driver applies a move or rotation only after
//! the matching query has said yes.

use crate::board::Board;
use crate::piece::Piece;

/// Whether every cell of `piece` sits on a valid, unoccupied board cell
pub fn fits(board: &Board, piece: &Piece) -> bool {
    cells_free(board, piece, piece.x, piece.y)
}

/// Whether the piece could be shifted by (dx, dy)
pub fn can_move(board: &Board, piece: &Piece, dx: i32, dy: i32) -> bool {
    cells_free(board, piece, piece.x + dx, piece.y + dy)
}

/// Whether the next rotation state, after the I-bar offset, fits.
/// Only the single corrected position is tried.
pub fn can_rotate(board: &Board, piece: &Piece) -> bool {
    fits(board, &piece.rotated())
}

/// How many rows the piece can fall before it rests
pub fn drop_depth(board: &Board, piece: &Piece) -> i32 {
    let mut depth = 0;
    while depth <= board.height() as i32 && can_move(board, piece, 0, depth + 1) {
        depth += 1;
    }
    depth
}

fn cells_free(board: &Board, piece: &Piece, x: i32, y: i32) -> bool {
    piece
        .blocks_at(x, y)
        .all(|(row, col)| board.is_valid_position(row, col) && !board.is_occupied(row, col))
}
