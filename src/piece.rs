//! Active falling piece

use crate::tetromino::{Rotation, Shape, TetrominoType};
use ratatui::style::Color;

/// Spawn position of the bounding box's top-left corner
pub const SPAWN_X: i32 = 10;
pub const SPAWN_Y: i32 = 1;

/// A falling piece. The kind is fixed at construction; rotation and shape
/// always change together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    kind: TetrominoType,
    rotation: Rotation,
    shape: Shape,
    /// Column of the bounding box's left edge
    pub x: i32,
    /// Row of the bounding box's top edge, increasing downward
    pub y: i32,
}

impl Piece {
    /// Create a new piece at the spawn position
    pub fn new(kind: TetrominoType) -> Self {
        Self::at(kind, SPAWN_X, SPAWN_Y)
    }

    /// Create a piece in its spawn state at an arbitrary position
    pub fn at(kind: TetrominoType, x: i32, y: i32) -> Self {
        Self {
            kind,
            rotation: Rotation::North,
            shape: kind.shape(Rotation::North),
            x,
            y,
        }
    }

    pub fn kind(&self) -> TetrominoType {
        self.kind
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn color(&self) -> Color {
        self.kind.color()
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// (width, height) of the bounding box
    pub fn bounding_box(&self) -> (usize, usize) {
        (self.shape.size(), self.shape.size())
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    pub fn move_by(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }

    /// Advance to the next rotation state. No collision check and no
    /// position correction; O always stays in its spawn state.
    pub fn rotate(&mut self) {
        self.rotation = if self.kind.rotates() {
            self.rotation.cw()
        } else {
            Rotation::North
        };
        self.shape = self.kind.shape(self.rotation);
    }

    /// A copy of this piece after one rotation, including the I-bar offset
    pub fn rotated(&self) -> Piece {
        let mut next = self.clone();
        next.rotate();
        next.x += self.kind.rotation_offset(next.rotation);
        next
    }

    /// Absolute (row, col) of every filled cell at the current position
    pub fn blocks(&self) -> impl Iterator<Item = (i32, i32)> + use<> {
        self.blocks_at(self.x, self.y)
    }

    /// Absolute (row, col) of every filled cell if the box sat at (x, y)
    pub fn blocks_at(&self, x: i32, y: i32) -> impl Iterator<Item = (i32, i32)> + use<> {
        self.shape
            .cells()
            .map(move |(r, c)| (y + r as i32, x + c as i32))
    }
}
