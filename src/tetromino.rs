//! Tetromino definitions and rotation tables
//!
//! Every kind owns up to four precomputed rotation states. A state is a
//! square bitmap stored as a bitmask, so rotating is a table lookup.

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// The 7 tetromino types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TetrominoType {
    O, // Magenta - square
    L, // Cyan
    T, // Yellow
    I, // Blue - long bar
    S, // Green
    Z, // Red
    J, // White
}

impl TetrominoType {
    /// Get the color for this tetromino
    pub fn color(&self) -> Color {
        match self {
            TetrominoType::O => Color::Magenta,
            TetrominoType::L => Color::Cyan,
            TetrominoType::T => Color::Yellow,
            TetrominoType::I => Color::Blue,
            TetrominoType::S => Color::Green,
            TetrominoType::Z => Color::Red,
            TetrominoType::J => Color::White,
        }
    }

    /// All kinds, in the order the fixed piece cycle deals them
    pub fn all() -> [TetrominoType; 7] {
        [
            TetrominoType::O,
            TetrominoType::L,
            TetrominoType::T,
            TetrominoType::I,
            TetrominoType::S,
            TetrominoType::Z,
            TetrominoType::J,
        ]
    }

    /// Get the bitmap for this tetromino at a given rotation
    pub fn shape(&self, rotation: Rotation) -> Shape {
        let i = rotation.index();
        match self {
            TetrominoType::O => O_STATE,
            TetrominoType::L => L_STATES[i],
            TetrominoType::T => T_STATES[i],
            TetrominoType::I => I_STATES[i],
            TetrominoType::S => S_STATES[i],
            TetrominoType::Z => Z_STATES[i],
            TetrominoType::J => J_STATES[i],
        }
    }

    /// Whether this kind cycles through rotation states at all
    pub fn rotates(&self) -> bool {
        !matches!(self, TetrominoType::O)
    }

    /// Horizontal correction applied when rotating into `to`.
    ///
    /// Only the I bar shifts: one column left entering an even state,
    /// one column right entering an odd state.
    pub fn rotation_offset(&self, to: Rotation) -> i32 {
        match self {
            TetrominoType::I if to.index() % 2 == 0 => -1,
            TetrominoType::I => 1,
            _ => 0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TetrominoType::O => "O",
            TetrominoType::L => "L",
            TetrominoType::T => "T",
            TetrominoType::I => "I",
            TetrominoType::S => "S",
            TetrominoType::Z => "Z",
            TetrominoType::J => "J",
        }
    }
}

/// Rotation states, clockwise from the spawn state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    North, // Spawn state (index 0)
    East,  // Index 1
    South, // Index 2
    West,  // Index 3
}

impl Rotation {
    /// Rotate clockwise: North → East → South → West → North
    pub fn cw(&self) -> Rotation {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }
}

/// A square bitmap of 2x2 up to 4x4 cells.
///
/// Bit `row * size + col` is set when that cell is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    size: u8,
    bits: u16,
}

impl Shape {
    /// Build a shape from per-row patterns, most significant bit is the left column
    pub const fn from_rows(size: u8, rows: [u8; 4]) -> Shape {
        let mut bits = 0u16;
        let mut row = 0;
        while row < size as usize {
            let mut col = 0;
            while col < size as usize {
                if (rows[row] >> (size as usize - 1 - col)) & 1 == 1 {
                    bits |= 1 << (row * size as usize + col);
                }
                col += 1;
            }
            row += 1;
        }
        Shape { size, bits }
    }

    /// Side length of the bounding box
    pub fn size(&self) -> usize {
        self.size as usize
    }

    /// Check whether the cell at (row, col) of the bounding box is filled.
    /// Out-of-box coordinates are empty.
    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        let size = self.size();
        row < size && col < size && (self.bits >> (row * size + col)) & 1 == 1
    }

    /// Iterate over filled (row, col) offsets in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + use<> {
        let shape = *self;
        let size = shape.size();
        (0..size * size)
            .map(move |i| (i / size, i % size))
            .filter(move |&(r, c)| shape.is_filled(r, c))
    }
}

const O_STATE: Shape = Shape::from_rows(2, [0b11, 0b11, 0, 0]);

const L_STATES: [Shape; 4] = [
    Shape::from_rows(3, [0b100, 0b100, 0b110, 0]),
    Shape::from_rows(3, [0b000, 0b111, 0b100, 0]),
    Shape::from_rows(3, [0b011, 0b001, 0b001, 0]),
    Shape::from_rows(3, [0b000, 0b001, 0b111, 0]),
];

const T_STATES: [Shape; 4] = [
    Shape::from_rows(3, [0b010, 0b111, 0b000, 0]),
    Shape::from_rows(3, [0b010, 0b011, 0b010, 0]),
    Shape::from_rows(3, [0b000, 0b111, 0b010, 0]),
    Shape::from_rows(3, [0b010, 0b110, 0b010, 0]),
];

// Horizontal in rows 1 and 2, vertical in columns 2 and 1
const I_STATES: [Shape; 4] = [
    Shape::from_rows(4, [0b0000, 0b1111, 0b0000, 0b0000]),
    Shape::from_rows(4, [0b0010, 0b0010, 0b0010, 0b0010]),
    Shape::from_rows(4, [0b0000, 0b0000, 0b1111, 0b0000]),
    Shape::from_rows(4, [0b0100, 0b0100, 0b0100, 0b0100]),
];

const S_STATES: [Shape; 4] = [
    Shape::from_rows(3, [0b011, 0b110, 0b000, 0]),
    Shape::from_rows(3, [0b010, 0b011, 0b001, 0]),
    Shape::from_rows(3, [0b000, 0b011, 0b110, 0]),
    Shape::from_rows(3, [0b100, 0b110, 0b010, 0]),
];

const Z_STATES: [Shape; 4] = [
    Shape::from_rows(3, [0b110, 0b011, 0b000, 0]),
    Shape::from_rows(3, [0b001, 0b011, 0b010, 0]),
    Shape::from_rows(3, [0b000, 0b110, 0b011, 0]),
    Shape::from_rows(3, [0b010, 0b110, 0b100, 0]),
];

const J_STATES: [Shape; 4] = [
    Shape::from_rows(3, [0b001, 0b001, 0b011, 0]),
    Shape::from_rows(3, [0b000, 0b111, 0b001, 0]),
    Shape::from_rows(3, [0b110, 0b100, 0b100, 0]),
    Shape::from_rows(3, [0b100, 0b111, 0b000, 0]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_state_has_four_blocks() {
        for kind in TetrominoType::all() {
            let mut rotation = Rotation::North;
            for _ in 0..4 {
                let shape = kind.shape(rotation);
                assert_eq!(shape.cells().count(), 4, "{:?} {:?}", kind, rotation);
                rotation = rotation.cw();
            }
        }
    }

    #[test]
    fn test_box_sizes() {
        assert_eq!(TetrominoType::O.shape(Rotation::North).size(), 2);
        assert_eq!(TetrominoType::I.shape(Rotation::North).size(), 4);
        for kind in [
            TetrominoType::L,
            TetrominoType::T,
            TetrominoType::S,
            TetrominoType::Z,
            TetrominoType::J,
        ] {
            assert_eq!(kind.shape(Rotation::North).size(), 3);
        }
    }

    #[test]
    fn test_from_rows_layout() {
        // T spawn: .X. / XXX / ...
        let t = TetrominoType::T.shape(Rotation::North);
        let cells: Vec<_> = t.cells().collect();
        assert_eq!(cells, vec![(0, 1), (1, 0), (1, 1), (1, 2)]);
        assert!(!t.is_filled(0, 0));
        assert!(!t.is_filled(5, 5));
    }

    #[test]
    fn test_i_states_alternate_orientation() {
        let horizontal = TetrominoType::I.shape(Rotation::North);
        let vertical = TetrominoType::I.shape(Rotation::East);
        assert!((0..4).all(|c| horizontal.is_filled(1, c)));
        assert!((0..4).all(|r| vertical.is_filled(r, 2)));
        assert!((0..4).all(|c| TetrominoType::I.shape(Rotation::South).is_filled(2, c)));
        assert!((0..4).all(|r| TetrominoType::I.shape(Rotation::West).is_filled(r, 1)));
    }

    #[test]
    fn test_rotation_offset_only_moves_i() {
        assert_eq!(TetrominoType::I.rotation_offset(Rotation::East), 1);
        assert_eq!(TetrominoType::I.rotation_offset(Rotation::South), -1);
        assert_eq!(TetrominoType::I.rotation_offset(Rotation::West), 1);
        assert_eq!(TetrominoType::I.rotation_offset(Rotation::North), -1);
        assert_eq!(TetrominoType::T.rotation_offset(Rotation::East), 0);
        assert_eq!(TetrominoType::O.rotation_offset(Rotation::East), 0);
    }

    #[test]
    fn test_rotation_cycle() {
        let mut r = Rotation::North;
        for expected in 1..=4 {
            r = r.cw();
            assert_eq!(r.index(), expected % 4);
        }
    }
}
