//! Playfield: occupancy, walls, placement and line clearing

use crate::bucket::{BUCKET_MIN_WIDTH, BucketShape};
use crate::picture::{PictureKind, PictureTarget};
use crate::piece::Piece;
use crate::tetromino::TetrominoType;
use ratatui::style::Color;

/// Field dimensions, walls included
pub const FIELD_WIDTH: usize = 22;
pub const FIELD_HEIGHT: usize = 22;

/// Colour reported for walls and for anything off the grid
pub const BOUNDARY_COLOR: Color = Color::Gray;

/// A cell on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    /// Part of the field boundary, never cleared
    Wall,
    Filled(TetrominoType),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_wall(&self) -> bool {
        matches!(self, Cell::Wall)
    }

    pub fn color(&self) -> Option<Color> {
        match self {
            Cell::Empty => None,
            Cell::Wall => Some(BOUNDARY_COLOR),
            Cell::Filled(kind) => Some(kind.color()),
        }
    }
}

/// The geometry variants a board can have
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldShape {
    /// Straight side walls and a floor
    Rectangular,
    /// Walls that close in toward the top
    Bucket(BucketShape),
    /// Rectangular walls plus a picture that has to be filled exactly
    Picture(PictureTarget),
}

/// The game board
#[derive(Debug, Clone)]
pub struct Board {
    width: usize,
    height: usize,
    /// Row-major, row 0 is the top
    cells: Vec<Cell>,
    shape: FieldShape,
}

impl Default for Board {
    fn default() -> Self {
        Self::rectangular()
    }
}

impl Board {
    /// A 22x22 field with walls on both sides and along the bottom
    pub fn rectangular() -> Self {
        Self::walled(FIELD_WIDTH, FIELD_HEIGHT, FieldShape::Rectangular)
    }

    /// A 22x22 field narrowing from full width at the floor to six columns at the top
    pub fn bucket() -> Self {
        let bucket = BucketShape::new(FIELD_WIDTH, FIELD_HEIGHT, BUCKET_MIN_WIDTH);
        let mut board = Self {
            width: FIELD_WIDTH,
            height: FIELD_HEIGHT,
            cells: vec![Cell::Empty; FIELD_WIDTH * FIELD_HEIGHT],
            shape: FieldShape::Bucket(bucket),
        };
        for row in 0..FIELD_HEIGHT as i32 {
            for col in 0..FIELD_WIDTH as i32 {
                let floor = row as usize == FIELD_HEIGHT - 1;
                if floor || !bucket.contains(row, col) {
                    board.set(row, col, Cell::Wall);
                }
            }
        }
        board
    }

    /// A rectangular field carrying the target mask of `kind`
    pub fn picture(kind: PictureKind) -> Self {
        let target = PictureTarget::new(kind, FIELD_WIDTH, FIELD_HEIGHT);
        Self::walled(FIELD_WIDTH, FIELD_HEIGHT, FieldShape::Picture(target))
    }

    fn walled(width: usize, height: usize, shape: FieldShape) -> Self {
        let mut board = Self {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
            shape,
        };
        for i in 0..width.max(height) as i32 {
            board.set(height as i32 - 1, i, Cell::Wall);
            board.set(i, 0, Cell::Wall);
            board.set(i, width as i32 - 1, Cell::Wall);
        }
        board
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn shape(&self) -> &FieldShape {
        &self.shape
    }

    fn index(&self, row: i32, col: i32) -> Option<usize> {
        if row < 0 || col < 0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        if row >= self.height || col >= self.width {
            return None;
        }
        Some(row * self.width + col)
    }

    /// Get the cell at a position (row, col)
    /// Returns None if out of bounds
    pub fn get(&self, row: i32, col: i32) -> Option<Cell> {
        self.index(row, col).map(|i| self.cells[i])
    }

    /// Set a cell at a position
    /// Returns false if out of bounds
    pub fn set(&mut self, row: i32, col: i32, cell: Cell) -> bool {
        match self.index(row, col) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    /// Whether a cell blocks movement. Anything off the grid is occupied.
    pub fn is_occupied(&self, row: i32, col: i32) -> bool {
        self.get(row, col).is_none_or(|cell| !cell.is_empty())
    }

    /// Colour of a cell, `None` for empty cells
    pub fn color(&self, row: i32, col: i32) -> Option<Color> {
        match self.get(row, col) {
            Some(cell) => cell.color(),
            None => Some(BOUNDARY_COLOR),
        }
    }

    /// Whether a piece cell may ever sit at (row, col)
    pub fn is_valid_position(&self, row: i32, col: i32) -> bool {
        match &self.shape {
            FieldShape::Bucket(bucket) => bucket.contains(row, col),
            FieldShape::Rectangular | FieldShape::Picture(_) => self.index(row, col).is_some(),
        }
    }

    /// Usable width of a row
    pub fn row_valid_width(&self, row: i32) -> usize {
        match &self.shape {
            FieldShape::Bucket(bucket) => bucket.row_width(row),
            FieldShape::Rectangular | FieldShape::Picture(_) => self.width,
        }
    }

    /// Half-open column range that has to be filled for a row to clear
    pub fn line_span(&self, row: i32) -> (usize, usize) {
        match &self.shape {
            FieldShape::Bucket(bucket) => bucket.row_bounds(row),
            FieldShape::Rectangular | FieldShape::Picture(_) => (1, self.width.saturating_sub(1)),
        }
    }

    /// Write a piece into the board with the piece's colour.
    ///
    /// Rectangular boards write every on-grid cell; bucket boards skip cells
    /// outside a row's walls; picture boards also record each cell against
    /// the target and flag any cell that misses it.
    pub fn place_figure(&mut self, piece: &Piece) {
        let kind = piece.kind();
        for (row, col) in piece.blocks() {
            let valid = self.is_valid_position(row, col);
            if let FieldShape::Picture(target) = &mut self.shape {
                if valid {
                    target.record(row, col);
                } else {
                    target.violate();
                }
            }
            if valid && !self.get(row, col).is_some_and(|cell| cell.is_wall()) {
                self.set(row, col, Cell::Filled(kind));
            }
        }
    }

    /// Clear completed lines and return the number cleared.
    ///
    /// Scans upward from the row above the floor. A cleared row is
    /// re-examined, since the row above has just moved into it.
    pub fn clear_full_lines(&mut self) -> usize {
        let mut lines_cleared = 0;
        let mut row = self.height as i32 - 2;
        while row >= 1 {
            if self.is_line_full(row) {
                lines_cleared += 1;
                self.collapse_onto(row);
            } else {
                row -= 1;
            }
        }
        lines_cleared
    }

    /// Check if every cell of a row's span is occupied
    fn is_line_full(&self, row: i32) -> bool {
        let (left, right) = self.line_span(row);
        left < right && (left..right).all(|col| self.is_occupied(row, col as i32))
    }

    /// Shift everything above `row` down by one, then empty the top row.
    /// Columns the row above does not span are emptied.
    fn collapse_onto(&mut self, row: i32) {
        for dest in (1..=row).rev() {
            let (left, right) = self.line_span(dest);
            let (src_left, src_right) = self.line_span(dest - 1);
            for col in left..right {
                let cell = if (src_left..src_right).contains(&col) {
                    self.get(dest - 1, col as i32).unwrap_or_default()
                } else {
                    Cell::Empty
                };
                self.set(dest, col as i32, cell);
            }
        }
        let (left, right) = self.line_span(0);
        for col in left..right {
            self.set(0, col as i32, Cell::Empty);
        }
    }

    pub fn as_picture(&self) -> Option<&PictureTarget> {
        match &self.shape {
            FieldShape::Picture(target) => Some(target),
            _ => None,
        }
    }

    /// A piece has touched a cell outside the picture (picture boards only)
    pub fn is_boundary_violated(&self) -> bool {
        self.as_picture().is_some_and(|target| target.is_violated())
    }

    /// Every target cell is filled (picture boards only)
    pub fn is_picture_complete(&self) -> bool {
        self.as_picture().is_some_and(|target| target.is_complete())
    }

    /// Iterate over rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width)
    }
}
