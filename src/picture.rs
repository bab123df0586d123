//! Picture targets: a region of the field that has to be filled exactly

/// The pictures a player can choose from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PictureKind {
    #[default]
    Square,
    Diamond,
    House,
    Triangle,
}

impl PictureKind {
    pub fn all() -> [PictureKind; 4] {
        [
            PictureKind::Square,
            PictureKind::Diamond,
            PictureKind::House,
            PictureKind::Triangle,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            PictureKind::Square => "Square",
            PictureKind::Diamond => "Diamond",
            PictureKind::House => "House",
            PictureKind::Triangle => "Triangle",
        }
    }
}

/// Target and filled masks over the full grid, plus the violation flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictureTarget {
    kind: PictureKind,
    width: usize,
    height: usize,
    target: Vec<bool>,
    filled: Vec<bool>,
    violated: bool,
}

impl PictureTarget {
    /// Build the target mask for `kind` on a `width` x `height` walled grid.
    /// Only interior cells (inside the side walls, above the floor) are marked.
    pub fn new(kind: PictureKind, width: usize, height: usize) -> Self {
        let mut target = Self {
            kind,
            width,
            height,
            target: vec![false; width * height],
            filled: vec![false; width * height],
            violated: false,
        };
        match kind {
            PictureKind::Square => target.draw_square(),
            PictureKind::Diamond => target.draw_diamond(),
            PictureKind::House => target.draw_house(),
            PictureKind::Triangle => target.draw_triangle(),
        }
        target
    }

    pub fn kind(&self) -> PictureKind {
        self.kind
    }

    fn index(&self, row: i32, col: i32) -> Option<usize> {
        if row < 0 || col < 0 || row as usize >= self.height || col as usize >= self.width {
            return None;
        }
        Some(row as usize * self.width + col as usize)
    }

    fn mark(&mut self, row: i32, col: i32) {
        let interior = row >= 0
            && (row as usize) + 1 < self.height
            && col >= 1
            && (col as usize) + 1 < self.width;
        if !interior {
            return;
        }
        if let Some(i) = self.index(row, col) {
            self.target[i] = true;
        }
    }

    fn mark_span(&mut self, row: i32, start_col: i32, len: i32) {
        for col in start_col..start_col + len {
            self.mark(row, col);
        }
    }

    // 10x10 block centred on the floor
    fn draw_square(&mut self) {
        let side = 10;
        let start_col = (self.width as i32 - side) / 2;
        let start_row = self.height as i32 - 1 - side;
        for row in start_row..start_row + side {
            self.mark_span(row, start_col, side);
        }
    }

    // Rows widen linearly from a single cell at the apex to the base on the floor
    fn draw_triangle(&mut self) {
        let base = self.width as i32 - 3;
        let tall = self.height as i32 - 6;
        if base < 1 || tall < 1 {
            return;
        }
        let floor = self.height as i32 - 2;
        let start_row = floor - tall + 1;
        let start_col = (self.width as i32 - base) / 2;
        for i in 0..tall {
            let row_width = (i * base / tall).max(1);
            let col_start = start_col + (base - row_width) / 2;
            self.mark_span(start_row + i, col_start, row_width);
        }
    }

    fn draw_diamond(&mut self) {
        let half = 7;
        let centre_col = self.width as i32 / 2;
        let centre_row = self.height as i32 - 2 - half;
        for d in -half..=half {
            let reach = half - d.abs();
            self.mark_span(centre_row + d, centre_col - reach, 2 * reach + 1);
        }
    }

    // Body standing on the floor, with a stepped roof one cell wider on each side
    fn draw_house(&mut self) {
        let body_width = 12;
        let body_height = 6;
        let left = (self.width as i32 - body_width) / 2;
        let body_top = self.height as i32 - 1 - body_height;
        for row in body_top..body_top + body_height {
            self.mark_span(row, left, body_width);
        }
        for k in 0..6 {
            self.mark_span(body_top - 1 - k, left - 1 + k, body_width + 2 - 2 * k);
        }
    }

    pub fn is_target(&self, row: i32, col: i32) -> bool {
        self.index(row, col).is_some_and(|i| self.target[i])
    }

    pub fn is_filled(&self, row: i32, col: i32) -> bool {
        self.index(row, col).is_some_and(|i| self.filled[i])
    }

    /// Record a piece cell landing at (row, col).
    /// Returns true if the cell belongs to the picture; otherwise the
    /// target is marked as violated.
    pub fn record(&mut self, row: i32, col: i32) -> bool {
        match self.index(row, col) {
            Some(i) if self.target[i] => {
                self.filled[i] = true;
                true
            }
            _ => {
                self.violated = true;
                false
            }
        }
    }

    pub fn violate(&mut self) {
        self.violated = true;
    }

    pub fn is_violated(&self) -> bool {
        self.violated
    }

    /// Every target cell has been filled
    pub fn is_complete(&self) -> bool {
        self.target
            .iter()
            .zip(&self.filled)
            .all(|(&target, &filled)| !target || filled)
    }

    /// (filled, total) target cells
    pub fn progress(&self) -> (usize, usize) {
        let total = self.target.iter().filter(|&&t| t).count();
        let filled = self
            .target
            .iter()
            .zip(&self.filled)
            .filter(|&(&t, &f)| t && f)
            .count();
        (filled, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_mask() {
        let target = PictureTarget::new(PictureKind::Square, 22, 22);
        assert_eq!(target.progress(), (0, 100));
        assert!(target.is_target(11, 6));
        assert!(target.is_target(20, 15));
        assert!(!target.is_target(10, 6));
        assert!(!target.is_target(20, 16));
        assert!(!target.is_target(21, 10));
    }

    #[test]
    fn test_triangle_mask() {
        let target = PictureTarget::new(PictureKind::Triangle, 22, 22);
        // Apex row is a single cell, the bottom row is 17 wide
        assert!(target.is_target(5, 10));
        assert!(!target.is_target(5, 9));
        assert!(!target.is_target(4, 10));
        let bottom: usize = (0..22).filter(|&c| target.is_target(20, c)).count();
        assert_eq!(bottom, 15 * 19 / 16);
    }

    #[test]
    fn test_every_picture_stays_inside_walls() {
        for kind in PictureKind::all() {
            let target = PictureTarget::new(kind, 22, 22);
            let (_, total) = target.progress();
            assert!(total > 0, "{:?} is empty", kind);
            for i in 0..22 {
                assert!(!target.is_target(i, 0));
                assert!(!target.is_target(i, 21));
                assert!(!target.is_target(21, i));
            }
        }
    }

    #[test]
    fn test_diamond_and_house_shapes() {
        let diamond = PictureTarget::new(PictureKind::Diamond, 22, 22);
        assert!(diamond.is_target(20, 11));
        assert!(!diamond.is_target(20, 10));
        assert!(diamond.is_target(13, 4));
        assert!(diamond.is_target(13, 18));
        assert!(diamond.is_target(6, 11));

        let house = PictureTarget::new(PictureKind::House, 22, 22);
        assert!(house.is_target(20, 5));
        assert!(house.is_target(20, 16));
        assert!(!house.is_target(20, 4));
        assert!(house.is_target(14, 4));
        assert!(house.is_target(9, 9));
        assert!(!house.is_target(8, 10));
    }

    #[test]
    fn test_record_and_violation() {
        let mut target = PictureTarget::new(PictureKind::Square, 22, 22);
        assert!(target.record(11, 6));
        assert!(target.is_filled(11, 6));
        assert_eq!(target.progress(), (1, 100));
        assert!(!target.is_violated());

        assert!(!target.record(5, 5));
        assert!(target.is_violated());
        assert!(!target.is_complete());
    }

    #[test]
    fn test_complete_square() {
        let mut target = PictureTarget::new(PictureKind::Square, 22, 22);
        for row in 11..21 {
            for col in 6..16 {
                target.record(row, col);
            }
        }
        assert!(target.is_complete());
        assert!(!target.is_violated());
    }
}
