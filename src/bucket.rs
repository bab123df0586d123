//! Bucket geometry: a field whose usable width narrows toward the top

/// Usable width of the narrowest (top) row
pub const BUCKET_MIN_WIDTH: usize = 6;

/// Per-row valid width, interpolated linearly from `min_width` at row 0 to
/// the full field width at the bottom row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketShape {
    width: usize,
    height: usize,
    min_width: usize,
}

impl BucketShape {
    pub fn new(width: usize, height: usize, min_width: usize) -> Self {
        Self {
            width,
            height,
            min_width: min_width.min(width),
        }
    }

    /// Valid width of a row. Rows outside the field report the full width.
    pub fn row_width(&self, row: i32) -> usize {
        if row < 0 || row as usize >= self.height || self.height < 2 {
            return self.width;
        }
        let row = row as usize;
        self.min_width + (self.width - self.min_width) * row / (self.height - 1)
    }

    /// Half-open column range `[left, right)` that is usable on a row
    pub fn row_bounds(&self, row: i32) -> (usize, usize) {
        let width = self.row_width(row);
        let left = (self.width - width) / 2;
        (left, left + width)
    }

    /// Whether (row, col) lies inside the bucket's walls
    pub fn contains(&self, row: i32, col: i32) -> bool {
        if row < 0 || col < 0 || row as usize >= self.height {
            return false;
        }
        let (left, right) = self.row_bounds(row);
        (col as usize) >= left && (col as usize) < right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape() -> BucketShape {
        BucketShape::new(22, 22, BUCKET_MIN_WIDTH)
    }

    #[test]
    fn test_widths_interpolate() {
        let bucket = shape();
        assert_eq!(bucket.row_width(0), 6);
        assert_eq!(bucket.row_width(1), 6);
        assert_eq!(bucket.row_width(11), 6 + 16 * 11 / 21);
        assert_eq!(bucket.row_width(20), 21);
        assert_eq!(bucket.row_width(21), 22);
    }

    #[test]
    fn test_widths_never_shrink_downward() {
        let bucket = shape();
        for row in 1..22 {
            assert!(bucket.row_width(row) >= bucket.row_width(row - 1));
            let (left, right) = bucket.row_bounds(row);
            let (prev_left, prev_right) = bucket.row_bounds(row - 1);
            assert!(left <= prev_left && right >= prev_right);
        }
    }

    #[test]
    fn test_bounds_are_centred() {
        let bucket = shape();
        assert_eq!(bucket.row_bounds(0), (8, 14));
        assert_eq!(bucket.row_bounds(21), (0, 22));
    }

    #[test]
    fn test_contains() {
        let bucket = shape();
        assert!(bucket.contains(0, 8));
        assert!(bucket.contains(0, 13));
        assert!(!bucket.contains(0, 7));
        assert!(!bucket.contains(0, 14));
        assert!(!bucket.contains(-1, 10));
        assert!(!bucket.contains(22, 10));
    }

    #[test]
    fn test_out_of_range_rows_report_full_width() {
        let bucket = shape();
        assert_eq!(bucket.row_width(-3), 22);
        assert_eq!(bucket.row_width(40), 22);
    }
}
