use serde::{Deserialize, Serialize};
use std::fmt;

/// A zero-based cell coordinate. Ordering is row-major so that sorted
/// position lists iterate the grid top-to-bottom, left-to-right.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct GridPosition {
    pub row: usize,
    pub column: usize,
}

impl GridPosition {
    pub fn new(row: usize, column: usize) -> Self {
        GridPosition { row, column }
    }

    /// Whether this position addresses an existing cell of a `rows` x `columns`
    /// grid.
    pub fn is_within(&self, rows: usize, columns: usize) -> bool {
        self.row < rows && self.column < columns
    }

    /// Clamp into a `rows` x `columns` grid. An empty grid clamps to the
    /// origin.
    pub fn clamped(&self, rows: usize, columns: usize) -> GridPosition {
        GridPosition {
            row: self.row.min(rows.saturating_sub(1)),
            column: self.column.min(columns.saturating_sub(1)),
        }
    }

    pub fn up(&self, n: usize) -> GridPosition {
        GridPosition::new(self.row.saturating_sub(n), self.column)
    }

    pub fn down(&self, n: usize, rows: usize) -> GridPosition {
        GridPosition::new((self.row + n).min(rows.saturating_sub(1)), self.column)
    }

    pub fn left(&self, n: usize) -> GridPosition {
        GridPosition::new(self.row, self.column.saturating_sub(n))
    }

    pub fn right(&self, n: usize, columns: usize) -> GridPosition {
        GridPosition::new(self.row, (self.column + n).min(columns.saturating_sub(1)))
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motion_helpers_clamp() {
        let pos = GridPosition::new(0, 0);
        assert_eq!(pos.up(5), GridPosition::new(0, 0));
        assert_eq!(pos.left(5), GridPosition::new(0, 0));
        assert_eq!(pos.down(2, 10), GridPosition::new(2, 0));
        assert_eq!(pos.down(100, 10), GridPosition::new(9, 0));
        assert_eq!(pos.right(100, 4), GridPosition::new(0, 3));
    }

    #[test]
    fn test_clamped_on_empty_grid() {
        let pos = GridPosition::new(7, 7);
        assert_eq!(pos.clamped(0, 0), GridPosition::new(0, 0));
        assert_eq!(pos.clamped(3, 2), GridPosition::new(2, 1));
    }

    #[test]
    fn test_row_major_ordering() {
        let mut positions = vec![
            GridPosition::new(1, 0),
            GridPosition::new(0, 2),
            GridPosition::new(0, 1),
        ];
        positions.sort();
        assert_eq!(
            positions,
            vec![
                GridPosition::new(0, 1),
                GridPosition::new(0, 2),
                GridPosition::new(1, 0),
            ]
        );
    }

    #[test]
    fn test_is_within() {
        assert!(GridPosition::new(0, 0).is_within(1, 1));
        assert!(!GridPosition::new(1, 0).is_within(1, 1));
        assert!(!GridPosition::new(0, 1).is_within(1, 1));
    }
}
