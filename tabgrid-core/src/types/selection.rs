use super::position::GridPosition;
use serde::{Deserialize, Serialize};

/// How a selection was made, which also determines paste semantics for
/// content yanked out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionKind {
    /// Cell-wise rectangle between two corners (`v`).
    Character,
    /// Whole rows spanning every column (`V`).
    Line,
    /// Rectangular block (`Ctrl+v`).
    Block,
}

/// A visual selection anchored at `start` with the head at `end`. Both ends
/// are inclusive; accessors below hand out the normalized (sorted) bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRange {
    pub kind: SelectionKind,
    pub start: GridPosition,
    pub end: GridPosition,
}

impl SelectionRange {
    pub fn new(kind: SelectionKind, start: GridPosition, end: GridPosition) -> Self {
        SelectionRange { kind, start, end }
    }

    /// Collapsed single-cell selection.
    pub fn cell(kind: SelectionKind, at: GridPosition) -> Self {
        SelectionRange::new(kind, at, at)
    }

    pub fn start_row(&self) -> usize {
        self.start.row.min(self.end.row)
    }

    pub fn end_row(&self) -> usize {
        self.start.row.max(self.end.row)
    }

    /// Leftmost selected column. `Line` selections always begin at column 0.
    pub fn start_column(&self) -> usize {
        match self.kind {
            SelectionKind::Line => 0,
            _ => self.start.column.min(self.end.column),
        }
    }

    /// Rightmost selected column; `Line` selections extend to the last
    /// document column, which the caller supplies.
    pub fn end_column(&self, document_columns: usize) -> usize {
        match self.kind {
            SelectionKind::Line => document_columns.saturating_sub(1),
            _ => self.start.column.max(self.end.column),
        }
    }

    pub fn row_count(&self) -> usize {
        self.end_row() - self.start_row() + 1
    }

    pub fn column_count(&self, document_columns: usize) -> usize {
        self.end_column(document_columns) + 1 - self.start_column()
    }

    /// Top-left corner of the normalized bounds.
    pub fn origin(&self) -> GridPosition {
        GridPosition::new(self.start_row(), self.start_column())
    }

    pub fn contains(&self, pos: GridPosition, document_columns: usize) -> bool {
        pos.row >= self.start_row()
            && pos.row <= self.end_row()
            && pos.column >= self.start_column()
            && pos.column <= self.end_column(document_columns)
    }

    /// Every covered position in row-major order.
    pub fn positions(&self, document_columns: usize) -> Vec<GridPosition> {
        let mut out =
            Vec::with_capacity(self.row_count() * self.column_count(document_columns).max(1));
        for row in self.start_row()..=self.end_row() {
            for column in self.start_column()..=self.end_column(document_columns) {
                out.push(GridPosition::new(row, column));
            }
        }
        out
    }

    /// Swap anchor and head (visual mode `o`).
    pub fn swapped(&self) -> SelectionRange {
        SelectionRange::new(self.kind, self.end, self.start)
    }

    /// Same anchor, new head.
    pub fn with_head(&self, head: GridPosition) -> SelectionRange {
        SelectionRange::new(self.kind, self.start, head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_bounds() {
        let range = SelectionRange::new(
            SelectionKind::Character,
            GridPosition::new(3, 4),
            GridPosition::new(1, 2),
        );
        assert_eq!(range.start_row(), 1);
        assert_eq!(range.end_row(), 3);
        assert_eq!(range.start_column(), 2);
        assert_eq!(range.end_column(10), 4);
        assert_eq!(range.row_count(), 3);
        assert_eq!(range.column_count(10), 3);
    }

    #[test]
    fn test_line_spans_all_columns() {
        let range = SelectionRange::new(
            SelectionKind::Line,
            GridPosition::new(2, 5),
            GridPosition::new(0, 1),
        );
        assert_eq!(range.start_column(), 0);
        assert_eq!(range.end_column(8), 7);
        assert_eq!(range.column_count(8), 8);
        assert!(range.contains(GridPosition::new(1, 7), 8));
        assert!(!range.contains(GridPosition::new(3, 0), 8));
    }

    #[test]
    fn test_block_positions_row_major() {
        let range = SelectionRange::new(
            SelectionKind::Block,
            GridPosition::new(1, 1),
            GridPosition::new(0, 0),
        );
        assert_eq!(
            range.positions(5),
            vec![
                GridPosition::new(0, 0),
                GridPosition::new(0, 1),
                GridPosition::new(1, 0),
                GridPosition::new(1, 1),
            ]
        );
    }

    #[test]
    fn test_swap_keeps_coverage() {
        let range = SelectionRange::new(
            SelectionKind::Character,
            GridPosition::new(0, 0),
            GridPosition::new(2, 2),
        );
        let swapped = range.swapped();
        assert_eq!(swapped.start, GridPosition::new(2, 2));
        assert_eq!(swapped.end, GridPosition::new(0, 0));
        assert_eq!(swapped.positions(3), range.positions(3));
    }
}
