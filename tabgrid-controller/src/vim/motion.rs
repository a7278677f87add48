//! Cursor motions. Every motion clamps inside the document, so applying one
//! never produces an invalid cursor; on an empty document everything
//! collapses to the origin.

use serde::{Deserialize, Serialize};
use tabgrid_core::{Document, GridPosition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Motion {
    Left(usize),
    Right(usize),
    Up(usize),
    Down(usize),
    /// `w`: next cell; the word unit of a grid is one cell.
    WordForward(usize),
    /// `b`
    WordBackward(usize),
    /// `0` / `^`
    LineStart,
    /// `$`
    LineEnd,
    /// `gg`
    FirstRow,
    /// `G`
    LastRow,
    /// `[count]G` / `[count]gg`
    GotoRow(usize),
    HalfPageUp(usize),
    HalfPageDown(usize),
    PageUp(usize),
    PageDown(usize),
    /// `}`: next boundary row, where a boundary is a row whose cell in the
    /// cursor column is empty (the blank-line analogue).
    ParagraphForward(usize),
    /// `{`
    ParagraphBackward(usize),
}

impl Motion {
    /// Compute the destination. `viewport_rows` drives the page motions.
    pub fn apply(
        &self,
        from: GridPosition,
        document: &Document,
        viewport_rows: usize,
    ) -> GridPosition {
        let rows = document.row_count();
        let columns = document.column_count();
        if rows == 0 || columns == 0 {
            return GridPosition::new(0, 0);
        }
        let half_page = (viewport_rows / 2).max(1);
        let page = viewport_rows.max(1);

        match *self {
            Motion::Left(n) => from.left(n),
            Motion::Right(n) => from.right(n, columns),
            Motion::Up(n) => from.up(n),
            Motion::Down(n) => from.down(n, rows),
            Motion::WordForward(n) => from.right(n, columns),
            Motion::WordBackward(n) => from.left(n),
            Motion::LineStart => GridPosition::new(from.row, 0),
            Motion::LineEnd => GridPosition::new(from.row, columns - 1),
            Motion::FirstRow => GridPosition::new(0, from.column),
            Motion::LastRow => GridPosition::new(rows - 1, from.column),
            Motion::GotoRow(row) => GridPosition::new(row.min(rows - 1), from.column),
            Motion::HalfPageUp(n) => from.up(half_page * n),
            Motion::HalfPageDown(n) => from.down(half_page * n, rows),
            Motion::PageUp(n) => from.up(page * n),
            Motion::PageDown(n) => from.down(page * n, rows),
            Motion::ParagraphForward(n) => {
                let mut at = from;
                for _ in 0..n {
                    at = next_boundary_down(at, document);
                }
                at
            }
            Motion::ParagraphBackward(n) => {
                let mut at = from;
                for _ in 0..n {
                    at = next_boundary_up(at, document);
                }
                at
            }
        }
    }
}

fn cell_is_empty(document: &Document, row: usize, column: usize) -> bool {
    document
        .get_cell(GridPosition::new(row, column))
        .map(str::is_empty)
        .unwrap_or(true)
}

fn next_boundary_down(from: GridPosition, document: &Document) -> GridPosition {
    let rows = document.row_count();
    for row in from.row + 1..rows {
        if cell_is_empty(document, row, from.column) {
            return GridPosition::new(row, from.column);
        }
    }
    GridPosition::new(rows.saturating_sub(1), from.column)
}

fn next_boundary_up(from: GridPosition, document: &Document) -> GridPosition {
    for row in (0..from.row).rev() {
        if cell_is_empty(document, row, from.column) {
            return GridPosition::new(row, from.column);
        }
    }
    GridPosition::new(0, from.column)
}
