//! The mutable grid of string cells a tab owns, plus its change channel.

mod events;

pub use events::DocumentEvent;

use crate::codec::DelimiterFormat;
use crate::constants::{EMPTY_DOCUMENT_COLUMNS, EMPTY_DOCUMENT_ROWS};
use crate::error::{EditorError, Result};
use crate::types::GridPosition;
use regex::RegexBuilder;
use std::path::{Path, PathBuf};

#[cfg(test)]
mod tests;

/// One cell: the string value plus view-only projection flags. The flags are
/// derived state (selection and search overlays); they never dirty the
/// document and never serialize.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub value: String,
    pub is_selected: bool,
    pub is_search_match: bool,
    pub is_current_search_match: bool,
}

impl Cell {
    pub fn new(value: impl Into<String>) -> Self {
        Cell {
            value: value.into(),
            ..Cell::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    fn blank(columns: usize) -> Self {
        Row {
            cells: vec![Cell::default(); columns],
        }
    }

    fn from_values(values: Vec<String>) -> Self {
        Row {
            cells: values.into_iter().map(Cell::new).collect(),
        }
    }

    fn values(&self) -> Vec<String> {
        self.cells.iter().map(|cell| cell.value.clone()).collect()
    }
}

type DocumentListener = Box<dyn Fn(&DocumentEvent)>;

/// A dense grid of rows x cells. All mutation goes through the methods below
/// so every change marks the dirty flag and lands on the event channel while
/// the call is still on the stack.
pub struct Document {
    rows: Vec<Row>,
    file_path: Option<PathBuf>,
    delimiter: DelimiterFormat,
    dirty: bool,
    parse_warning: Option<String>,
    listeners: Vec<DocumentListener>,
}

impl Document {
    /// Blank unsaved document at the default extents.
    pub fn create_empty() -> Self {
        let mut doc = Document::with_delimiter(DelimiterFormat::Tab);
        doc.rows = (0..EMPTY_DOCUMENT_ROWS)
            .map(|_| Row::blank(EMPTY_DOCUMENT_COLUMNS))
            .collect();
        doc
    }

    pub fn with_delimiter(delimiter: DelimiterFormat) -> Self {
        Document {
            rows: Vec::new(),
            file_path: None,
            delimiter,
            dirty: false,
            parse_warning: None,
            listeners: Vec::new(),
        }
    }

    /// Build from raw values, padding ragged rows dense. Used by the codec
    /// and by tests.
    pub fn from_values(values: Vec<Vec<String>>, delimiter: DelimiterFormat) -> Self {
        let mut doc = Document::with_delimiter(delimiter);
        doc.rows = values.into_iter().map(Row::from_values).collect();
        doc.normalize_column_count();
        doc
    }

    pub fn subscribe(&mut self, listener: DocumentListener) {
        self.listeners.push(listener);
    }

    fn emit(&self, event: DocumentEvent) {
        for listener in &self.listeners {
            listener(&event);
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Defined as the maximum cell count across rows; after
    /// `normalize_column_count` every row has exactly this many cells.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|row| row.cells.len()).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn set_file_path(&mut self, path: Option<PathBuf>) {
        self.file_path = path;
    }

    pub fn delimiter(&self) -> DelimiterFormat {
        self.delimiter
    }

    pub fn set_delimiter(&mut self, delimiter: DelimiterFormat) {
        self.delimiter = delimiter;
    }

    pub fn parse_warning(&self) -> Option<&str> {
        self.parse_warning.as_deref()
    }

    pub fn set_parse_warning(&mut self, warning: Option<String>) {
        self.parse_warning = warning;
    }

    pub fn cell(&self, pos: GridPosition) -> Option<&Cell> {
        self.rows.get(pos.row).and_then(|row| row.cells.get(pos.column))
    }

    fn cell_mut(&mut self, pos: GridPosition) -> Option<&mut Cell> {
        self.rows
            .get_mut(pos.row)
            .and_then(|row| row.cells.get_mut(pos.column))
    }

    pub fn get_cell(&self, pos: GridPosition) -> Result<&str> {
        self.cell(pos)
            .map(|cell| cell.value.as_str())
            .ok_or(EditorError::out_of_bounds(pos.row, pos.column))
    }

    /// Set a cell value, marking the document dirty.
    pub fn set_cell(&mut self, pos: GridPosition, value: impl Into<String>) -> Result<()> {
        let cell = self
            .cell_mut(pos)
            .ok_or(EditorError::out_of_bounds(pos.row, pos.column))?;
        cell.value = value.into();
        self.dirty = true;
        self.emit(DocumentEvent::CellChanged { position: pos });
        Ok(())
    }

    /// Insert a blank row; `index == row_count` appends.
    pub fn insert_row(&mut self, index: usize) -> Result<()> {
        self.insert_row_with(index, Vec::new())
    }

    pub fn insert_row_with(&mut self, index: usize, values: Vec<String>) -> Result<()> {
        if index > self.rows.len() {
            return Err(EditorError::out_of_bounds(index, 0));
        }
        let columns = self.column_count();
        let mut row = Row::from_values(values);
        if row.cells.len() < columns {
            row.cells.resize_with(columns, Cell::default);
        }
        self.rows.insert(index, row);
        // A wider inserted row widens the whole grid.
        self.normalize_column_count();
        self.dirty = true;
        self.emit(DocumentEvent::RowInserted { index });
        Ok(())
    }

    /// Remove a row, returning its values for undo capture. Subsequent rows
    /// renumber; deleting the only row leaves a zero-row document.
    pub fn delete_row(&mut self, index: usize) -> Result<Vec<String>> {
        if index >= self.rows.len() {
            return Err(EditorError::out_of_bounds(index, 0));
        }
        let removed = self.rows.remove(index);
        self.dirty = true;
        self.emit(DocumentEvent::RowDeleted { index });
        Ok(removed.values())
    }

    pub fn insert_column(&mut self, index: usize) -> Result<()> {
        self.insert_column_with(index, Vec::new())
    }

    pub fn insert_column_with(&mut self, index: usize, values: Vec<String>) -> Result<()> {
        if index > self.column_count() {
            return Err(EditorError::out_of_bounds(0, index));
        }
        for (i, row) in self.rows.iter_mut().enumerate() {
            let value = values.get(i).cloned().unwrap_or_default();
            row.cells.insert(index, Cell::new(value));
        }
        self.dirty = true;
        self.emit(DocumentEvent::ColumnInserted { index });
        Ok(())
    }

    pub fn delete_column(&mut self, index: usize) -> Result<Vec<String>> {
        if index >= self.column_count() {
            return Err(EditorError::out_of_bounds(0, index));
        }
        let mut removed = Vec::with_capacity(self.rows.len());
        for row in &mut self.rows {
            if index < row.cells.len() {
                removed.push(row.cells.remove(index).value);
            } else {
                removed.push(String::new());
            }
        }
        self.dirty = true;
        self.emit(DocumentEvent::ColumnDeleted { index });
        Ok(removed)
    }

    /// Stable, case-sensitive lexicographic sort on the given column. Rows
    /// missing a cell there sort as the empty string.
    pub fn sort_by_column(&mut self, index: usize, ascending: bool) -> Result<()> {
        if index >= self.column_count() {
            return Err(EditorError::out_of_bounds(0, index));
        }
        let key = |row: &Row| -> String {
            row.cells
                .get(index)
                .map(|cell| cell.value.clone())
                .unwrap_or_default()
        };
        if ascending {
            self.rows.sort_by(|a, b| key(a).cmp(&key(b)));
        } else {
            self.rows.sort_by(|a, b| key(b).cmp(&key(a)));
        }
        self.dirty = true;
        self.emit(DocumentEvent::Sorted { column: index });
        Ok(())
    }

    /// All positions whose value matches, in row-major order. Substring mode
    /// cannot fail; regex mode reports `BadPattern` on a malformed pattern.
    pub fn find_matches(
        &self,
        pattern: &str,
        is_regex: bool,
        case_sensitive: bool,
    ) -> Result<Vec<GridPosition>> {
        if pattern.is_empty() {
            return Ok(Vec::new());
        }
        let mut matches = Vec::new();
        if is_regex {
            let re = RegexBuilder::new(pattern)
                .case_insensitive(!case_sensitive)
                .build()
                .map_err(|e| EditorError::BadPattern(e.to_string()))?;
            for (r, row) in self.rows.iter().enumerate() {
                for (c, cell) in row.cells.iter().enumerate() {
                    if re.is_match(&cell.value) {
                        matches.push(GridPosition::new(r, c));
                    }
                }
            }
        } else {
            let needle = if case_sensitive {
                pattern.to_string()
            } else {
                pattern.to_lowercase()
            };
            for (r, row) in self.rows.iter().enumerate() {
                for (c, cell) in row.cells.iter().enumerate() {
                    let hit = if case_sensitive {
                        cell.value.contains(&needle)
                    } else {
                        cell.value.to_lowercase().contains(&needle)
                    };
                    if hit {
                        matches.push(GridPosition::new(r, c));
                    }
                }
            }
        }
        Ok(matches)
    }

    /// Grow to at least the given extents, padding with empty cells. Shrinks
    /// nothing and does not dirty the document by itself; the command driving
    /// the growth is responsible for capturing the prior extents.
    pub fn ensure_size(&mut self, min_rows: usize, min_cols: usize) {
        let grew = min_rows > self.rows.len() || min_cols > self.column_count();
        let columns = self.column_count().max(min_cols);
        for row in &mut self.rows {
            if row.cells.len() < columns {
                row.cells.resize_with(columns, Cell::default);
            }
        }
        while self.rows.len() < min_rows {
            self.rows.push(Row::blank(columns));
        }
        if grew {
            self.emit(DocumentEvent::Resized {
                rows: self.rows.len(),
                columns,
            });
        }
    }

    /// Shrink back to the given extents, dropping padded rows/columns. Only
    /// sensible while undoing a command that recorded the prior size.
    pub fn truncate_to(&mut self, rows: usize, columns: usize) {
        self.rows.truncate(rows);
        for row in &mut self.rows {
            row.cells.truncate(columns);
        }
        self.emit(DocumentEvent::Resized { rows, columns });
    }

    /// Pad ragged rows out to the widest row.
    pub fn normalize_column_count(&mut self) {
        let columns = self.column_count();
        for row in &mut self.rows {
            if row.cells.len() < columns {
                row.cells.resize_with(columns, Cell::default);
            }
        }
    }

    pub fn row_values(&self, index: usize) -> Result<Vec<String>> {
        self.rows
            .get(index)
            .map(Row::values)
            .ok_or(EditorError::out_of_bounds(index, 0))
    }

    pub fn column_values(&self, index: usize) -> Result<Vec<String>> {
        if index >= self.column_count() {
            return Err(EditorError::out_of_bounds(0, index));
        }
        Ok(self
            .rows
            .iter()
            .map(|row| {
                row.cells
                    .get(index)
                    .map(|cell| cell.value.clone())
                    .unwrap_or_default()
            })
            .collect())
    }

    /// Snapshot of every value, for the codec and for observational equality
    /// in tests.
    pub fn values(&self) -> Vec<Vec<String>> {
        self.rows.iter().map(Row::values).collect()
    }

    // Projection flag setters. Out-of-range positions are ignored: the
    // overlays may briefly hold positions from before a structural change.

    pub fn set_selected(&mut self, pos: GridPosition, selected: bool) {
        if let Some(cell) = self.cell_mut(pos) {
            cell.is_selected = selected;
        }
    }

    pub fn set_search_match(&mut self, pos: GridPosition, matched: bool) {
        if let Some(cell) = self.cell_mut(pos) {
            cell.is_search_match = matched;
        }
    }

    pub fn set_current_search_match(&mut self, pos: GridPosition, current: bool) {
        if let Some(cell) = self.cell_mut(pos) {
            cell.is_current_search_match = current;
        }
    }
}
