use crate::document::Document;
use crate::error::{EditorError, Result};
use crate::types::{GridPosition, SelectionKind, SelectionRange, YankedContent};
use std::collections::BTreeMap;

/// Prior state a region-mutating command captures on first execute: the
/// overwritten values plus the document extents before any implicit growth,
/// so undo can shrink back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRegion {
    pub origin: GridPosition,
    pub values: Vec<Vec<String>>,
    pub prior_rows: usize,
    pub prior_columns: usize,
}

/// An invertible mutation of a [`Document`]. Executing captures whatever
/// prior state undo needs; a later re-execute (redo) reuses the capture
/// instead of re-reading it.
#[derive(Debug, Clone, PartialEq)]
pub enum EditCommand {
    EditCell {
        position: GridPosition,
        new_value: String,
        old_value: Option<String>,
    },
    BulkEditCells {
        new_values: BTreeMap<GridPosition, String>,
        old_values: BTreeMap<GridPosition, String>,
    },
    InsertRow {
        index: usize,
        values: Option<Vec<String>>,
    },
    DeleteRow {
        index: usize,
        removed: Option<Vec<String>>,
    },
    InsertColumn {
        index: usize,
        values: Option<Vec<String>>,
    },
    DeleteColumn {
        index: usize,
        removed: Option<Vec<String>>,
    },
    Paste {
        at: GridPosition,
        content: YankedContent,
        before: bool,
        captured: Option<CapturedRegion>,
    },
    PasteOverSelection {
        range: SelectionRange,
        content: YankedContent,
        captured: Option<CapturedRegion>,
    },
    DeleteSelection {
        range: SelectionRange,
        captured: Option<CapturedRegion>,
    },
}

impl EditCommand {
    pub fn edit_cell(position: GridPosition, new_value: impl Into<String>) -> Self {
        EditCommand::EditCell {
            position,
            new_value: new_value.into(),
            old_value: None,
        }
    }

    /// Cell edit whose effect already happened (view data binding); the
    /// pre-image comes in from the caller instead of being captured.
    pub fn edit_cell_executed(
        position: GridPosition,
        new_value: impl Into<String>,
        old_value: impl Into<String>,
    ) -> Self {
        EditCommand::EditCell {
            position,
            new_value: new_value.into(),
            old_value: Some(old_value.into()),
        }
    }

    pub fn bulk_edit(new_values: BTreeMap<GridPosition, String>) -> Self {
        EditCommand::BulkEditCells {
            new_values,
            old_values: BTreeMap::new(),
        }
    }

    pub fn insert_row(index: usize) -> Self {
        EditCommand::InsertRow {
            index,
            values: None,
        }
    }

    pub fn delete_row(index: usize) -> Self {
        EditCommand::DeleteRow {
            index,
            removed: None,
        }
    }

    pub fn insert_column(index: usize) -> Self {
        EditCommand::InsertColumn {
            index,
            values: None,
        }
    }

    pub fn delete_column(index: usize) -> Self {
        EditCommand::DeleteColumn {
            index,
            removed: None,
        }
    }

    pub fn paste(at: GridPosition, content: YankedContent, before: bool) -> Self {
        EditCommand::Paste {
            at,
            content,
            before,
            captured: None,
        }
    }

    pub fn paste_over_selection(range: SelectionRange, content: YankedContent) -> Self {
        EditCommand::PasteOverSelection {
            range,
            content,
            captured: None,
        }
    }

    pub fn delete_selection(range: SelectionRange) -> Self {
        EditCommand::DeleteSelection {
            range,
            captured: None,
        }
    }

    pub fn description(&self) -> String {
        match self {
            EditCommand::EditCell { position, .. } => format!("edit cell {position}"),
            EditCommand::BulkEditCells { new_values, .. } => {
                format!("edit {} cells", new_values.len())
            }
            EditCommand::InsertRow { index, .. } => format!("insert row {index}"),
            EditCommand::DeleteRow { index, .. } => format!("delete row {index}"),
            EditCommand::InsertColumn { index, .. } => format!("insert column {index}"),
            EditCommand::DeleteColumn { index, .. } => format!("delete column {index}"),
            EditCommand::Paste { at, .. } => format!("paste at {at}"),
            EditCommand::PasteOverSelection { .. } => "paste over selection".to_string(),
            EditCommand::DeleteSelection { range, .. } => match range.kind {
                SelectionKind::Line => format!("delete rows {}..{}", range.start_row(), range.end_row()),
                _ => "delete selection".to_string(),
            },
        }
    }

    pub fn execute(&mut self, document: &mut Document) -> Result<()> {
        match self {
            EditCommand::EditCell {
                position,
                new_value,
                old_value,
            } => {
                if old_value.is_none() {
                    *old_value = Some(document.get_cell(*position)?.to_string());
                }
                document.set_cell(*position, new_value.clone())
            }

            EditCommand::BulkEditCells {
                new_values,
                old_values,
            } => {
                if old_values.is_empty() {
                    for pos in new_values.keys() {
                        old_values.insert(*pos, document.get_cell(*pos)?.to_string());
                    }
                }
                for (pos, value) in new_values.iter() {
                    document.set_cell(*pos, value.clone())?;
                }
                Ok(())
            }

            EditCommand::InsertRow { index, values } => {
                document.insert_row_with(*index, values.clone().unwrap_or_default())
            }

            EditCommand::DeleteRow { index, removed } => {
                let values = document.delete_row(*index)?;
                if removed.is_none() {
                    *removed = Some(values);
                }
                Ok(())
            }

            EditCommand::InsertColumn { index, values } => {
                document.insert_column_with(*index, values.clone().unwrap_or_default())
            }

            EditCommand::DeleteColumn { index, removed } => {
                let values = document.delete_column(*index)?;
                if removed.is_none() {
                    *removed = Some(values);
                }
                Ok(())
            }

            EditCommand::Paste {
                at,
                content,
                before,
                captured,
            } => execute_paste(document, *at, content, *before, captured),

            EditCommand::PasteOverSelection {
                range,
                content,
                captured,
            } => execute_paste_over(document, *range, content, captured),

            EditCommand::DeleteSelection { range, captured } => {
                execute_delete_selection(document, *range, captured)
            }
        }
    }

    pub fn undo(&self, document: &mut Document) -> Result<()> {
        match self {
            EditCommand::EditCell {
                position,
                old_value,
                ..
            } => {
                let old = require_captured(old_value.as_ref(), "EditCell")?;
                document.set_cell(*position, old.clone())
            }

            EditCommand::BulkEditCells { old_values, .. } => {
                for (pos, value) in old_values.iter() {
                    document.set_cell(*pos, value.clone())?;
                }
                Ok(())
            }

            EditCommand::InsertRow { index, .. } => {
                document.delete_row(*index)?;
                Ok(())
            }

            EditCommand::DeleteRow { index, removed } => {
                let values = require_captured(removed.as_ref(), "DeleteRow")?;
                document.insert_row_with(*index, values.clone())
            }

            EditCommand::InsertColumn { index, .. } => {
                document.delete_column(*index)?;
                Ok(())
            }

            EditCommand::DeleteColumn { index, removed } => {
                let values = require_captured(removed.as_ref(), "DeleteColumn")?;
                document.insert_column_with(*index, values.clone())
            }

            EditCommand::Paste {
                content, captured, ..
            } => {
                let region = require_captured(captured.as_ref(), "Paste")?;
                if content.source == SelectionKind::Line {
                    for _ in 0..content.rows() {
                        document.delete_row(region.origin.row)?;
                    }
                } else {
                    restore_region(document, region)?;
                }
                document.truncate_to(region.prior_rows, region.prior_columns);
                Ok(())
            }

            EditCommand::PasteOverSelection { captured, .. }
            | EditCommand::DeleteSelection { captured, .. } => {
                let region = require_captured(captured.as_ref(), "selection command")?;
                undo_selection_capture(self, document, region)
            }
        }
    }
}

fn require_captured<'a, T>(value: Option<&'a T>, what: &str) -> Result<&'a T> {
    debug_assert!(value.is_some(), "undo before execute: {what}");
    value.ok_or_else(|| {
        log::warn!("undo before execute: {what}");
        EditorError::InvalidCommand(format!("undo before execute: {what}"))
    })
}

fn capture_rect(
    document: &Document,
    origin: GridPosition,
    rows: usize,
    columns: usize,
) -> Result<Vec<Vec<String>>> {
    let mut values = Vec::with_capacity(rows);
    for r in 0..rows {
        let mut row = Vec::with_capacity(columns);
        for c in 0..columns {
            row.push(
                document
                    .get_cell(GridPosition::new(origin.row + r, origin.column + c))?
                    .to_string(),
            );
        }
        values.push(row);
    }
    Ok(values)
}

fn restore_region(document: &mut Document, region: &CapturedRegion) -> Result<()> {
    for (r, row) in region.values.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            document.set_cell(
                GridPosition::new(region.origin.row + r, region.origin.column + c),
                value.clone(),
            )?;
        }
    }
    Ok(())
}

fn execute_paste(
    document: &mut Document,
    at: GridPosition,
    content: &YankedContent,
    before: bool,
    captured: &mut Option<CapturedRegion>,
) -> Result<()> {
    if content.is_empty() {
        return Ok(());
    }
    let prior_rows = document.row_count();
    let prior_columns = document.column_count();

    if content.source == SelectionKind::Line {
        let index = if before {
            at.row.min(prior_rows)
        } else {
            (at.row + 1).min(prior_rows)
        };
        for (i, row) in content.cells.iter().enumerate() {
            document.insert_row_with(index + i, row.clone())?;
        }
        if captured.is_none() {
            *captured = Some(CapturedRegion {
                origin: GridPosition::new(index, 0),
                values: Vec::new(),
                prior_rows,
                prior_columns,
            });
        }
        return Ok(());
    }

    // Character/Block content overwrites a rectangle anchored at the cursor,
    // growing the grid when it overflows.
    document.ensure_size(at.row + content.rows(), at.column + content.columns());
    if captured.is_none() {
        *captured = Some(CapturedRegion {
            origin: at,
            values: capture_rect(document, at, content.rows(), content.columns())?,
            prior_rows,
            prior_columns,
        });
    }
    for (r, row) in content.cells.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            document.set_cell(
                GridPosition::new(at.row + r, at.column + c),
                value.clone(),
            )?;
        }
    }
    Ok(())
}

fn execute_paste_over(
    document: &mut Document,
    range: SelectionRange,
    content: &YankedContent,
    captured: &mut Option<CapturedRegion>,
) -> Result<()> {
    if content.is_empty() {
        return Ok(());
    }
    let columns = document.column_count();
    let origin = range.origin();
    let rows = range.row_count();
    let cols = range.column_count(columns);

    if captured.is_none() {
        *captured = Some(CapturedRegion {
            origin,
            values: capture_rect(document, origin, rows, cols)?,
            prior_rows: document.row_count(),
            prior_columns: columns,
        });
    }
    // Tile the yanked rectangle across the selection.
    for r in 0..rows {
        for c in 0..cols {
            let value = &content.cells[r % content.rows()][c % content.columns()];
            document.set_cell(
                GridPosition::new(origin.row + r, origin.column + c),
                value.clone(),
            )?;
        }
    }
    Ok(())
}

fn execute_delete_selection(
    document: &mut Document,
    range: SelectionRange,
    captured: &mut Option<CapturedRegion>,
) -> Result<()> {
    let columns = document.column_count();
    let origin = range.origin();

    if range.kind == SelectionKind::Line {
        let rows = range.row_count();
        if captured.is_none() {
            *captured = Some(CapturedRegion {
                origin,
                values: capture_rect(document, origin, rows, columns)?,
                prior_rows: document.row_count(),
                prior_columns: columns,
            });
        }
        for _ in 0..rows {
            document.delete_row(range.start_row())?;
        }
        return Ok(());
    }

    let rows = range.row_count();
    let cols = range.column_count(columns);
    if captured.is_none() {
        *captured = Some(CapturedRegion {
            origin,
            values: capture_rect(document, origin, rows, cols)?,
            prior_rows: document.row_count(),
            prior_columns: columns,
        });
    }
    for r in 0..rows {
        for c in 0..cols {
            document.set_cell(
                GridPosition::new(origin.row + r, origin.column + c),
                String::new(),
            )?;
        }
    }
    Ok(())
}

fn undo_selection_capture(
    command: &EditCommand,
    document: &mut Document,
    region: &CapturedRegion,
) -> Result<()> {
    match command {
        EditCommand::DeleteSelection { range, .. } if range.kind == SelectionKind::Line => {
            for (i, row) in region.values.iter().enumerate() {
                document.insert_row_with(region.origin.row + i, row.clone())?;
            }
            Ok(())
        }
        _ => restore_region(document, region),
    }
}
