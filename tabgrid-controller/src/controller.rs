//! The facade the view drives: owns the document, the vim state, the undo
//! history and the capability handles, and turns key events into commands,
//! selections and notifications.

use crate::config::EditorConfig;
use crate::events::EditorEvent;
use crate::keymap::KeyBindings;
use crate::state::{Mode, VimState};
use crate::vim::ex::{self, ExCommand, ExRange};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tabgrid_core::{
    codec, ClipboardPort, CommandHistory, DelimiterFormat, Document, EditCommand, EditorError,
    GridPosition, NullClipboard, Result, SelectionKind, SelectionRange, YankedContent,
};

pub struct EditorController {
    pub(crate) document: Document,
    pub(crate) state: VimState,
    pub(crate) history: CommandHistory,
    pub(crate) clipboard: Box<dyn ClipboardPort>,
    pub(crate) config: EditorConfig,
    pub(crate) bindings: KeyBindings,
    pub(crate) listeners: Vec<Box<dyn Fn(&EditorEvent)>>,
    /// Cells currently carrying `is_selected`, so projection updates stay
    /// delta-sized instead of sweeping the grid.
    pub(crate) selection_flags: BTreeSet<GridPosition>,
    /// Cells currently carrying search-match flags.
    pub(crate) search_flags: Vec<GridPosition>,
    pub(crate) status: Option<String>,
}

impl EditorController {
    pub fn new(document: Document) -> Self {
        Self::with_clipboard(document, Box::new(NullClipboard))
    }

    pub fn with_clipboard(document: Document, clipboard: Box<dyn ClipboardPort>) -> Self {
        EditorController {
            document,
            state: VimState::new(),
            history: CommandHistory::new(),
            clipboard,
            config: EditorConfig::default(),
            bindings: KeyBindings::default_bindings(),
            listeners: Vec::new(),
            selection_flags: BTreeSet::new(),
            search_flags: Vec::new(),
            status: None,
        }
    }

    /// Load a file into a fresh controller.
    pub fn open(path: &Path, delimiter: Option<DelimiterFormat>) -> Result<Self> {
        let document = codec::load(path, delimiter)?;
        Ok(Self::new(document))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn state(&self) -> &VimState {
        &self.state
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EditorConfig {
        &mut self.config
    }

    pub fn bindings_mut(&mut self) -> &mut KeyBindings {
        &mut self.bindings
    }

    pub fn cursor(&self) -> GridPosition {
        self.state.cursor
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&EditorEvent)>) {
        self.listeners.push(listener);
    }

    pub(crate) fn emit(&self, event: EditorEvent) {
        for listener in &self.listeners {
            listener(&event);
        }
    }

    pub(crate) fn set_status(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.status = Some(text.clone());
        self.emit(EditorEvent::StatusMessage { text });
    }

    // ------------------------------------------------------------------
    // File round-trips
    // ------------------------------------------------------------------

    pub fn save(&mut self) -> Result<()> {
        let path = self
            .document
            .file_path()
            .map(Path::to_path_buf)
            .ok_or_else(|| EditorError::InvalidCommand("no file name".to_string()))?;
        self.save_as(&path)
    }

    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        codec::save(&mut self.document, path)?;
        self.emit(EditorEvent::FileSaved {
            path: path.to_path_buf(),
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Mode and cursor plumbing
    // ------------------------------------------------------------------

    pub(crate) fn switch_mode(&mut self, to: Mode) {
        let from = self.state.mode;
        if from == to {
            return;
        }
        self.state.mode = to;
        self.emit(EditorEvent::ModeChanged { from, to });
    }

    pub(crate) fn move_cursor(&mut self, to: GridPosition) {
        let from = self.state.cursor;
        let to = to.clamped(
            self.document.row_count().max(1),
            self.document.column_count().max(1),
        );
        if from == to {
            return;
        }
        self.state.cursor = to;
        self.emit(EditorEvent::CursorMoved { from, to });
    }

    pub(crate) fn clamp_cursor(&mut self) {
        let clamped = self.state.cursor.clamped(
            self.document.row_count().max(1),
            self.document.column_count().max(1),
        );
        self.move_cursor(clamped);
    }

    // ------------------------------------------------------------------
    // Command execution
    // ------------------------------------------------------------------

    /// Every mutation funnels through here so the cursor stays valid and the
    /// view hears about column widths.
    pub(crate) fn run_command(&mut self, command: EditCommand) -> Result<()> {
        let columns = self.affected_columns(&command);
        self.history.execute(command, &mut self.document)?;
        self.after_mutation(columns);
        Ok(())
    }

    pub fn undo(&mut self) {
        match self.history.undo(&mut self.document) {
            Ok(Some(description)) => {
                self.after_mutation(self.all_columns());
                self.set_status(format!("undone: {description}"));
            }
            Ok(None) => self.set_status("already at oldest change"),
            Err(e) => self.set_status(e.to_string()),
        }
    }

    pub fn redo(&mut self) {
        match self.history.redo(&mut self.document) {
            Ok(Some(description)) => {
                self.after_mutation(self.all_columns());
                self.set_status(format!("redone: {description}"));
            }
            Ok(None) => self.set_status("already at newest change"),
            Err(e) => self.set_status(e.to_string()),
        }
    }

    fn after_mutation(&mut self, columns: Vec<usize>) {
        self.clamp_cursor();
        if !columns.is_empty() {
            self.emit(EditorEvent::ColumnWidthsInvalidated { columns });
        }
        self.refresh_selection_projection();
    }

    fn all_columns(&self) -> Vec<usize> {
        (0..self.document.column_count()).collect()
    }

    fn affected_columns(&self, command: &EditCommand) -> Vec<usize> {
        let total = self.document.column_count();
        match command {
            EditCommand::EditCell { position, .. } => vec![position.column],
            EditCommand::BulkEditCells { new_values, .. } => {
                let set: BTreeSet<usize> = new_values.keys().map(|p| p.column).collect();
                set.into_iter().collect()
            }
            EditCommand::InsertColumn { index, .. } | EditCommand::DeleteColumn { index, .. } => {
                (*index..total.max(index + 1)).collect()
            }
            EditCommand::InsertRow { .. } | EditCommand::DeleteRow { .. } => (0..total).collect(),
            EditCommand::Paste { at, content, .. } => {
                if content.source == SelectionKind::Line {
                    (0..total.max(content.columns())).collect()
                } else {
                    (at.column..at.column + content.columns()).collect()
                }
            }
            EditCommand::PasteOverSelection { range, .. }
            | EditCommand::DeleteSelection { range, .. } => {
                (range.start_column()..=range.end_column(total.max(1))).collect()
            }
        }
    }

    // ------------------------------------------------------------------
    // Register / clipboard coupling
    // ------------------------------------------------------------------

    /// Record a yank and mirror its textual form to the system clipboard.
    pub fn copy_to_clipboard(&mut self, yank: YankedContent) {
        let text = yank.to_delimited_text(self.document.delimiter().char());
        if let Err(e) = self.clipboard.write_text(&text) {
            log::warn!("clipboard write failed: {e}");
        }
        self.state.last_yank = Some(yank);
    }

    /// Parse whatever text the system clipboard holds into a paste payload.
    pub fn read_from_clipboard(&self) -> YankedContent {
        let text = self.clipboard.read_text().unwrap_or_default();
        YankedContent::from_clipboard_text(&text, self.document.delimiter().char())
    }

    /// Another process changed the clipboard: the in-memory register is now
    /// stale, so the next paste reads the clipboard text instead.
    pub fn on_clipboard_external_change(&mut self) {
        self.state.last_yank = None;
    }

    /// Direct handle on the clipboard port (headless hosts and tests).
    pub fn clipboard(&self) -> &dyn ClipboardPort {
        self.clipboard.as_ref()
    }

    pub(crate) fn current_yank(&self) -> Option<YankedContent> {
        if let Some(yank) = &self.state.last_yank {
            return Some(yank.clone());
        }
        let yank = self.read_from_clipboard();
        if yank.rows() == 1 && yank.columns() == 1 && yank.cells[0][0].is_empty() {
            None
        } else {
            Some(yank)
        }
    }

    /// Lift the values under `range` into a yank of the range's kind.
    pub(crate) fn yank_range(&mut self, range: SelectionRange) {
        let columns = self.document.column_count();
        let mut cells = Vec::with_capacity(range.row_count());
        for row in range.start_row()..=range.end_row() {
            let mut values = Vec::new();
            for column in range.start_column()..=range.end_column(columns) {
                values.push(
                    self.document
                        .get_cell(GridPosition::new(row, column))
                        .unwrap_or_default()
                        .to_string(),
                );
            }
            cells.push(values);
        }
        self.copy_to_clipboard(YankedContent::new(cells, range.kind));
    }

    // ------------------------------------------------------------------
    // Row/column header selection
    // ------------------------------------------------------------------

    pub fn select_row(&mut self, row: usize) {
        if row >= self.document.row_count() {
            return;
        }
        self.state.selected_rows.clear();
        self.state.selected_rows.insert(row);
        self.selection_sets_changed();
    }

    pub fn toggle_row(&mut self, row: usize) {
        if row >= self.document.row_count() {
            return;
        }
        if !self.state.selected_rows.remove(&row) {
            self.state.selected_rows.insert(row);
        }
        self.selection_sets_changed();
    }

    pub fn select_row_range(&mut self, anchor: usize, head: usize) {
        let (lo, hi) = (anchor.min(head), anchor.max(head));
        self.state.selected_rows = (lo..=hi.min(self.document.row_count().saturating_sub(1)))
            .collect();
        self.selection_sets_changed();
    }

    pub fn select_column(&mut self, column: usize) {
        if column >= self.document.column_count() {
            return;
        }
        self.state.selected_columns.clear();
        self.state.selected_columns.insert(column);
        self.selection_sets_changed();
    }

    pub fn toggle_column(&mut self, column: usize) {
        if column >= self.document.column_count() {
            return;
        }
        if !self.state.selected_columns.remove(&column) {
            self.state.selected_columns.insert(column);
        }
        self.selection_sets_changed();
    }

    pub fn select_column_range(&mut self, anchor: usize, head: usize) {
        let (lo, hi) = (anchor.min(head), anchor.max(head));
        self.state.selected_columns = (lo
            ..=hi.min(self.document.column_count().saturating_sub(1)))
            .collect();
        self.selection_sets_changed();
    }

    pub fn clear_header_selections(&mut self) {
        self.state.selected_rows.clear();
        self.state.selected_columns.clear();
        self.selection_sets_changed();
    }

    fn selection_sets_changed(&mut self) {
        self.refresh_selection_projection();
        self.emit(EditorEvent::SelectionChanged);
    }

    // ------------------------------------------------------------------
    // Projections
    // ------------------------------------------------------------------

    /// Recompute `is_selected` flags as the union of the visual range and the
    /// header selections, touching only the delta against the previous set.
    pub(crate) fn refresh_selection_projection(&mut self) {
        let rows = self.document.row_count();
        let columns = self.document.column_count();
        let mut wanted: BTreeSet<GridPosition> = BTreeSet::new();

        if let Some(range) = &self.state.selection {
            for pos in range.positions(columns) {
                if pos.is_within(rows, columns) {
                    wanted.insert(pos);
                }
            }
        }
        for &row in &self.state.selected_rows {
            for column in 0..columns {
                let pos = GridPosition::new(row, column);
                if pos.is_within(rows, columns) {
                    wanted.insert(pos);
                }
            }
        }
        for &column in &self.state.selected_columns {
            for row in 0..rows {
                let pos = GridPosition::new(row, column);
                if pos.is_within(rows, columns) {
                    wanted.insert(pos);
                }
            }
        }

        for stale in self.selection_flags.difference(&wanted) {
            self.document.set_selected(*stale, false);
        }
        let fresh: Vec<GridPosition> = wanted
            .difference(&self.selection_flags)
            .copied()
            .collect();
        for pos in fresh {
            self.document.set_selected(pos, true);
        }
        self.selection_flags = wanted;
    }

    pub(crate) fn set_visual_selection(&mut self, range: Option<SelectionRange>) {
        self.state.selection = range;
        self.refresh_selection_projection();
        self.emit(EditorEvent::SelectionChanged);
    }

    // ------------------------------------------------------------------
    // View data-binding path
    // ------------------------------------------------------------------

    /// The in-cell edit surface finished. On commit the value is enrolled in
    /// history; if the binding already wrote the cell the command is recorded
    /// without re-executing.
    pub fn submit_cell_edit(&mut self, value: &str, committed: bool) {
        let in_insert = self.state.mode == Mode::Insert;
        let position = if in_insert {
            self.state.insert_start_position
        } else {
            self.state.cursor
        };
        let original = self.state.insert_original_value.clone();
        if in_insert {
            self.state.insert_buffer.clear();
            self.state.pending_bulk_edit = None;
            self.switch_mode(Mode::Normal);
        }
        if !committed || value == original {
            return;
        }
        let already_applied = self
            .document
            .get_cell(position)
            .map(|current| current == value)
            .unwrap_or(false);
        if already_applied {
            self.history
                .add_executed(EditCommand::edit_cell_executed(position, value, original));
            self.emit(EditorEvent::ColumnWidthsInvalidated {
                columns: vec![position.column],
            });
        } else if let Err(e) = self.run_command(EditCommand::edit_cell(position, value)) {
            self.set_status(e.to_string());
        }
    }

    // ------------------------------------------------------------------
    // Ex commands
    // ------------------------------------------------------------------

    pub(crate) fn execute_ex_line(&mut self, line: &str) {
        let command = match ex::parse(line) {
            Ok(command) => command,
            Err(e) => {
                self.set_status(e.to_string());
                return;
            }
        };
        if let Err(e) = self.dispatch_ex(command) {
            self.set_status(e.to_string());
        }
    }

    fn dispatch_ex(&mut self, command: ExCommand) -> Result<()> {
        match command.name.as_str() {
            "write" => {
                self.ex_write(&command)?;
            }
            "quit" => {
                self.emit(EditorEvent::CloseRequested {
                    force: command.bang,
                });
            }
            "writequit" => {
                self.ex_write(&command)?;
                self.emit(EditorEvent::CloseRequested { force: false });
            }
            "substitute" => self.ex_substitute(&command)?,
            "set" => self.ex_set(&command)?,
            "sort" => self.ex_sort(&command)?,
            "help" => {
                self.set_status(":w :q :wq :s/from/to/[g] :set key=value :sort [col] [!]");
            }
            other => {
                return Err(EditorError::UnknownCommand(other.to_string()));
            }
        }
        Ok(())
    }

    fn ex_write(&mut self, command: &ExCommand) -> Result<()> {
        match command.args.first() {
            Some(path) => self.save_as(&PathBuf::from(path)),
            None => self.save(),
        }
    }

    fn ex_set(&mut self, command: &ExCommand) -> Result<()> {
        let assignment = command
            .args
            .first()
            .ok_or_else(|| EditorError::InvalidCommand("set needs key=value".to_string()))?;
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| EditorError::InvalidCommand("set needs key=value".to_string()))?;
        self.config.apply_set(key, value)
    }

    /// Rows covered by the command's range, defaulting to the cursor row.
    fn resolve_ex_rows(&self, range: Option<ExRange>) -> (usize, usize) {
        let last = self.document.row_count().saturating_sub(1);
        match range {
            None | Some(ExRange::Current) => (self.state.cursor.row, self.state.cursor.row),
            Some(ExRange::All) => (0, last),
            Some(ExRange::Lines(a, b)) => {
                // Typed line numbers are 1-based.
                let a = a.saturating_sub(1).min(last);
                let b = b.saturating_sub(1).min(last);
                (a.min(b), a.max(b))
            }
        }
    }

    fn ex_substitute(&mut self, command: &ExCommand) -> Result<()> {
        let from = command
            .args
            .first()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| EditorError::InvalidCommand("substitute needs a pattern".to_string()))?
            .clone();
        let to = command.args.get(1).cloned().unwrap_or_default();
        let global = command.flags.iter().any(|f| f == "g");
        let (first_row, last_row) = self.resolve_ex_rows(command.range);

        let mut new_values = BTreeMap::new();
        for row in first_row..=last_row {
            for column in 0..self.document.column_count() {
                let pos = GridPosition::new(row, column);
                let Ok(value) = self.document.get_cell(pos) else {
                    continue;
                };
                if !value.contains(from.as_str()) {
                    continue;
                }
                let replaced = if global {
                    value.replace(from.as_str(), &to)
                } else {
                    value.replacen(from.as_str(), &to, 1)
                };
                if replaced != value {
                    new_values.insert(pos, replaced);
                }
            }
        }

        if new_values.is_empty() {
            self.set_status(format!("no match: {from}"));
            return Ok(());
        }
        let changed = new_values.len();
        self.run_command(EditCommand::bulk_edit(new_values))?;
        self.set_status(format!("substituted in {changed} cells"));
        Ok(())
    }

    fn ex_sort(&mut self, command: &ExCommand) -> Result<()> {
        let column = match command.args.first().filter(|a| *a != "!") {
            Some(arg) => arg
                .parse::<usize>()
                .map_err(|_| EditorError::InvalidCommand(format!("bad column: {arg}")))?,
            None => self.state.cursor.column,
        };
        if column >= self.document.column_count() {
            return Err(EditorError::out_of_bounds(0, column));
        }
        let descending = command.bang || command.args.iter().any(|a| a == "!");

        // Project the sorted order into one bulk edit so the whole sort is a
        // single history entry.
        let values = self.document.values();
        let mut order: Vec<usize> = (0..values.len()).collect();
        let key = |row: &Vec<String>| row.get(column).cloned().unwrap_or_default();
        if descending {
            order.sort_by(|a, b| key(&values[*b]).cmp(&key(&values[*a])));
        } else {
            order.sort_by(|a, b| key(&values[*a]).cmp(&key(&values[*b])));
        }

        let mut new_values = BTreeMap::new();
        for (target, source) in order.iter().enumerate() {
            if target == *source {
                continue;
            }
            for (c, value) in values[*source].iter().enumerate() {
                if values[target].get(c) != Some(value) {
                    new_values.insert(GridPosition::new(target, c), value.clone());
                }
            }
        }
        if new_values.is_empty() {
            self.set_status("already sorted");
            return Ok(());
        }
        self.run_command(EditCommand::bulk_edit(new_values))?;
        self.set_status(format!("sorted by column {column}"));
        Ok(())
    }
}
