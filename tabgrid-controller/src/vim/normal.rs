//! Normal-mode handling: motions, operator composition, paste, dot-repeat.

use crate::controller::EditorController;
use crate::events::EditorEvent;
use crate::keymap::{Key, KeyInput, MapMode};
use crate::state::{CaretPosition, CommandKind, LastChange, LastChangeKind, Mode};
use crate::vim::motion::Motion;
use std::collections::BTreeMap;
use std::time::Instant;
use tabgrid_core::{
    EditCommand, GridPosition, SelectionKind, SelectionRange, YankedContent,
};

impl EditorController {
    pub(crate) fn handle_normal_key(&mut self, input: KeyInput, now: Instant) -> bool {
        if !self.state.pending.is_empty() {
            return self.handle_normal_sequence(input, now);
        }

        if self.accumulate_count(&input) {
            return true;
        }

        let Some(action) = self
            .bindings
            .action_for(MapMode::Normal, &input)
            .map(str::to_string)
        else {
            return false;
        };
        self.run_normal_action(&action, input, now)
    }

    /// Digit handling shared by Normal and Visual: `1-9` always extend the
    /// count, `0` only when one is already pending (bare `0` is a motion).
    pub(crate) fn accumulate_count(&mut self, input: &KeyInput) -> bool {
        let Some(c) = input.typed_char() else {
            return false;
        };
        let Some(digit) = c.to_digit(10) else {
            return false;
        };
        if digit == 0 && self.state.pending_count.is_none() {
            return false;
        }
        self.state.push_count_digit(digit);
        true
    }

    fn run_normal_action(&mut self, action: &str, input: KeyInput, now: Instant) -> bool {
        if let Some(motion) = self.motion_for_action(action) {
            let target = motion.apply(
                self.state.cursor,
                &self.document,
                self.state.viewport_rows,
            );
            self.move_cursor(target);
            return true;
        }

        match action {
            "prefix.g" | "prefix.replace" | "operator.delete" | "operator.change"
            | "operator.yank" => {
                self.state.pending.push(input, now);
                true
            }
            "edit.clear_cell" => {
                self.state.pending_count = None;
                self.clear_cell_at_cursor();
                true
            }
            "paste.after" => {
                self.paste_at_cursor(false);
                true
            }
            "paste.before" => {
                self.paste_at_cursor(true);
                true
            }
            "history.undo" => {
                self.state.pending_count = None;
                self.undo();
                true
            }
            "history.redo" => {
                self.state.pending_count = None;
                self.redo();
                true
            }
            "repeat.last_change" => {
                self.repeat_last_change();
                true
            }
            "insert.enter" | "insert.line_start" => {
                self.enter_insert(CaretPosition::Start, false);
                true
            }
            "insert.append" | "insert.line_end" => {
                self.enter_insert(CaretPosition::End, false);
                true
            }
            "insert.open_below" => {
                self.open_row(true);
                true
            }
            "insert.open_above" => {
                self.open_row(false);
                true
            }
            "visual.character" => {
                self.enter_visual(SelectionKind::Character);
                true
            }
            "visual.line" => {
                self.enter_visual(SelectionKind::Line);
                true
            }
            "visual.block" => {
                self.enter_visual(SelectionKind::Block);
                true
            }
            "command.ex" => {
                self.enter_command_mode(CommandKind::Ex);
                true
            }
            "command.search_forward" => {
                self.enter_command_mode(CommandKind::SearchForward);
                true
            }
            "command.search_backward" => {
                self.enter_command_mode(CommandKind::SearchBackward);
                true
            }
            "search.next" => {
                self.state.pending_count = None;
                self.step_search(true);
                true
            }
            "search.previous" => {
                self.state.pending_count = None;
                self.step_search(false);
                true
            }
            "cancel" => {
                self.state.cancel_pending();
                self.clear_header_selections();
                true
            }
            other => {
                log::warn!("unknown action bound: {other}");
                false
            }
        }
    }

    /// Resolve a `motion.*` action name, consuming the pending count.
    pub(crate) fn motion_for_action(&mut self, action: &str) -> Option<Motion> {
        if !action.starts_with("motion.") {
            return None;
        }
        let had_count = self.state.pending_count.is_some();
        let count = self.state.take_count();
        let motion = match action {
            "motion.left" => Motion::Left(count),
            "motion.down" => Motion::Down(count),
            "motion.up" => Motion::Up(count),
            "motion.right" => Motion::Right(count),
            "motion.word_forward" => Motion::WordForward(count),
            "motion.word_backward" => Motion::WordBackward(count),
            "motion.line_start" => Motion::LineStart,
            "motion.line_end" => Motion::LineEnd,
            "motion.last_row" => {
                if had_count {
                    Motion::GotoRow(count.saturating_sub(1))
                } else {
                    Motion::LastRow
                }
            }
            "motion.half_page_up" => Motion::HalfPageUp(count),
            "motion.half_page_down" => Motion::HalfPageDown(count),
            "motion.page_up" => Motion::PageUp(count),
            "motion.page_down" => Motion::PageDown(count),
            "motion.paragraph_forward" => Motion::ParagraphForward(count),
            "motion.paragraph_backward" => Motion::ParagraphBackward(count),
            _ => return None,
        };
        Some(motion)
    }

    /// A key arriving while Normal mode holds a pending sequence.
    fn handle_normal_sequence(&mut self, input: KeyInput, now: Instant) -> bool {
        if input == KeyInput::plain(Key::Escape) {
            self.state.cancel_pending();
            return true;
        }
        // Counts may sit between an operator and its motion (`d2j`).
        if self.accumulate_count(&input) {
            return true;
        }

        let first = *self.state.pending.first().expect("pending checked non-empty");
        let first_action = self
            .bindings
            .action_for(MapMode::Normal, &first)
            .unwrap_or("")
            .to_string();
        let input_action = self
            .bindings
            .action_for(MapMode::Normal, &input)
            .unwrap_or("")
            .to_string();

        // `d g` -> wait for the second half of `gg`.
        if self.state.pending.keys().len() == 1
            && first_action.starts_with("operator.")
            && input_action == "prefix.g"
        {
            self.state.pending.push(input, now);
            return true;
        }

        match first_action.as_str() {
            "prefix.g" => {
                self.state.pending.clear();
                self.finish_g_sequence(input)
            }
            "prefix.replace" => {
                self.state.pending.clear();
                if let Some(c) = input.typed_char() {
                    self.state.pending_count = None;
                    self.replace_cell_at_cursor(c);
                    true
                } else {
                    false
                }
            }
            "operator.delete" | "operator.change" | "operator.yank" => {
                let tail_is_g = self.state.pending.keys().len() == 2;
                self.state.pending.clear();
                let motion = if tail_is_g {
                    // `[op]g` + key: only `g` completes the motion.
                    if input_action == "prefix.g" {
                        self.state.pending_count = None;
                        Some(Motion::FirstRow)
                    } else {
                        None
                    }
                } else if input_action == first_action {
                    // Doubled operator acts on whole rows.
                    return self.run_row_operator(&first_action);
                } else if input.typed_char() == Some('i') {
                    // `di`/`ci`/`yi` target the cell's own content.
                    return self.run_inner_cell_operator(&first_action);
                } else {
                    self.motion_for_action(&input_action)
                };
                match motion {
                    Some(motion) => self.run_span_operator(&first_action, motion),
                    None => {
                        self.state.pending_count = None;
                        true
                    }
                }
            }
            _ => {
                self.state.pending.clear();
                false
            }
        }
    }

    fn finish_g_sequence(&mut self, input: KeyInput) -> bool {
        match input.typed_char() {
            Some('g') => {
                let had_count = self.state.pending_count.is_some();
                let count = self.state.take_count();
                let motion = if had_count {
                    Motion::GotoRow(count.saturating_sub(1))
                } else {
                    Motion::FirstRow
                };
                let target =
                    motion.apply(self.state.cursor, &self.document, self.state.viewport_rows);
                self.move_cursor(target);
                true
            }
            Some('t') => {
                self.emit(EditorEvent::NextTabRequested);
                true
            }
            Some('T') => {
                self.emit(EditorEvent::PrevTabRequested);
                true
            }
            _ => {
                self.state.pending_count = None;
                false
            }
        }
    }

    /// `dd` / `cc` / `yy` act on whole rows.
    fn run_row_operator(&mut self, operator: &str) -> bool {
        let count = self.state.take_count();
        let row = self.state.cursor.row;
        let rows = self.document.row_count();
        if rows == 0 {
            return true;
        }
        let last = (row + count - 1).min(rows - 1);
        let range = SelectionRange::new(
            SelectionKind::Line,
            GridPosition::new(row, 0),
            GridPosition::new(last, 0),
        );
        match operator {
            "operator.delete" => {
                if let Err(e) = self.delete_rows(range) {
                    self.set_status(e.to_string());
                    return true;
                }
                self.state.last_change = Some(LastChange {
                    kind: LastChangeKind::DeleteRows,
                    count,
                    inserted_text: String::new(),
                    caret: self.state.caret,
                });
            }
            "operator.yank" => {
                self.yank_range(range);
                self.set_status(format!("{} rows yanked", range.row_count()));
            }
            "operator.change" => {
                let columns = self.document.column_count();
                self.state.pending_bulk_edit =
                    if range.row_count() * columns > 1 { Some(range) } else { None };
                self.move_cursor(GridPosition::new(row, 0));
                self.enter_insert(CaretPosition::Start, true);
            }
            _ => {}
        }
        true
    }

    /// `di` / `ci` / `yi`: the operator applied to the cursor cell's
    /// content.
    fn run_inner_cell_operator(&mut self, operator: &str) -> bool {
        self.state.pending_count = None;
        match operator {
            "operator.delete" => self.clear_cell_at_cursor(),
            "operator.change" => {
                self.state.pending_bulk_edit = None;
                self.enter_insert(CaretPosition::Start, true);
            }
            "operator.yank" => {
                let range = SelectionRange::cell(SelectionKind::Character, self.state.cursor);
                self.yank_range(range);
            }
            _ => {}
        }
        true
    }

    /// Operator composed with a motion: one command over the spanned range.
    fn run_span_operator(&mut self, operator: &str, motion: Motion) -> bool {
        let from = self.state.cursor;
        let mut to = motion.apply(from, &self.document, self.state.viewport_rows);
        // The word motion is exclusive under an operator: `cw`/`dw`/`yw`
        // touch up to the cell before the landing cell, so a bare `cw`
        // changes only the cursor cell.
        if let Motion::WordForward(_) = motion {
            if to.column > from.column {
                to.column -= 1;
            }
        }
        let range = SelectionRange::new(SelectionKind::Character, from, to);
        match operator {
            "operator.delete" => {
                if let Err(e) = self.run_command(EditCommand::delete_selection(range)) {
                    self.set_status(e.to_string());
                    return true;
                }
                self.move_cursor(range.origin());
                self.state.last_change = Some(LastChange {
                    kind: LastChangeKind::DeleteMotion(motion),
                    count: 1,
                    inserted_text: String::new(),
                    caret: self.state.caret,
                });
            }
            "operator.yank" => {
                self.yank_range(range);
                self.move_cursor(range.origin());
            }
            "operator.change" => {
                let columns = self.document.column_count();
                let multi = range.row_count() * range.column_count(columns.max(1)) > 1;
                self.state.pending_bulk_edit = if multi { Some(range) } else { None };
                self.move_cursor(range.origin());
                self.enter_insert(CaretPosition::Start, true);
            }
            _ => {}
        }
        true
    }

    pub(crate) fn delete_rows(&mut self, range: SelectionRange) -> tabgrid_core::Result<()> {
        if range.row_count() == 1 {
            self.run_command(EditCommand::delete_row(range.start_row()))
        } else {
            self.run_command(EditCommand::delete_selection(range))
        }
    }

    fn clear_cell_at_cursor(&mut self) {
        let cursor = self.state.cursor;
        if let Err(e) = self.run_command(EditCommand::edit_cell(cursor, "")) {
            self.set_status(e.to_string());
            return;
        }
        self.state.last_change = Some(LastChange {
            kind: LastChangeKind::ClearCell,
            count: 1,
            inserted_text: String::new(),
            caret: self.state.caret,
        });
    }

    pub(crate) fn replace_cell_at_cursor(&mut self, c: char) {
        let cursor = self.state.cursor;
        if let Err(e) = self.run_command(EditCommand::edit_cell(cursor, c.to_string())) {
            self.set_status(e.to_string());
            return;
        }
        self.state.last_change = Some(LastChange {
            kind: LastChangeKind::ReplaceChar(c),
            count: 1,
            inserted_text: c.to_string(),
            caret: self.state.caret,
        });
    }

    pub(crate) fn paste_at_cursor(&mut self, before: bool) {
        let count = self.state.take_count();
        let Some(mut content) = self.current_yank() else {
            self.set_status("nothing to paste");
            return;
        };
        // A count on a row paste replicates the rows.
        if content.source == SelectionKind::Line && count > 1 {
            let base = content.cells.clone();
            for _ in 1..count {
                content.cells.extend(base.iter().cloned());
            }
        }
        let at = self.state.cursor;
        let is_line = content.source == SelectionKind::Line;
        let prior_rows = self.document.row_count();
        if let Err(e) = self.run_command(EditCommand::paste(at, content, before)) {
            self.set_status(e.to_string());
            return;
        }
        if is_line {
            let index = if before {
                at.row.min(prior_rows)
            } else {
                (at.row + 1).min(prior_rows)
            };
            self.move_cursor(GridPosition::new(index, 0));
        }
        self.state.last_change = Some(LastChange {
            kind: LastChangeKind::Paste { before },
            count,
            inserted_text: String::new(),
            caret: self.state.caret,
        });
    }

    /// `.`: replay the recorded change at the cursor. A live count wins
    /// over the recorded one.
    fn repeat_last_change(&mut self) {
        let Some(change) = self.state.last_change.clone() else {
            self.set_status("nothing to repeat");
            return;
        };
        let live_count = self.state.pending_count.take();
        let count = live_count.unwrap_or(change.count).max(1);
        let cursor = self.state.cursor;
        let result = match change.kind {
            LastChangeKind::InsertEdit => {
                self.run_command(EditCommand::edit_cell(cursor, change.inserted_text.clone()))
            }
            LastChangeKind::ClearCell => self.run_command(EditCommand::edit_cell(cursor, "")),
            LastChangeKind::ReplaceChar(c) => {
                self.run_command(EditCommand::edit_cell(cursor, c.to_string()))
            }
            LastChangeKind::DeleteRows => {
                let rows = self.document.row_count();
                if rows == 0 {
                    Ok(())
                } else {
                    let last = (cursor.row + count - 1).min(rows - 1);
                    let range = SelectionRange::new(
                        SelectionKind::Line,
                        GridPosition::new(cursor.row, 0),
                        GridPosition::new(last, 0),
                    );
                    self.delete_rows(range)
                }
            }
            LastChangeKind::DeleteMotion(motion) => {
                let to = motion.apply(cursor, &self.document, self.state.viewport_rows);
                let range = SelectionRange::new(SelectionKind::Character, cursor, to);
                let result = self.run_command(EditCommand::delete_selection(range));
                if result.is_ok() {
                    self.move_cursor(range.origin());
                }
                result
            }
            LastChangeKind::Paste { before } => {
                match self.current_yank() {
                    Some(content) => {
                        self.run_command(EditCommand::paste(cursor, content, before))
                    }
                    None => Ok(()),
                }
            }
        };
        if let Err(e) = result {
            self.set_status(e.to_string());
        }
    }

    // ------------------------------------------------------------------
    // Insert-mode entry
    // ------------------------------------------------------------------

    pub(crate) fn enter_insert(&mut self, caret: CaretPosition, clear: bool) {
        let cursor = self.state.cursor;
        let original = self
            .document
            .get_cell(cursor)
            .map(str::to_string)
            .unwrap_or_default();
        self.state.insert_original_value = original.clone();
        self.state.insert_start_position = cursor;
        self.state.caret = caret;
        self.state.insert_buffer = if clear { String::new() } else { original };
        self.state.insert_caret = match caret {
            CaretPosition::Start => 0,
            CaretPosition::End => self.state.insert_buffer.chars().count(),
        };
        self.state.cancel_pending();
        self.switch_mode(Mode::Insert);
    }

    /// `o`/`O`: insert a blank row and start editing its first cell.
    fn open_row(&mut self, below: bool) {
        self.state.pending_count = None;
        let cursor = self.state.cursor;
        let index = if below {
            (cursor.row + 1).min(self.document.row_count())
        } else {
            cursor.row
        };
        if let Err(e) = self.run_command(EditCommand::insert_row(index)) {
            self.set_status(e.to_string());
            return;
        }
        self.move_cursor(GridPosition::new(index, 0));
        self.enter_insert(CaretPosition::Start, true);
    }

    // ------------------------------------------------------------------
    // Visual-mode entry
    // ------------------------------------------------------------------

    pub(crate) fn enter_visual(&mut self, kind: SelectionKind) {
        self.state.pending_count = None;
        let cursor = self.state.cursor;
        self.set_visual_selection(Some(SelectionRange::cell(kind, cursor)));
        self.switch_mode(Mode::Visual(kind));
    }

    /// Replace every cell of `range` with `value`, as one history entry.
    pub(crate) fn bulk_set_range(&mut self, range: SelectionRange, value: &str) {
        let rows = self.document.row_count();
        let columns = self.document.column_count();
        let mut new_values = BTreeMap::new();
        for pos in range.positions(columns) {
            if pos.is_within(rows, columns) {
                new_values.insert(pos, value.to_string());
            }
        }
        if new_values.is_empty() {
            return;
        }
        if let Err(e) = self.run_command(EditCommand::bulk_edit(new_values)) {
            self.set_status(e.to_string());
        }
    }

    /// Paste target used by visual `p` and dot-repeat of a visual paste.
    pub(crate) fn paste_over(&mut self, range: SelectionRange, content: YankedContent) {
        if let Err(e) = self.run_command(EditCommand::paste_over_selection(range, content)) {
            self.set_status(e.to_string());
        }
    }
}
