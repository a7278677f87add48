//! Insert-mode handling. The core owns a scratch buffer for the cell being
//! edited; the document only changes when the edit commits, which keeps the
//! command history the sole author of cell values.

use crate::controller::EditorController;
use crate::keymap::{KeyInput, MapMode};
use crate::state::{LastChange, LastChangeKind, Mode};
use std::time::Instant;
use tabgrid_core::EditCommand;

fn byte_index(buffer: &str, caret: usize) -> usize {
    buffer
        .char_indices()
        .nth(caret)
        .map(|(i, _)| i)
        .unwrap_or(buffer.len())
}

impl EditorController {
    pub(crate) fn handle_insert_key(&mut self, input: KeyInput, now: Instant) -> bool {
        // A held `j` waiting for the exit shortcut. If the second `j` lands
        // inside the timeout the edit commits; anything else (or a stale
        // hold) turns the `j` back into typed text.
        if !self.state.pending.is_empty() {
            let fresh = !self.state.pending.expired(now);
            self.state.pending.clear();
            if fresh && input == KeyInput::char('j') {
                self.commit_insert();
                return true;
            }
            self.insert_char('j');
        }

        if let Some(action) = self
            .bindings
            .action_for(MapMode::Insert, &input)
            .map(str::to_string)
        {
            return self.run_insert_action(&action);
        }

        match input.typed_char() {
            Some('j') => {
                self.state.pending.push(input, now);
                true
            }
            Some(c) => {
                self.insert_char(c);
                true
            }
            None => false,
        }
    }

    fn run_insert_action(&mut self, action: &str) -> bool {
        match action {
            "insert.commit" => {
                self.commit_insert();
                true
            }
            "insert.cancel" => {
                self.cancel_insert();
                true
            }
            "insert.backspace" => {
                if self.state.insert_caret > 0 {
                    self.state.insert_caret -= 1;
                    let at = byte_index(&self.state.insert_buffer, self.state.insert_caret);
                    self.state.insert_buffer.remove(at);
                }
                true
            }
            "insert.delete" => {
                let at = byte_index(&self.state.insert_buffer, self.state.insert_caret);
                if at < self.state.insert_buffer.len() {
                    self.state.insert_buffer.remove(at);
                }
                true
            }
            "insert.caret_left" => {
                self.state.insert_caret = self.state.insert_caret.saturating_sub(1);
                true
            }
            "insert.caret_right" => {
                let chars = self.state.insert_buffer.chars().count();
                self.state.insert_caret = (self.state.insert_caret + 1).min(chars);
                true
            }
            "insert.caret_start" => {
                self.state.insert_caret = 0;
                true
            }
            "insert.caret_end" => {
                self.state.insert_caret = self.state.insert_buffer.chars().count();
                true
            }
            other => {
                log::warn!("unknown insert action bound: {other}");
                false
            }
        }
    }

    fn insert_char(&mut self, c: char) {
        let at = byte_index(&self.state.insert_buffer, self.state.insert_caret);
        self.state.insert_buffer.insert(at, c);
        self.state.insert_caret += 1;
    }

    /// Finalize the edit: one `EditCell` for a plain edit, one
    /// `BulkEditCells` when a change operator covered a range, and a
    /// dot-repeat record either way.
    pub(crate) fn commit_insert(&mut self) {
        let value = std::mem::take(&mut self.state.insert_buffer);
        let original = std::mem::take(&mut self.state.insert_original_value);
        let position = self.state.insert_start_position;
        let caret = self.state.caret;
        let bulk = self.state.pending_bulk_edit.take();
        self.state.insert_caret = 0;
        self.state.pending.clear();
        self.switch_mode(Mode::Normal);

        let mut changed = false;
        if let Some(range) = bulk {
            self.bulk_set_range(range, &value);
            changed = true;
        } else if value != original {
            if let Err(e) = self.run_command(EditCommand::edit_cell(position, value.clone())) {
                self.set_status(e.to_string());
                return;
            }
            changed = true;
        }

        if changed {
            self.state.last_change = Some(LastChange {
                kind: LastChangeKind::InsertEdit,
                count: 1,
                inserted_text: value,
                caret,
            });
        }
    }

    /// Abandon the edit without touching the document (the stock `Ctrl+c`
    /// binding, also callable by the host directly).
    pub fn cancel_insert(&mut self) {
        self.state.insert_buffer.clear();
        self.state.insert_original_value.clear();
        self.state.insert_caret = 0;
        self.state.pending_bulk_edit = None;
        self.state.pending.clear();
        self.switch_mode(Mode::Normal);
    }

    /// Snapshot of the scratch edit for the view: `(text, caret)`.
    pub fn insert_preview(&self) -> Option<(&str, usize)> {
        match self.state.mode {
            Mode::Insert => Some((&self.state.insert_buffer, self.state.insert_caret)),
            _ => None,
        }
    }
}
