//! Visual-mode handling: motions extend the range, operators consume it and
//! drop back to Normal.

use crate::controller::EditorController;
use crate::keymap::{Key, KeyInput, MapMode};
use crate::state::{CaretPosition, LastChange, LastChangeKind, Mode};
use std::time::Instant;
use tabgrid_core::{GridPosition, SelectionKind, SelectionRange};

impl EditorController {
    pub(crate) fn handle_visual_key(
        &mut self,
        kind: SelectionKind,
        input: KeyInput,
        now: Instant,
    ) -> bool {
        if !self.state.pending.is_empty() {
            return self.handle_visual_sequence(input);
        }
        if self.accumulate_count(&input) {
            return true;
        }

        let Some(action) = self
            .bindings
            .action_for(MapMode::Visual, &input)
            .map(str::to_string)
        else {
            return false;
        };

        if let Some(motion) = self.motion_for_action(&action) {
            let target = motion.apply(
                self.state.cursor,
                &self.document,
                self.state.viewport_rows,
            );
            self.move_cursor(target);
            self.extend_selection_to(target);
            return true;
        }

        match action.as_str() {
            "prefix.g" | "prefix.replace" => {
                self.state.pending.push(input, now);
                true
            }
            "visual.swap_anchor" => {
                if let Some(range) = self.state.selection {
                    let swapped = range.swapped();
                    self.set_visual_selection(Some(swapped));
                    self.move_cursor(swapped.end);
                }
                true
            }
            "visual.delete" => {
                let Some(range) = self.current_range() else {
                    return true;
                };
                if let Err(e) = self.delete_selection_range(range) {
                    self.set_status(e.to_string());
                }
                self.exit_visual();
                self.move_cursor(range.origin());
                true
            }
            "visual.yank" => {
                let Some(range) = self.current_range() else {
                    return true;
                };
                self.yank_range(range);
                self.exit_visual();
                self.move_cursor(range.origin());
                true
            }
            "visual.change" => {
                let Some(range) = self.current_range() else {
                    return true;
                };
                let columns = self.document.column_count();
                let multi = range.row_count() * range.column_count(columns.max(1)) > 1;
                // Typed text lands in every selected cell on commit.
                self.state.pending_bulk_edit = if multi { Some(range) } else { None };
                self.exit_visual();
                self.move_cursor(range.origin());
                self.enter_insert(CaretPosition::Start, true);
                true
            }
            "visual.paste" => {
                let Some(range) = self.current_range() else {
                    return true;
                };
                match self.current_yank() {
                    Some(content) => {
                        self.paste_over(range, content);
                        self.exit_visual();
                        self.move_cursor(range.origin());
                    }
                    None => {
                        self.set_status("nothing to paste");
                        self.exit_visual();
                    }
                }
                true
            }
            "visual.character" => {
                self.toggle_visual_kind(kind, SelectionKind::Character);
                true
            }
            "visual.line" => {
                self.toggle_visual_kind(kind, SelectionKind::Line);
                true
            }
            "visual.block" => {
                self.toggle_visual_kind(kind, SelectionKind::Block);
                true
            }
            "cancel" => {
                self.exit_visual();
                true
            }
            other => {
                log::warn!("unknown visual action bound: {other}");
                false
            }
        }
    }

    fn handle_visual_sequence(&mut self, input: KeyInput) -> bool {
        if input == KeyInput::plain(Key::Escape) {
            self.state.cancel_pending();
            return true;
        }
        let first = *self.state.pending.first().expect("pending checked non-empty");
        let first_action = self
            .bindings
            .action_for(MapMode::Visual, &first)
            .unwrap_or("")
            .to_string();
        self.state.pending.clear();

        match first_action.as_str() {
            // `gg` extends the selection to the first row.
            "prefix.g" => {
                if input.typed_char() == Some('g') {
                    self.state.pending_count = None;
                    let target = GridPosition::new(0, self.state.cursor.column);
                    self.move_cursor(target);
                    self.extend_selection_to(target);
                    true
                } else {
                    false
                }
            }
            // `r<char>` fills the whole selection.
            "prefix.replace" => {
                let Some(c) = input.typed_char() else {
                    return false;
                };
                let Some(range) = self.current_range() else {
                    return true;
                };
                self.bulk_set_range(range, &c.to_string());
                self.exit_visual();
                self.move_cursor(range.origin());
                self.state.last_change = Some(LastChange {
                    kind: LastChangeKind::ReplaceChar(c),
                    count: 1,
                    inserted_text: c.to_string(),
                    caret: self.state.caret,
                });
                true
            }
            _ => false,
        }
    }

    fn current_range(&self) -> Option<SelectionRange> {
        self.state.selection
    }

    fn extend_selection_to(&mut self, head: GridPosition) {
        if let Some(range) = self.state.selection {
            self.set_visual_selection(Some(range.with_head(head)));
        }
    }

    /// Same-kind key toggles Visual off, a different kind re-types the
    /// selection in place.
    fn toggle_visual_kind(&mut self, current: SelectionKind, requested: SelectionKind) {
        if current == requested {
            self.exit_visual();
            return;
        }
        if let Some(range) = self.state.selection {
            self.set_visual_selection(Some(SelectionRange::new(
                requested, range.start, range.end,
            )));
        }
        self.switch_mode(Mode::Visual(requested));
    }

    fn delete_selection_range(&mut self, range: SelectionRange) -> tabgrid_core::Result<()> {
        if range.kind == SelectionKind::Line {
            self.delete_rows(range)
        } else {
            self.run_command(tabgrid_core::EditCommand::delete_selection(range))
        }
    }

    /// Leave Visual: the range and the header row/column sets clear together.
    pub(crate) fn exit_visual(&mut self) {
        self.state.cancel_pending();
        self.state.selected_rows.clear();
        self.state.selected_columns.clear();
        self.set_visual_selection(None);
        self.switch_mode(Mode::Normal);
    }
}
