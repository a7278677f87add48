//! Key-event entry point. Processing is strictly serial: every side effect
//! (history push, mode change, selection update, notifications) lands before
//! `handle_key` returns.

use crate::controller::EditorController;
use crate::keymap::{Key, KeyInput, MapMode, Modifiers};
use crate::state::{CommandKind, Mode};
use std::time::Instant;

impl EditorController {
    /// Feed one logical key event. Returns whether the editor consumed it.
    pub fn handle_key(&mut self, key: Key, modifiers: Modifiers, now: Instant) -> bool {
        self.handle_input(KeyInput::new(key, modifiers), now)
    }

    /// Convenience wrapper stamping the event with the current time.
    pub fn press(&mut self, input: KeyInput) -> bool {
        self.handle_input(input, Instant::now())
    }

    pub fn handle_input(&mut self, input: KeyInput, now: Instant) -> bool {
        if !self.config.vim_mode {
            // With vim off the view owns editing through its data binding;
            // the core only steps aside.
            return false;
        }
        match self.state.mode {
            Mode::Normal => {
                self.state.pending.expire(now);
                self.handle_normal_key(input, now)
            }
            Mode::Visual(kind) => {
                self.state.pending.expire(now);
                self.handle_visual_key(kind, input, now)
            }
            // Insert owns its pending buffer: an expired held `j` must turn
            // into typed text, not vanish.
            Mode::Insert => self.handle_insert_key(input, now),
            Mode::Command => self.handle_command_key(input),
        }
    }

    /// Start Command mode with the given interpretation for the buffer.
    pub(crate) fn enter_command_mode(&mut self, kind: CommandKind) {
        self.state.command_kind = Some(kind);
        self.state.command_buffer.clear();
        self.state.cancel_pending();
        self.switch_mode(Mode::Command);
    }

    fn handle_command_key(&mut self, input: KeyInput) -> bool {
        if let Some(action) = self
            .bindings
            .action_for(MapMode::Command, &input)
            .map(str::to_string)
        {
            return self.run_command_line_action(&action);
        }
        match input.typed_char() {
            Some(c) => {
                self.state.command_buffer.push(c);
                true
            }
            None => false,
        }
    }

    fn run_command_line_action(&mut self, action: &str) -> bool {
        match action {
            "command.cancel" => {
                self.cancel_command_mode();
                true
            }
            "command.commit" => {
                let line = std::mem::take(&mut self.state.command_buffer);
                let kind = self.state.command_kind.take();
                self.switch_mode(Mode::Normal);
                match kind {
                    Some(CommandKind::Ex) => self.execute_ex_line(&line),
                    Some(CommandKind::SearchForward) => self.commit_search(&line, true),
                    Some(CommandKind::SearchBackward) => self.commit_search(&line, false),
                    None => {}
                }
                true
            }
            "command.backspace" => {
                if self.state.command_buffer.pop().is_none() {
                    // Backspacing past the prompt cancels, like vim.
                    self.cancel_command_mode();
                }
                true
            }
            other => {
                log::warn!("unknown command-line action bound: {other}");
                false
            }
        }
    }

    fn cancel_command_mode(&mut self) {
        self.state.command_buffer.clear();
        self.state.command_kind = None;
        self.switch_mode(Mode::Normal);
    }
}
