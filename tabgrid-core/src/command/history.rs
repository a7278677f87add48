use super::command::EditCommand;
use crate::constants::MAX_HISTORY_SIZE;
use crate::document::Document;
use crate::error::Result;
use std::collections::VecDeque;

/// Undo/redo stacks over [`EditCommand`]s. Executing through here is the only
/// sanctioned way to mutate a document; pushing a new command clears the redo
/// stack, and both `undo` and `redo` are silent no-ops at stack bottom.
pub struct CommandHistory {
    done: VecDeque<EditCommand>,
    redo: VecDeque<EditCommand>,
    max_size: usize,
}

impl CommandHistory {
    pub fn new() -> Self {
        CommandHistory {
            done: VecDeque::new(),
            redo: VecDeque::new(),
            max_size: MAX_HISTORY_SIZE,
        }
    }

    pub fn with_max_size(max_size: usize) -> Self {
        CommandHistory {
            done: VecDeque::new(),
            redo: VecDeque::new(),
            max_size,
        }
    }

    /// Run the command and record it. On failure nothing is recorded and the
    /// document is unchanged (commands validate before mutating).
    pub fn execute(&mut self, mut command: EditCommand, document: &mut Document) -> Result<()> {
        command.execute(document)?;
        self.push_done(command);
        self.redo.clear();
        Ok(())
    }

    /// Record a command whose effect has already been applied (the view's
    /// data-binding path). Nothing re-executes; the command must carry its
    /// own pre-image.
    pub fn add_executed(&mut self, command: EditCommand) {
        self.push_done(command);
        self.redo.clear();
    }

    /// Revert the newest command. Returns its description, or `None` at the
    /// stack bottom.
    pub fn undo(&mut self, document: &mut Document) -> Result<Option<String>> {
        let Some(command) = self.done.pop_back() else {
            return Ok(None);
        };
        command.undo(document)?;
        let description = command.description();
        self.redo.push_back(command);
        Ok(Some(description))
    }

    /// Re-apply the newest undone command.
    pub fn redo(&mut self, document: &mut Document) -> Result<Option<String>> {
        let Some(mut command) = self.redo.pop_back() else {
            return Ok(None);
        };
        command.execute(document)?;
        let description = command.description();
        self.push_done(command);
        Ok(Some(description))
    }

    pub fn can_undo(&self) -> bool {
        !self.done.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn len(&self) -> usize {
        self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.done.is_empty()
    }

    pub fn clear(&mut self) {
        self.done.clear();
        self.redo.clear();
    }

    fn push_done(&mut self, command: EditCommand) {
        self.done.push_back(command);
        while self.done.len() > self.max_size {
            self.done.pop_front();
        }
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new()
    }
}
