//! Per-document vim state: the current mode, cursor, selections, pending
//! multi-key buffer, registers and dot-repeat memory. One `VimState` pairs
//! with one `Document` for the document's whole lifetime.

use crate::keymap::KeyInput;
use crate::vim::motion::Motion;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use tabgrid_core::{GridPosition, SelectionKind, SelectionRange, YankedContent};

/// Multi-key sequences older than this are abandoned when the next key
/// arrives. There is no background timer; elapsed time is checked on arrival.
pub const PENDING_KEY_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Normal,
    Insert,
    Visual(SelectionKind),
    Command,
}

/// What the command-line buffer will be interpreted as on commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Ex,
    SearchForward,
    SearchBackward,
}

/// Where the in-cell caret starts when entering Insert mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaretPosition {
    Start,
    End,
}

/// Keys collected toward a multi-key sequence, stamped when the first one
/// arrived.
#[derive(Debug, Default)]
pub struct PendingKeys {
    keys: Vec<KeyInput>,
    since: Option<Instant>,
}

impl PendingKeys {
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[KeyInput] {
        &self.keys
    }

    pub fn first(&self) -> Option<&KeyInput> {
        self.keys.first()
    }

    pub fn push(&mut self, input: KeyInput, now: Instant) {
        if self.keys.is_empty() {
            self.since = Some(now);
        }
        self.keys.push(input);
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.since = None;
    }

    /// True once the first key is older than [`PENDING_KEY_TIMEOUT`].
    pub fn expired(&self, now: Instant) -> bool {
        match self.since {
            Some(since) => now.duration_since(since) > PENDING_KEY_TIMEOUT,
            None => false,
        }
    }

    /// Drop the buffer if it has gone stale. Called before interpreting any
    /// new key.
    pub fn expire(&mut self, now: Instant) {
        if self.expired(now) {
            self.clear();
        }
    }
}

/// The change `.` replays.
#[derive(Debug, Clone, PartialEq)]
pub struct LastChange {
    pub kind: LastChangeKind,
    pub count: usize,
    pub inserted_text: String,
    pub caret: CaretPosition,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LastChangeKind {
    /// An Insert-mode session that ended in a commit.
    InsertEdit,
    /// `x`
    ClearCell,
    /// `r<char>`
    ReplaceChar(char),
    /// `dd`
    DeleteRows,
    /// `d` composed with a motion.
    DeleteMotion(Motion),
    /// `p` / `P`
    Paste { before: bool },
}

/// Committed search results and where we stand in them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub pattern: String,
    pub matches: Vec<GridPosition>,
    pub current: Option<usize>,
}

impl SearchState {
    pub fn clear(&mut self) {
        self.pattern.clear();
        self.matches.clear();
        self.current = None;
    }

    pub fn current_position(&self) -> Option<GridPosition> {
        self.current.map(|i| self.matches[i])
    }
}

/// Everything the modal engine tracks for one open document.
pub struct VimState {
    pub mode: Mode,
    pub cursor: GridPosition,
    pub selection: Option<SelectionRange>,
    pub selected_rows: BTreeSet<usize>,
    pub selected_columns: BTreeSet<usize>,
    pub pending: PendingKeys,
    pub pending_count: Option<usize>,
    pub command_kind: Option<CommandKind>,
    pub command_buffer: String,
    pub last_yank: Option<YankedContent>,
    pub last_change: Option<LastChange>,
    /// Cell value when Insert was entered, for the commit diff and undo.
    pub insert_original_value: String,
    pub insert_start_position: GridPosition,
    pub caret: CaretPosition,
    /// The in-core scratch buffer Insert mode types into.
    pub insert_buffer: String,
    pub insert_caret: usize,
    /// Set when a change operator covered more than one cell; commit applies
    /// the typed text to the whole range.
    pub pending_bulk_edit: Option<SelectionRange>,
    /// Rows the view shows at once; drives page/half-page motions.
    pub viewport_rows: usize,
    pub search: SearchState,
}

impl VimState {
    pub fn new() -> Self {
        VimState {
            mode: Mode::Normal,
            cursor: GridPosition::new(0, 0),
            selection: None,
            selected_rows: BTreeSet::new(),
            selected_columns: BTreeSet::new(),
            pending: PendingKeys::default(),
            pending_count: None,
            command_kind: None,
            command_buffer: String::new(),
            last_yank: None,
            last_change: None,
            insert_original_value: String::new(),
            insert_start_position: GridPosition::new(0, 0),
            caret: CaretPosition::End,
            insert_buffer: String::new(),
            insert_caret: 0,
            pending_bulk_edit: None,
            viewport_rows: 20,
            search: SearchState::default(),
        }
    }

    /// Consume the count prefix, defaulting to 1.
    pub fn take_count(&mut self) -> usize {
        self.pending_count.take().unwrap_or(1).max(1)
    }

    /// Extend the count prefix with one digit, saturating well below
    /// overflow.
    pub fn push_count_digit(&mut self, digit: u32) {
        let current = self.pending_count.unwrap_or(0);
        self.pending_count = Some((current.saturating_mul(10) + digit as usize).min(1_000_000));
    }

    /// Abandon any partial sequence and count.
    pub fn cancel_pending(&mut self) {
        self.pending.clear();
        self.pending_count = None;
    }
}

impl Default for VimState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_expiry_by_timestamp() {
        let t0 = Instant::now();
        let mut pending = PendingKeys::default();
        pending.push(KeyInput::char('g'), t0);
        assert!(!pending.expired(t0 + Duration::from_millis(499)));
        assert!(pending.expired(t0 + Duration::from_millis(501)));

        pending.expire(t0 + Duration::from_millis(501));
        assert!(pending.is_empty());
    }

    #[test]
    fn test_pending_timestamp_is_first_insert() {
        let t0 = Instant::now();
        let mut pending = PendingKeys::default();
        pending.push(KeyInput::char('g'), t0);
        // A second key does not refresh the stamp.
        pending.push(KeyInput::char('g'), t0 + Duration::from_millis(400));
        assert!(pending.expired(t0 + Duration::from_millis(501)));
    }

    #[test]
    fn test_count_accumulation() {
        let mut state = VimState::new();
        state.push_count_digit(1);
        state.push_count_digit(2);
        state.push_count_digit(3);
        assert_eq!(state.take_count(), 123);
        // Consumed: next take is the default.
        assert_eq!(state.take_count(), 1);
    }

    #[test]
    fn test_cancel_pending() {
        let mut state = VimState::new();
        state.pending.push(KeyInput::char('d'), Instant::now());
        state.push_count_digit(4);
        state.cancel_pending();
        assert!(state.pending.is_empty());
        assert_eq!(state.pending_count, None);
    }
}
