//! Editor-level change notifications. Cell-level changes travel on the
//! document's own channel; this one carries everything the view renders
//! around the grid (cursor, mode, selection, search, status line) plus the
//! requests the shell acts on (close, tab switch).

use crate::state::Mode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tabgrid_core::GridPosition;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditorEvent {
    CursorMoved {
        from: GridPosition,
        to: GridPosition,
    },
    ModeChanged {
        from: Mode,
        to: Mode,
    },
    SelectionChanged,
    SearchChanged {
        pattern: String,
        match_count: usize,
    },
    /// The cells in these columns changed; the view should re-measure them.
    ColumnWidthsInvalidated {
        columns: Vec<usize>,
    },
    StatusMessage {
        text: String,
    },
    FileSaved {
        path: PathBuf,
    },
    /// `:q` / `:wq` / `:q!`. The unsaved-changes guard is the view's call;
    /// the dirty flag is its input.
    CloseRequested {
        force: bool,
    },
    NextTabRequested,
    PrevTabRequested,
}
