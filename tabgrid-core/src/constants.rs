//! Shared numeric defaults.

/// Row/column extents of a freshly created, unsaved document.
pub const EMPTY_DOCUMENT_ROWS: usize = 100;
pub const EMPTY_DOCUMENT_COLUMNS: usize = 50;

/// Minimum column count the grid view pads to. The codec never pads so saved
/// files do not grow trailing delimiters; the view calls `ensure_size` with
/// this when it wants the padding.
pub const MIN_VISIBLE_COLUMNS: usize = 20;

/// Undo/redo stack cap.
pub const MAX_HISTORY_SIZE: usize = 100;
