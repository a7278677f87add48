//! Core document model for a modal tabular-text editor: the grid of string
//! cells, the TSV/CSV codec, and the invertible command stream with its
//! undo/redo history. Everything here is synchronous and single-threaded;
//! the controller crate drives it key by key.

pub mod codec;
pub mod command;
pub mod constants;
pub mod document;
pub mod error;
pub mod ports;
pub mod types;

// Re-export commonly used types
pub use codec::DelimiterFormat;
pub use command::{CapturedRegion, CommandHistory, EditCommand};
pub use document::{Cell, Document, DocumentEvent, Row};
pub use error::{EditorError, Result};
pub use ports::{ClipboardPort, InMemoryClipboard, NullClipboard};
pub use types::{GridPosition, SelectionKind, SelectionRange, YankedContent};
