//! Modal (vim-style) editing engine for tabular documents: key dispatch,
//! mode machine, visual selections, search and Ex commands, bindings and
//! runtime configuration. Sits on top of `tabgrid-core`, which owns the
//! document, codec and undo history.

pub mod config;
pub mod controller;
pub mod events;
pub mod keymap;
pub mod state;
pub mod vim;

// Re-export key types
pub use config::{ColorTheme, EditorConfig, SessionDescriptor};
pub use controller::EditorController;
pub use events::EditorEvent;
pub use keymap::{Key, KeyBindings, KeyInput, MapMode, Modifiers};
pub use state::{CaretPosition, LastChange, LastChangeKind, Mode, VimState};
pub use vim::Motion;
