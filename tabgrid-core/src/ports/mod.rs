//! Capability seams the host injects at construction time.

use crate::error::Result;
use std::cell::RefCell;

/// Text clipboard the editor shares with the rest of the desktop. Yanks are
/// mirrored here; pastes fall back to it when the in-memory register has been
/// invalidated by an external clipboard change.
pub trait ClipboardPort {
    fn read_text(&self) -> Result<String>;
    fn write_text(&self, text: &str) -> Result<()>;
}

/// Discards writes, reads back empty. The default when the host wires no
/// clipboard.
#[derive(Debug, Default)]
pub struct NullClipboard;

impl ClipboardPort for NullClipboard {
    fn read_text(&self) -> Result<String> {
        Ok(String::new())
    }

    fn write_text(&self, _text: &str) -> Result<()> {
        Ok(())
    }
}

/// Process-local clipboard for tests and headless use.
#[derive(Debug, Default)]
pub struct InMemoryClipboard {
    contents: RefCell<String>,
}

impl InMemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardPort for InMemoryClipboard {
    fn read_text(&self) -> Result<String> {
        Ok(self.contents.borrow().clone())
    }

    fn write_text(&self, text: &str) -> Result<()> {
        *self.contents.borrow_mut() = text.to_string();
        Ok(())
    }
}
