//! TSV/CSV parsing and serialization, plus crash-safe file round-trips.
//!
//! Quoting follows the usual tabular-text rules: a double-quoted field may
//! contain the delimiter, quotes (doubled), and line terminators; everything
//! else is taken verbatim. Malformed quoting never fails the parse; the
//! result carries a warning instead.

use crate::document::Document;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelimiterFormat {
    Tab,
    Comma,
}

impl DelimiterFormat {
    /// Detect by extension: `.tsv`/`.tab`/`.txt` are tab, `.csv` is comma,
    /// anything else defaults to tab.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("csv") => DelimiterFormat::Comma,
            _ => DelimiterFormat::Tab,
        }
    }

    pub fn char(&self) -> char {
        match self {
            DelimiterFormat::Tab => '\t',
            DelimiterFormat::Comma => ',',
        }
    }
}

/// Raw parse result: the cell grid (possibly ragged) and a non-fatal warning
/// for malformed quoting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    pub rows: Vec<Vec<String>>,
    pub warning: Option<String>,
}

#[derive(Clone, Copy, PartialEq)]
enum FieldState {
    Start,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// Split `text` into rows of fields. Accepts `\r\n`, `\n` and bare `\r` line
/// terminators; a trailing terminator after the final row emits no empty row.
pub fn parse(text: &str, delimiter: DelimiterFormat) -> ParseOutcome {
    let delim = delimiter.char();
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut state = FieldState::Start;
    let mut warning: Option<String> = None;

    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match state {
            FieldState::Start => match ch {
                '"' => state = FieldState::Quoted,
                c if c == delim => row.push(std::mem::take(&mut field)),
                '\n' | '\r' => {
                    if ch == '\r' && chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                }
                c => {
                    field.push(c);
                    state = FieldState::Unquoted;
                }
            },
            FieldState::Unquoted => match ch {
                c if c == delim => {
                    row.push(std::mem::take(&mut field));
                    state = FieldState::Start;
                }
                '\n' | '\r' => {
                    if ch == '\r' && chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                    state = FieldState::Start;
                }
                c => field.push(c),
            },
            FieldState::Quoted => match ch {
                '"' => state = FieldState::QuoteInQuoted,
                c => field.push(c),
            },
            FieldState::QuoteInQuoted => match ch {
                '"' => {
                    field.push('"');
                    state = FieldState::Quoted;
                }
                c if c == delim => {
                    row.push(std::mem::take(&mut field));
                    state = FieldState::Start;
                }
                '\n' | '\r' => {
                    if ch == '\r' && chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                    state = FieldState::Start;
                }
                c => {
                    // Text after a closing quote: keep it, remember the file
                    // was malformed, and continue the field unquoted.
                    warning.get_or_insert_with(|| {
                        format!("malformed quoting in row {}", rows.len() + 1)
                    });
                    field.push(c);
                    state = FieldState::Unquoted;
                }
            },
        }
    }

    match state {
        FieldState::Quoted | FieldState::QuoteInQuoted => {
            // Unterminated quote at end of input.
            if state == FieldState::Quoted {
                warning.get_or_insert_with(|| {
                    format!("unterminated quote in row {}", rows.len() + 1)
                });
            }
            row.push(field);
            rows.push(row);
        }
        FieldState::Unquoted => {
            row.push(field);
            rows.push(row);
        }
        FieldState::Start => {
            // A pending field only exists here when the line ended in a
            // delimiter; a clean terminator leaves both buffers empty.
            if !row.is_empty() {
                row.push(field);
                rows.push(row);
            }
        }
    }

    ParseOutcome { rows, warning }
}

fn needs_quoting(value: &str, delim: char) -> bool {
    value.contains(delim) || value.contains('"') || value.contains('\n') || value.contains('\r')
}

fn write_field(out: &mut String, value: &str, delim: char) {
    if needs_quoting(value, delim) {
        out.push('"');
        for ch in value.chars() {
            if ch == '"' {
                out.push('"');
            }
            out.push(ch);
        }
        out.push('"');
    } else {
        out.push_str(value);
    }
}

/// Serialize every cell of the document: rows joined with `\n`, no trailing
/// newline, fields quoted only when they need it.
pub fn serialize(document: &Document) -> String {
    let delim = document.delimiter().char();
    let mut out = String::new();
    for (i, row) in document.values().iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for (j, value) in row.iter().enumerate() {
            if j > 0 {
                out.push(delim);
            }
            write_field(&mut out, value, delim);
        }
    }
    out
}

/// Read and parse a file into a fresh clean document. `explicit` overrides
/// extension-based delimiter detection.
pub fn load(path: &Path, explicit: Option<DelimiterFormat>) -> Result<Document> {
    let delimiter = explicit.unwrap_or_else(|| DelimiterFormat::from_path(path));
    let text = fs::read_to_string(path)?;
    let outcome = parse(&text, delimiter);
    let mut document = Document::from_values(outcome.rows, delimiter);
    document.set_file_path(Some(path.to_path_buf()));
    document.set_parse_warning(outcome.warning);
    document.set_dirty(false);
    Ok(document)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Serialize and write via temp-file + fsync + rename so a crash never leaves
/// a half-written target. Clears the dirty flag only after the rename lands;
/// a failed save leaves it untouched.
pub fn save(document: &mut Document, path: &Path) -> Result<()> {
    let text = serialize(document);
    let temp = temp_path_for(path);
    {
        let mut file = fs::File::create(&temp)?;
        file.write_all(text.as_bytes())?;
        file.sync_all()?;
    }
    if let Err(e) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(e.into());
    }
    document.set_file_path(Some(path.to_path_buf()));
    document.set_dirty(false);
    Ok(())
}
