use super::selection::SelectionKind;
use serde::{Deserialize, Serialize};

/// A rectangle of cell values lifted out of a document, plus the selection
/// kind it came from. The kind decides paste semantics: `Line` content is
/// inserted as whole rows, everything else overwrites in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YankedContent {
    pub cells: Vec<Vec<String>>,
    pub source: SelectionKind,
}

impl YankedContent {
    pub fn new(cells: Vec<Vec<String>>, source: SelectionKind) -> Self {
        debug_assert!(
            cells.windows(2).all(|w| w[0].len() == w[1].len()),
            "yanked content must be rectangular"
        );
        YankedContent { cells, source }
    }

    pub fn single(value: String) -> Self {
        YankedContent::new(vec![vec![value]], SelectionKind::Character)
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn columns(&self) -> usize {
        self.cells.first().map(|row| row.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows() == 0 || self.columns() == 0
    }

    /// Textual form written to the system clipboard: rows joined by `\n`,
    /// cells by the document delimiter.
    pub fn to_delimited_text(&self, delimiter: char) -> String {
        self.cells
            .iter()
            .map(|row| row.join(&delimiter.to_string()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Inverse of [`to_delimited_text`] for content that originated outside
    /// the editor. A single cell reads back as `Character`, anything larger
    /// as `Block`; line-paste semantics only survive in-process.
    pub fn from_clipboard_text(text: &str, delimiter: char) -> Self {
        let mut cells: Vec<Vec<String>> = text
            .lines()
            .map(|line| line.split(delimiter).map(str::to_string).collect())
            .collect();
        if cells.is_empty() {
            cells.push(vec![String::new()]);
        }
        let width = cells.iter().map(Vec::len).max().unwrap_or(1);
        for row in &mut cells {
            row.resize(width, String::new());
        }
        let source = if cells.len() == 1 && width == 1 {
            SelectionKind::Character
        } else {
            SelectionKind::Block
        };
        YankedContent { cells, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions() {
        let yank = YankedContent::new(
            vec![vec!["a".into(), "b".into()], vec!["c".into(), "d".into()]],
            SelectionKind::Block,
        );
        assert_eq!(yank.rows(), 2);
        assert_eq!(yank.columns(), 2);
        assert!(!yank.is_empty());
    }

    #[test]
    fn test_delimited_text_round_trip() {
        let yank = YankedContent::new(
            vec![vec!["a".into(), "b".into()], vec!["c".into(), "d".into()]],
            SelectionKind::Block,
        );
        let text = yank.to_delimited_text('\t');
        assert_eq!(text, "a\tb\nc\td");
        let back = YankedContent::from_clipboard_text(&text, '\t');
        assert_eq!(back.cells, yank.cells);
        assert_eq!(back.source, SelectionKind::Block);
    }

    #[test]
    fn test_single_cell_reads_back_as_character() {
        let back = YankedContent::from_clipboard_text("hello", '\t');
        assert_eq!(back.cells, vec![vec!["hello".to_string()]]);
        assert_eq!(back.source, SelectionKind::Character);
    }

    #[test]
    fn test_ragged_clipboard_text_is_squared() {
        let back = YankedContent::from_clipboard_text("a\tb\tc\nd", '\t');
        assert_eq!(back.columns(), 3);
        assert_eq!(back.cells[1], vec!["d".to_string(), String::new(), String::new()]);
    }
}
