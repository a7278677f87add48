use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("position out of bounds: row {row}, column {column}")]
    OutOfBounds { row: usize, column: usize },

    #[error("bad search pattern: {0}")]
    BadPattern(String),

    #[error("not an editor command: {0}")]
    UnknownCommand(String),

    #[error("malformed command: {0}")]
    InvalidCommand(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EditorError {
    pub fn out_of_bounds(row: usize, column: usize) -> Self {
        EditorError::OutOfBounds { row, column }
    }

    /// True for failures the caller should surface as a transient status
    /// message rather than propagate.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            EditorError::BadPattern(_) | EditorError::UnknownCommand(_) | EditorError::InvalidCommand(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, EditorError>;
