use crate::types::GridPosition;
use serde::{Deserialize, Serialize};

/// Change notifications a document emits synchronously from inside the
/// mutating call. Subscribers pattern-match; they must not mutate the
/// document reentrantly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentEvent {
    CellChanged { position: GridPosition },
    RowInserted { index: usize },
    RowDeleted { index: usize },
    ColumnInserted { index: usize },
    ColumnDeleted { index: usize },
    Resized { rows: usize, columns: usize },
    Sorted { column: usize },
}
