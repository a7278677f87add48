pub mod position;
pub mod selection;
pub mod yank;

pub use position::GridPosition;
pub use selection::{SelectionKind, SelectionRange};
pub use yank::YankedContent;
