mod command;
mod history;

pub use command::{CapturedRegion, EditCommand};
pub use history::CommandHistory;
