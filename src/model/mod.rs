pub mod color;
pub mod history;

pub use color::Color;
pub use history::{ColorHistory, HISTORY_CAPACITY};
