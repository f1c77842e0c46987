pub mod scan;
pub mod types;

pub use scan::{extract, is_actionable, MAX_DEPTH};
pub use types::{ElementAttributes, PageElement, PageSnapshot, PageStructure};
