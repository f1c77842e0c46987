pub mod document;
pub mod fixture;

pub use document::{Document, Node, NodeId, PageEvent};
pub use fixture::PageFixture;
