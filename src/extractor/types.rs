use serde::Serialize;

use crate::dom::NodeId;

/// Attribute bag carried alongside each inventory entry. Field names match
/// the JSON shape the model sees; absent attributes serialize as null.
#[derive(Debug, Clone, Serialize)]
pub struct ElementAttributes {
    pub id: String,
    /// Class list joined with spaces.
    pub classes: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub input_type: Option<String>,
    pub placeholder: Option<String>,
    pub title: Option<String>,
}

/// One interactive element captured by an extraction pass. The `node`
/// back-reference is valid only until the next pass replaces the inventory.
#[derive(Debug, Clone, Serialize)]
pub struct PageElement {
    pub index: usize,
    #[serde(skip)]
    pub node: NodeId,
    pub text: String,
    #[serde(rename = "tagName")]
    pub tag_name: String,
    pub attributes: ElementAttributes,
}

/// Hierarchical mirror of the body subtree, depth-capped. Actionable nodes
/// carry the index they were assigned in the flat inventory.
#[derive(Debug, Clone, Serialize)]
pub struct PageStructure {
    pub tag: String,
    pub id: String,
    pub classes: Vec<String>,
    pub text: String,
    pub actionable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub children: Vec<PageStructure>,
}

/// The result of one extraction pass, rebuilt wholesale each time. The
/// revision records which state of the document it describes.
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    pub revision: u64,
    pub elements: Vec<PageElement>,
    pub structure: Option<PageStructure>,
}
