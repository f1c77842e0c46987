//! Extraction passes over the live document.
//!
//! One entry point, two passes selected by addressing mode: path addressing
//! wants the hierarchical structure the model can derive selector paths
//! from; index addressing wants a flat, visibility-filtered inventory.

use crate::config::AddressingMode;
use crate::dom::{Document, Node, NodeId};
use crate::extractor::types::{ElementAttributes, PageElement, PageSnapshot, PageStructure};

/// Body is depth 0; nodes deeper than this are not mirrored.
pub const MAX_DEPTH: usize = 10;

const ACTIONABLE_TAGS: [&str; 5] = ["a", "button", "input", "select", "textarea"];

pub fn is_actionable(node: &Node) -> bool {
    ACTIONABLE_TAGS.contains(&node.tag())
        || node.attr("role") == Some("button")
        || node.attr("onclick").is_some()
}

/// Run one extraction pass. Rebuilds the whole snapshot; indices from an
/// earlier pass are meaningless against the result.
pub fn extract(doc: &Document, mode: AddressingMode) -> PageSnapshot {
    let snapshot = match mode {
        AddressingMode::Path => extract_tree(doc),
        AddressingMode::Index => extract_flat(doc),
    };
    tracing::debug!(
        revision = snapshot.revision,
        elements = snapshot.elements.len(),
        mode = ?mode,
        "extraction pass complete"
    );
    snapshot
}

/// Flat pass: document-order scan keeping actionable elements with a
/// non-zero rendered box.
fn extract_flat(doc: &Document) -> PageSnapshot {
    let mut elements = Vec::new();
    collect_flat(doc, doc.body(), &mut elements);
    PageSnapshot {
        revision: doc.revision(),
        elements,
        structure: None,
    }
}

fn collect_flat(doc: &Document, id: NodeId, elements: &mut Vec<PageElement>) {
    let node = doc.node(id);
    if is_actionable(node) && node.is_visible() {
        elements.push(page_element(doc, id, elements.len()));
    }
    for child in node.children() {
        collect_flat(doc, *child, elements);
    }
}

/// Tree pass: mirrors the body subtree down to `MAX_DEPTH`, assigning
/// inventory indices to actionable nodes as they are encountered.
fn extract_tree(doc: &Document) -> PageSnapshot {
    let mut elements = Vec::new();
    let structure = build_structure(doc, doc.body(), 0, &mut elements);
    PageSnapshot {
        revision: doc.revision(),
        elements,
        structure,
    }
}

fn build_structure(
    doc: &Document,
    id: NodeId,
    depth: usize,
    elements: &mut Vec<PageElement>,
) -> Option<PageStructure> {
    if depth > MAX_DEPTH {
        return None;
    }
    let node = doc.node(id);
    let actionable = is_actionable(node);
    let mut structure = PageStructure {
        tag: node.tag().to_string(),
        id: node.id().to_string(),
        classes: node.classes().iter().map(|c| c.to_string()).collect(),
        text: doc.text_content(id).trim().to_string(),
        actionable,
        index: None,
        children: Vec::new(),
    };

    if actionable {
        structure.index = Some(elements.len());
        elements.push(page_element(doc, id, elements.len()));
    }

    for child in node.children() {
        if let Some(child_structure) = build_structure(doc, *child, depth + 1, elements) {
            structure.children.push(child_structure);
        }
    }

    Some(structure)
}

fn page_element(doc: &Document, id: NodeId, index: usize) -> PageElement {
    let node = doc.node(id);
    PageElement {
        index,
        node: id,
        text: display_text(doc, id),
        tag_name: node.tag().to_string(),
        attributes: ElementAttributes {
            id: node.id().to_string(),
            classes: node.classes().join(" "),
            name: node.attr("name").map(str::to_string),
            input_type: node.attr("type").map(str::to_string),
            placeholder: node.attr("placeholder").map(str::to_string),
            title: node.attr("title").map(str::to_string),
        },
    }
}

/// First non-empty of visible text, form value, accessible label, alt text.
fn display_text(doc: &Document, id: NodeId) -> String {
    let text = doc.text_content(id);
    let text = text.trim();
    if !text.is_empty() {
        return text.to_string();
    }
    let node = doc.node(id);
    for candidate in [
        Some(node.value()),
        node.attr("aria-label"),
        node.attr("alt"),
    ]
    .into_iter()
    .flatten()
    {
        let candidate = candidate.trim();
        if !candidate.is_empty() {
            return candidate.to_string();
        }
    }
    String::new()
}
