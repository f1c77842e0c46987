//! Target resolution strategies.
//!
//! One resolver is selected per session, matching the addressing mode the
//! prompt contract was built for. Paths resolve against the live document;
//! indices resolve against the inventory snapshot that produced the prompt,
//! with an explicit policy for snapshots the document has since outgrown.

use crate::actions::ActionTarget;
use crate::config::{AddressingMode, StaleSnapshotPolicy};
use crate::dom::{Document, NodeId};
use crate::extractor::{extract, PageSnapshot};

pub trait TargetResolver: Send + Sync {
    /// Resolve one target to a live node. `None` means the action cannot be
    /// attempted; the sequence policy decides what happens next. The
    /// snapshot is mutable because stale-refresh replaces it wholesale.
    fn resolve(
        &self,
        doc: &Document,
        snapshot: &mut PageSnapshot,
        target: &ActionTarget,
    ) -> Option<NodeId>;
}

pub fn resolver_for(mode: AddressingMode, stale: StaleSnapshotPolicy) -> Box<dyn TargetResolver> {
    match mode {
        AddressingMode::Path => Box::new(PathResolver),
        AddressingMode::Index => Box::new(IndexResolver { stale }),
    }
}

// ── Path addressing ──────────────────────────────────────────────────────

/// Resolves selector paths of the shape the prompt asks the model for:
/// `body > div.container > button.submit`. Segments are `tag#id.class`
/// simple selectors joined by `>` (child) or whitespace (descendant).
/// First match in document order wins.
pub struct PathResolver;

impl TargetResolver for PathResolver {
    fn resolve(
        &self,
        doc: &Document,
        _snapshot: &mut PageSnapshot,
        target: &ActionTarget,
    ) -> Option<NodeId> {
        let ActionTarget::Path(path) = target else {
            tracing::warn!("path resolver received a non-path target");
            return None;
        };
        let chain = parse_selector_chain(path)?;
        let matched = first_match(doc, &chain);
        if matched.is_none() {
            tracing::warn!(path = %path, "selector path matched nothing");
        }
        matched
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Child,
    Descendant,
}

#[derive(Debug, Clone, Default)]
struct SimpleSelector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl SimpleSelector {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let n = doc.node(node);
        if let Some(tag) = &self.tag {
            if n.tag() != tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if n.id() != id {
                return false;
            }
        }
        self.classes.iter().all(|c| n.has_class(c))
    }
}

fn parse_selector_chain(path: &str) -> Option<Vec<(Combinator, SimpleSelector)>> {
    let mut chain = Vec::new();
    let mut next_combinator = Combinator::Descendant;
    for token in path.split_whitespace() {
        if token == ">" {
            next_combinator = Combinator::Child;
            continue;
        }
        chain.push((next_combinator, parse_simple_selector(token)?));
        next_combinator = Combinator::Descendant;
    }
    if chain.is_empty() {
        None
    } else {
        Some(chain)
    }
}

fn parse_simple_selector(token: &str) -> Option<SimpleSelector> {
    let mut selector = SimpleSelector::default();
    let mut rest = token;

    let tag_end = rest.find(['#', '.']).unwrap_or(rest.len());
    if tag_end > 0 {
        selector.tag = Some(rest[..tag_end].to_ascii_lowercase());
    }
    rest = &rest[tag_end..];

    while !rest.is_empty() {
        let marker = rest.as_bytes()[0];
        let value_end = rest[1..].find(['#', '.']).map(|i| i + 1).unwrap_or(rest.len());
        let value = &rest[1..value_end];
        if value.is_empty() {
            return None;
        }
        match marker {
            b'#' => selector.id = Some(value.to_string()),
            b'.' => selector.classes.push(value.to_string()),
            _ => return None,
        }
        rest = &rest[value_end..];
    }
    Some(selector)
}

fn first_match(doc: &Document, chain: &[(Combinator, SimpleSelector)]) -> Option<NodeId> {
    find_in_order(doc, doc.body(), chain)
}

fn find_in_order(
    doc: &Document,
    node: NodeId,
    chain: &[(Combinator, SimpleSelector)],
) -> Option<NodeId> {
    if matches_chain(doc, node, chain) {
        return Some(node);
    }
    for child in doc.node(node).children() {
        if let Some(found) = find_in_order(doc, *child, chain) {
            return Some(found);
        }
    }
    None
}

/// Right-to-left chain match: the node satisfies the last selector and its
/// ancestry satisfies the rest under the given combinators.
fn matches_chain(doc: &Document, node: NodeId, chain: &[(Combinator, SimpleSelector)]) -> bool {
    let (last, rest) = match chain.split_last() {
        Some(split) => split,
        None => return true,
    };
    if !last.1.matches(doc, node) {
        return false;
    }
    match last.0 {
        Combinator::Child => match doc.node(node).parent() {
            Some(parent) => matches_chain(doc, parent, rest),
            None => rest.is_empty(),
        },
        Combinator::Descendant => {
            if rest.is_empty() {
                return true;
            }
            let mut ancestor = doc.node(node).parent();
            while let Some(a) = ancestor {
                if matches_chain(doc, a, rest) {
                    return true;
                }
                ancestor = doc.node(a).parent();
            }
            false
        }
    }
}

// ── Index addressing ─────────────────────────────────────────────────────

/// Resolves inventory indices, snapshot-consistently: an index is only
/// trusted against the document state it was extracted from.
pub struct IndexResolver {
    pub stale: StaleSnapshotPolicy,
}

impl TargetResolver for IndexResolver {
    fn resolve(
        &self,
        doc: &Document,
        snapshot: &mut PageSnapshot,
        target: &ActionTarget,
    ) -> Option<NodeId> {
        let ActionTarget::Index(index) = target else {
            tracing::warn!("index resolver received a non-index target");
            return None;
        };

        if snapshot.revision != doc.revision() {
            match self.stale {
                StaleSnapshotPolicy::Refresh => {
                    tracing::info!(
                        snapshot_revision = snapshot.revision,
                        document_revision = doc.revision(),
                        "snapshot is stale, re-extracting"
                    );
                    *snapshot = extract(doc, AddressingMode::Index);
                }
                StaleSnapshotPolicy::Reject => {
                    tracing::warn!(
                        index,
                        snapshot_revision = snapshot.revision,
                        document_revision = doc.revision(),
                        "snapshot is stale, rejecting index target"
                    );
                    return None;
                }
            }
        }

        match snapshot.elements.get(*index) {
            Some(element) => Some(element.node),
            None => {
                tracing::warn!(index, inventory = snapshot.elements.len(), "index out of range");
                None
            }
        }
    }
}
