//! In-memory live document the pipeline runs against.
//!
//! The host owns a `Document` and mutates it through this API; the pipeline
//! only ever holds `NodeId` back-references into it. Structural mutations
//! (insert/remove) bump a revision counter, which is what snapshot staleness
//! checks are keyed on. Value, focus and event changes leave it alone, the
//! same way a childList-only mutation observer would not fire for them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Handle into a document's node arena. Only meaningful for the document
/// that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    tag: String,
    attrs: HashMap<String, String>,
    text: String,
    value: String,
    width: u32,
    height: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn id(&self) -> &str {
        self.attr("id").unwrap_or("")
    }

    pub fn classes(&self) -> Vec<&str> {
        self.attr("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().iter().any(|c| *c == class)
    }

    /// Own text, not including descendants.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Non-zero rendered box.
    pub fn is_visible(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Observable side effects of action execution, in the order they happened.
/// Hosts drain these to apply them to a real UI; tests assert on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PageEvent {
    Click {
        target: NodeId,
        bubbles: bool,
        cancelable: bool,
    },
    Input {
        target: NodeId,
        bubbles: bool,
    },
    /// Native form submission; does not itself fire a submit event.
    FormSubmitted { form: NodeId },
    ScrolledIntoView {
        target: NodeId,
        smooth: bool,
        centered: bool,
    },
    Focused { target: NodeId },
}

pub struct Document {
    nodes: Vec<Node>,
    body: NodeId,
    revision: u64,
    focused: Option<NodeId>,
    events: Vec<PageEvent>,
}

impl Document {
    pub fn new() -> Self {
        let body = Node {
            tag: "body".into(),
            attrs: HashMap::new(),
            text: String::new(),
            value: String::new(),
            width: 1280,
            height: 720,
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![body],
            body: NodeId(0),
            revision: 0,
            focused: None,
            events: Vec::new(),
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Structural revision; bumped by insert/remove only.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Detached until appended somewhere. Tags are stored lowercased.
    /// Elements get a default non-zero box; callers size or hide them
    /// explicitly via `set_rect`.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            tag: tag.to_ascii_lowercase(),
            attrs: HashMap::new(),
            text: String::new(),
            value: String::new(),
            width: 100,
            height: 20,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        self.nodes[id.0].attrs.insert(name.to_string(), value.to_string());
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.nodes[id.0].text = text.to_string();
    }

    pub fn set_rect(&mut self, id: NodeId, width: u32, height: u32) {
        self.nodes[id.0].width = width;
        self.nodes[id.0].height = height;
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        self.revision += 1;
    }

    /// Detaches a subtree. Its `NodeId`s stay allocated but no longer reach
    /// the body, so extraction and path resolution stop seeing them.
    pub fn remove_node(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
            self.revision += 1;
        }
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.body {
                return true;
            }
            match self.nodes[current.0].parent {
                Some(p) => current = p,
                None => return false,
            }
        }
    }

    /// Convenience for hosts and tests: create, attribute, and attach in one
    /// call.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: &[(&str, &str)],
        text: &str,
    ) -> NodeId {
        let id = self.create_element(tag);
        for (name, value) in attrs {
            self.set_attr(id, name, value);
        }
        self.set_text(id, text);
        self.append_child(parent, id);
        id
    }

    /// Concatenated text of the node and its descendants, document order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[id.0];
        if !node.text.is_empty() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&node.text);
        }
        for child in node.children.clone() {
            self.collect_text(child, out);
        }
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn focus(&mut self, id: NodeId) {
        self.focused = Some(id);
        self.events.push(PageEvent::Focused { target: id });
    }

    pub fn set_value(&mut self, id: NodeId, value: &str) {
        self.nodes[id.0].value = value.to_string();
    }

    pub fn dispatch_click(&mut self, id: NodeId) {
        self.events.push(PageEvent::Click {
            target: id,
            bubbles: true,
            cancelable: true,
        });
    }

    pub fn dispatch_input(&mut self, id: NodeId) {
        self.events.push(PageEvent::Input {
            target: id,
            bubbles: true,
        });
    }

    /// Nearest `form` ancestor, if any.
    pub fn form_owner(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.nodes[id.0].parent;
        while let Some(p) = current {
            if self.nodes[p.0].tag == "form" {
                return Some(p);
            }
            current = self.nodes[p.0].parent;
        }
        None
    }

    pub fn submit_form(&mut self, form: NodeId) {
        self.events.push(PageEvent::FormSubmitted { form });
    }

    pub fn scroll_into_view(&mut self, id: NodeId, smooth: bool, centered: bool) {
        self.events.push(PageEvent::ScrolledIntoView {
            target: id,
            smooth,
            centered,
        });
    }

    pub fn events(&self) -> &[PageEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<PageEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
