//! JSON page fixtures.
//!
//! Hosts that embed the library bind their own live document; the CLI and
//! tests load one from a JSON description instead.

use std::collections::HashMap;

use serde::Deserialize;

use crate::dom::{Document, NodeId};
use crate::errors::VoiceNavResult;

#[derive(Debug, Clone, Deserialize)]
pub struct PageFixture {
    pub tag: String,
    #[serde(default)]
    pub attrs: HashMap<String, String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub value: Option<String>,
    /// Rendered [width, height]. When absent: zero box for hidden elements,
    /// a default non-zero box otherwise.
    #[serde(default)]
    pub rect: Option<[u32; 2]>,
    #[serde(default)]
    pub children: Vec<PageFixture>,
}

impl PageFixture {
    fn hidden(&self) -> bool {
        self.attrs.contains_key("hidden")
            || self.attrs.get("type").map(String::as_str) == Some("hidden")
    }
}

impl Document {
    pub fn from_json(json: &str) -> VoiceNavResult<Document> {
        let fixture: PageFixture = serde_json::from_str(json)?;
        Ok(Document::from_fixture(&fixture))
    }

    /// The fixture root is treated as the document body; its tag is ignored.
    pub fn from_fixture(fixture: &PageFixture) -> Document {
        let mut doc = Document::new();
        let body = doc.body();
        apply_node(&mut doc, body, fixture, true);
        for child in &fixture.children {
            build_subtree(&mut doc, body, child);
        }
        doc
    }
}

fn build_subtree(doc: &mut Document, parent: NodeId, fixture: &PageFixture) {
    let id = doc.create_element(&fixture.tag);
    apply_node(doc, id, fixture, false);
    doc.append_child(parent, id);
    for child in &fixture.children {
        build_subtree(doc, id, child);
    }
}

fn apply_node(doc: &mut Document, id: NodeId, fixture: &PageFixture, is_body: bool) {
    for (name, value) in &fixture.attrs {
        doc.set_attr(id, name, value);
    }
    doc.set_text(id, &fixture.text);
    if let Some(value) = &fixture.value {
        doc.set_value(id, value);
    }
    match fixture.rect {
        Some([w, h]) => doc.set_rect(id, w, h),
        None if is_body => {}
        None if fixture.hidden() => doc.set_rect(id, 0, 0),
        None => {}
    }
}
