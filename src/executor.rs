//! Performs one resolved action against the live document.

use std::time::Duration;

use crate::actions::{Action, ActionKind, ActionStatus};
use crate::dom::{Document, NodeId};

/// Fixed wait after scrolling so layout and animation settle before the
/// interaction lands.
pub const SETTLE_DELAY_MS: u64 = 500;

pub struct ActionExecutor {
    settle: Duration,
}

impl ActionExecutor {
    pub fn new(settle_ms: u64) -> Self {
        Self {
            settle: Duration::from_millis(settle_ms),
        }
    }

    /// Exactly one interaction per call, nothing retried. The returned
    /// status is the only signal; unsupported kinds warn and leave the page
    /// untouched.
    pub async fn perform(&self, doc: &mut Document, node: NodeId, action: &Action) -> ActionStatus {
        match &action.kind {
            ActionKind::Click => {
                self.scroll_and_settle(doc, node).await;
                doc.dispatch_click(node);
                ActionStatus::Performed
            }
            ActionKind::Input => match &action.text {
                Some(text) => {
                    doc.focus(node);
                    doc.set_value(node, text);
                    doc.dispatch_input(node);
                    ActionStatus::Performed
                }
                None => {
                    tracing::warn!("input action without textToInput, nothing to type");
                    ActionStatus::Skipped {
                        reason: "input action without text".into(),
                    }
                }
            },
            ActionKind::Submit => {
                match doc.form_owner(node) {
                    Some(form) => doc.submit_form(form),
                    None => {
                        // No owning form: fall back to the click behavior.
                        self.scroll_and_settle(doc, node).await;
                        doc.dispatch_click(node);
                    }
                }
                ActionStatus::Performed
            }
            ActionKind::Scroll => {
                self.scroll_and_settle(doc, node).await;
                ActionStatus::Performed
            }
            ActionKind::Other(kind) => {
                tracing::warn!(kind = %kind, "action kind is not supported");
                ActionStatus::Skipped {
                    reason: format!("unsupported action kind \"{kind}\""),
                }
            }
        }
    }

    async fn scroll_and_settle(&self, doc: &mut Document, node: NodeId) {
        doc.scroll_into_view(node, true, true);
        tokio::time::sleep(self.settle).await;
    }
}
