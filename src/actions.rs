//! Actions derived from model output. Transient: created by parsing one
//! response, discarded after execution.

use serde::{Deserialize, Serialize};

/// Wire shape of one entry in the model's JSON array. Every field is
/// optional because the output is untrusted; validation decides what
/// survives.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAction {
    #[serde(default)]
    pub target_path: Option<String>,
    #[serde(default)]
    pub target_index: Option<i64>,
    #[serde(default)]
    pub action_type: Option<String>,
    #[serde(default)]
    pub text_to_input: Option<String>,
}

/// The two addressing schemes. A pipeline instance only ever produces one of
/// them, matching its configured mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionTarget {
    Path(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Click,
    Input,
    Submit,
    Scroll,
    /// Anything else the model made up. Warned and skipped at execution,
    /// never fatal.
    Other(String),
}

impl ActionKind {
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "click" => ActionKind::Click,
            "input" => ActionKind::Input,
            "submit" => ActionKind::Submit,
            "scroll" => ActionKind::Scroll,
            other => ActionKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ActionKind::Click => "click",
            ActionKind::Input => "input",
            ActionKind::Submit => "submit",
            ActionKind::Scroll => "scroll",
            ActionKind::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    pub target: ActionTarget,
    pub kind: ActionKind,
    /// Only meaningful for `input`; empty string counts as present.
    pub text: Option<String>,
}

/// What became of one action, recorded per command in the session history.
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub action: Action,
    #[serde(flatten)]
    pub status: ActionStatus,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionStatus {
    Performed,
    Skipped { reason: String },
    Failed { error: String },
}

impl ActionOutcome {
    pub fn now(action: Action, status: ActionStatus) -> Self {
        Self {
            action,
            status,
            timestamp: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parsing_is_case_insensitive() {
        assert_eq!(ActionKind::parse("Click"), ActionKind::Click);
        assert_eq!(ActionKind::parse("INPUT"), ActionKind::Input);
        assert_eq!(
            ActionKind::parse("teleport"),
            ActionKind::Other("teleport".to_string())
        );
    }

    #[test]
    fn raw_action_tolerates_missing_fields() {
        let raw: RawAction = serde_json::from_str(r#"{"actionType":"click"}"#).unwrap();
        assert_eq!(raw.action_type.as_deref(), Some("click"));
        assert!(raw.target_path.is_none());
        assert!(raw.target_index.is_none());
    }
}
