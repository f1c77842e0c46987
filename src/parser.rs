//! Interprets raw model output as an action list.
//!
//! Model output is hostile input: the only guarantee worth assuming is that
//! it is text. Strict JSON parse, per-entry validation, hard cap on the
//! number of actions. Nothing in here panics or returns an error to the
//! caller; a response we cannot use is `None`.

use crate::actions::{Action, ActionKind, ActionTarget, RawAction};
use crate::config::AddressingMode;

/// Parse one completion into executable actions. `None` means the response
/// was not a JSON array of action-shaped objects at all; `Some(vec)` may
/// still be empty after validation drops every entry.
pub fn parse_actions(
    response: &str,
    mode: AddressingMode,
    max_actions: usize,
) -> Option<Vec<Action>> {
    let json = strip_code_fences(response);

    let raw: Vec<RawAction> = match serde_json::from_str(json) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::error!(error = %e, "failed to parse LLM response");
            return None;
        }
    };

    let total = raw.len();
    let mut actions = Vec::new();
    for entry in raw {
        if actions.len() >= max_actions {
            tracing::warn!(
                total,
                cap = max_actions,
                "action list exceeds cap, dropping the rest"
            );
            break;
        }
        match validate(entry, mode) {
            Some(action) => actions.push(action),
            None => tracing::warn!("dropping action without usable target and kind"),
        }
    }
    Some(actions)
}

/// Both a target (in the active addressing scheme) and a kind must be
/// present; the schemes are never mixed.
fn validate(raw: RawAction, mode: AddressingMode) -> Option<Action> {
    let kind = ActionKind::parse(raw.action_type.as_deref()?.trim());

    let target = match mode {
        AddressingMode::Path => {
            let path = raw.target_path?;
            if path.trim().is_empty() {
                return None;
            }
            ActionTarget::Path(path)
        }
        AddressingMode::Index => {
            let index = raw.target_index?;
            if index < 0 {
                return None;
            }
            ActionTarget::Index(index as usize)
        }
    };

    Some(Action {
        target,
        kind,
        text: raw.text_to_input,
    })
}

/// Models wrap JSON in markdown fences often enough that stripping them is
/// part of the contract.
fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();
    for prefix in ["```json", "```"] {
        if let Some(inner) = trimmed.strip_prefix(prefix) {
            if let Some(inner) = inner.strip_suffix("```") {
                return inner.trim();
            }
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_index_response() {
        let response = r#"[
            {"targetIndex": 0, "actionType": "input", "textToInput": "hello"},
            {"targetIndex": 1, "actionType": "click"}
        ]"#;
        let actions = parse_actions(response, AddressingMode::Index, 10).unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].target, ActionTarget::Index(0));
        assert_eq!(actions[0].kind, ActionKind::Input);
        assert_eq!(actions[0].text.as_deref(), Some("hello"));
        assert_eq!(actions[1].kind, ActionKind::Click);
        assert!(actions[1].text.is_none());
    }

    #[test]
    fn path_response_with_code_fences() {
        let response = "```json\n[{\"targetPath\": \"body > form > button\", \"actionType\": \"click\"}]\n```";
        let actions = parse_actions(response, AddressingMode::Path, 10).unwrap();
        assert_eq!(
            actions[0].target,
            ActionTarget::Path("body > form > button".to_string())
        );
    }

    #[test]
    fn truncated_json_yields_none() {
        let response = r#"[{"targetIndex": 0, "actionType": "cli"#;
        assert!(parse_actions(response, AddressingMode::Index, 10).is_none());
    }

    #[test]
    fn prose_yields_none() {
        assert!(parse_actions("Sure! Here is what I would do…", AddressingMode::Index, 10).is_none());
    }

    #[test]
    fn entries_missing_target_or_kind_are_dropped() {
        let response = r#"[
            {"actionType": "click"},
            {"targetIndex": 2},
            {"targetIndex": -1, "actionType": "click"},
            {"targetPath": "body > a", "actionType": "click"},
            {"targetIndex": 3, "actionType": "click"}
        ]"#;
        let actions = parse_actions(response, AddressingMode::Index, 10).unwrap();
        assert_eq!(actions.len(), 1, "only the fully-addressed entry survives");
        assert_eq!(actions[0].target, ActionTarget::Index(3));
    }

    #[test]
    fn unknown_kind_is_preserved_not_rejected() {
        let response = r#"[{"targetIndex": 0, "actionType": "teleport"}]"#;
        let actions = parse_actions(response, AddressingMode::Index, 10).unwrap();
        assert_eq!(actions[0].kind, ActionKind::Other("teleport".to_string()));
    }

    #[test]
    fn action_list_is_capped() {
        let entries: Vec<String> = (0..25)
            .map(|i| format!(r#"{{"targetIndex": {i}, "actionType": "click"}}"#))
            .collect();
        let response = format!("[{}]", entries.join(","));
        let actions = parse_actions(&response, AddressingMode::Index, 10).unwrap();
        assert_eq!(actions.len(), 10);
    }
}
