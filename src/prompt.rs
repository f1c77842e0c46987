//! Prompt construction.
//!
//! The instruction blocks are part of the external contract with the model:
//! rewording them changes observed model behavior, so they stay fixed and
//! only the command and the page dump vary.

use crate::config::AddressingMode;
use crate::extractor::PageSnapshot;

const PATH_INSTRUCTIONS: &str = r#"Instructions:
- Analyze the page structure and the user's command.
- Identify the sequence of actions needed to fulfill the user's intent, considering the hierarchical structure of the page.
- For each action, provide the path to the target element (e.g., "body > div.container > button.submit"), the action to perform (e.g., "click", "input", "scroll"), and any necessary input text.
- Provide the answer as a JSON array of actions without any additional text:
[
  {"targetPath": "path1", "actionType": "actionType1", "textToInput": "textToInput1"},
  {"targetPath": "path2", "actionType": "actionType2", "textToInput": "textToInput2"},
  ...
]"#;

const INDEX_INSTRUCTIONS: &str = r#"Instructions:
- Analyze the interactive elements and the user's command.
- Identify the sequence of actions needed to fulfill the user's intent.
- For each action, provide the index of the target element from the list above, the action to perform (e.g., "click", "input", "scroll"), and any necessary input text.
- Provide the answer as a JSON array of actions without any additional text:
[
  {"targetIndex": 0, "actionType": "actionType1", "textToInput": "textToInput1"},
  {"targetIndex": 1, "actionType": "actionType2", "textToInput": "textToInput2"},
  ...
]"#;

/// Serialize the snapshot in the form the addressing mode calls for and wrap
/// it with the verbatim user command and the fixed instruction block.
pub fn build_prompt(command: &str, snapshot: &PageSnapshot, mode: AddressingMode) -> String {
    match mode {
        AddressingMode::Path => {
            let structure = serde_json::to_string_pretty(&snapshot.structure).unwrap_or_default();
            format!(
                "User Command: \"{command}\"\n\nPage Structure:\n{structure}\n\n{PATH_INSTRUCTIONS}\n"
            )
        }
        AddressingMode::Index => {
            let elements = serde_json::to_string_pretty(&snapshot.elements).unwrap_or_default();
            format!(
                "User Command: \"{command}\"\n\nInteractive Elements:\n{elements}\n\n{INDEX_INSTRUCTIONS}\n"
            )
        }
    }
}
