//! Chat-completion wire format.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub n: u32,
    /// Always serialized, always null; part of the fixed request shape.
    pub stop: Option<String>,
    pub temperature: f64,
}

impl ChatRequest {
    /// Single user-role message carrying the whole prompt.
    pub fn user(model: &str, prompt: &str, max_tokens: u32, temperature: f64) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens,
            n: 1,
            stop: None,
            temperature,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_fixed_shape() {
        let request = ChatRequest::user("gpt-4o-mini", "do the thing", 150, 0.7);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "do the thing");
        assert_eq!(json["max_tokens"], 150);
        assert_eq!(json["n"], 1);
        assert!(json["stop"].is_null(), "stop must be present and null");
        assert_eq!(json["temperature"], 0.7);
    }

    #[test]
    fn response_reads_first_choice_content() {
        let json = serde_json::json!({
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "[]"},
                "finish_reason": "stop"
            }]
        });
        let response: ChatResponse = serde_json::from_value(json).unwrap();
        assert_eq!(response.choices[0].message.content.as_deref(), Some("[]"));
    }
}
