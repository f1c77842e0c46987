//! Completion client.
//!
//! One request per invocation, no retry, no backoff, no timeout. The
//! orchestrator treats any error here as "no completion": failures are
//! logged at its boundary and never propagate past it.

use async_trait::async_trait;

use crate::config::{AddressingMode, LlmConfig};
use crate::errors::{VoiceNavError, VoiceNavResult};
use crate::llm::types::{ChatRequest, ChatResponse};

/// Seam between the pipeline and the completion endpoint; sessions are
/// exercised in tests with a scripted implementation.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> VoiceNavResult<String>;
}

#[derive(Debug)]
pub struct OpenAiClient {
    api_base: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Fails fast when no credential is resolvable; no request is ever
    /// attempted without one.
    pub fn from_config(cfg: &LlmConfig, mode: AddressingMode) -> VoiceNavResult<Self> {
        let api_key = cfg.resolve_api_key().ok_or(VoiceNavError::ApiKeyMissing)?;
        Ok(Self {
            api_base: cfg.api_base.clone(),
            api_key,
            model: cfg.model.clone(),
            max_tokens: cfg.max_tokens_for(mode),
            temperature: cfg.temperature,
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    async fn complete(&self, prompt: &str) -> VoiceNavResult<String> {
        let body = ChatRequest::user(&self.model, prompt, self.max_tokens, self.temperature);

        tracing::debug!(
            model = %self.model,
            max_tokens = self.max_tokens,
            prompt_len = prompt.len(),
            "sending completion request"
        );

        let response = self
            .client
            .post(&self.api_base)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let err_body = response.text().await.unwrap_or_default();
            return Err(VoiceNavError::Llm(format!("{}: {}", status, err_body)));
        }

        let json: ChatResponse = response.json().await?;
        let content = json
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .ok_or_else(|| VoiceNavError::Llm("response has no completion content".into()))?;

        Ok(content.trim().to_string())
    }
}
