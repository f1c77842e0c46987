use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{VoiceNavError, VoiceNavResult};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Completion budget. When absent, the addressing mode picks the default
    /// (150 for path prompts, 500 for index prompts).
    pub max_tokens: Option<u32>,
    /// Optional API key stored in config.toml (falls back to env var OPENAI_API_KEY).
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: None,
            api_key: None,
        }
    }
}

impl LlmConfig {
    /// Config key first, then the OPENAI_API_KEY environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()))
    }

    pub fn max_tokens_for(&self, mode: AddressingMode) -> u32 {
        self.max_tokens.unwrap_or(match mode {
            AddressingMode::Path => 150,
            AddressingMode::Index => 500,
        })
    }
}

fn default_api_base() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

/// How the model addresses elements. Selected once per deployment so the
/// prompt contract and the parser always agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AddressingMode {
    /// Structural selector paths resolved against the live document.
    Path,
    /// Integer indices into the most recent element inventory.
    #[default]
    Index,
}

/// Whether a target that fails to resolve aborts the rest of the sequence
/// or is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResolveFailurePolicy {
    #[default]
    Skip,
    Abort,
}

/// What to do when an action list outlives the inventory snapshot that
/// produced its prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StaleSnapshotPolicy {
    /// Re-extract and resolve against the fresh inventory.
    #[default]
    Refresh,
    /// Skip the action with a warning.
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub addressing: AddressingMode,
    #[serde(default = "default_max_actions")]
    pub max_actions: usize,
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    #[serde(default)]
    pub on_resolve_failure: ResolveFailurePolicy,
    #[serde(default)]
    pub on_stale_snapshot: StaleSnapshotPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            addressing: AddressingMode::default(),
            max_actions: default_max_actions(),
            settle_ms: default_settle_ms(),
            on_resolve_failure: ResolveFailurePolicy::default(),
            on_stale_snapshot: StaleSnapshotPolicy::default(),
        }
    }
}

fn default_max_actions() -> usize {
    10
}

fn default_settle_ms() -> u64 {
    crate::executor::SETTLE_DELAY_MS
}

fn resolve_config_path() -> VoiceNavResult<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join("config.toml");
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "config found next to executable");
                return Ok(candidate);
            }
        }
    }

    let cwd = std::env::current_dir()?;
    let candidate = cwd.join("config.toml");
    if candidate.exists() {
        tracing::debug!(path = %candidate.display(), "config found in working directory");
        return Ok(candidate);
    }

    Err(VoiceNavError::Config(
        "config.toml not found next to executable or in working directory".into(),
    ))
}

pub fn load_config() -> VoiceNavResult<AppConfig> {
    let path = resolve_config_path()?;
    let content = std::fs::read_to_string(&path)?;
    let config: AppConfig = toml::from_str(&content)?;
    tracing::info!(
        path = %path.display(),
        model = %config.llm.model,
        addressing = ?config.pipeline.addressing,
        "config loaded"
    );
    Ok(config)
}
