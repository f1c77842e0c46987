use thiserror::Error;

#[derive(Debug, Error)]
pub enum VoiceNavError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("OpenAI API key is not set")]
    ApiKeyMissing,

    #[error("LLM request error: {0}")]
    Llm(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

pub type VoiceNavResult<T> = Result<T, VoiceNavError>;
