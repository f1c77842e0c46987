use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};

use voicenav::config::{self, AddressingMode, AppConfig};
use voicenav::dom::Document;
use voicenav::errors::VoiceNavError;
use voicenav::history::SessionHistory;
use voicenav::llm::OpenAiClient;
use voicenav::session::{Session, StdinTranscripts};

/// Drives a page fixture by "voice": each stdin line is treated as one
/// finalized transcript; JSON control messages switch listening on and off.
#[derive(Parser)]
#[command(name = "voicenav", version, about)]
struct Cli {
    /// JSON page fixture describing the document to drive.
    #[arg(long)]
    page: PathBuf,

    /// Override the configured addressing mode.
    #[arg(long, value_enum)]
    addressing: Option<CliAddressing>,

    /// Skip the JSONL session history.
    #[arg(long)]
    no_history: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum CliAddressing {
    Path,
    Index,
}

impl From<CliAddressing> for AddressingMode {
    fn from(mode: CliAddressing) -> Self {
        match mode {
            CliAddressing::Path => AddressingMode::Path,
            CliAddressing::Index => AddressingMode::Index,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load .env file if present (ignore error if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = match config::load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "no usable config.toml, using defaults");
            AppConfig::default()
        }
    };
    if let Some(mode) = cli.addressing {
        config.pipeline.addressing = mode.into();
    }

    let page_json = std::fs::read_to_string(&cli.page)?;
    let doc = Document::from_json(&page_json)?;

    let client = match OpenAiClient::from_config(&config.llm, config.pipeline.addressing) {
        Ok(client) => client,
        Err(VoiceNavError::ApiKeyMissing) => {
            eprintln!("OpenAI API key is not set. Put it in config.toml or OPENAI_API_KEY.");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let mut session = Session::new(config, doc, Arc::new(client));
    if !cli.no_history {
        session = session.with_history(SessionHistory::new());
    }

    session.start_listening();
    let mut source = StdinTranscripts::new();
    session.run(&mut source).await;

    Ok(())
}
