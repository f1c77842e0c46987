//! Command orchestration.
//!
//! A `Session` is the explicit context object for one deployment of the
//! pipeline: it owns the live document, the latest inventory snapshot, the
//! resolution strategy and the backend handle. Created on start, the
//! snapshot is invalidated on stop and replaced on every extraction pass.

pub mod control;
pub mod speech;

use std::sync::Arc;

use serde::Serialize;

use crate::actions::{ActionOutcome, ActionStatus};
use crate::config::{AppConfig, ResolveFailurePolicy};
use crate::dom::Document;
use crate::errors::VoiceNavError;
use crate::executor::ActionExecutor;
use crate::extractor::{extract, PageSnapshot};
use crate::history::{HistoryEntry, SessionHistory};
use crate::llm::CompletionBackend;
use crate::parser::parse_actions;
use crate::prompt::build_prompt;
use crate::resolver::{resolver_for, TargetResolver};

pub use control::ControlMessage;
pub use speech::{SpeechEvent, StdinTranscripts, TranscriptSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Listening,
}

/// User-visible notices (the original surfaced these as alert dialogs).
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Default notifier: notices go to the log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        tracing::warn!(message = %message, "user notice");
    }
}

pub struct Session {
    state: SessionState,
    doc: Document,
    snapshot: Option<PageSnapshot>,
    backend: Arc<dyn CompletionBackend>,
    resolver: Box<dyn TargetResolver>,
    executor: ActionExecutor,
    config: AppConfig,
    notifier: Box<dyn Notifier>,
    history: Option<SessionHistory>,
}

impl Session {
    pub fn new(config: AppConfig, doc: Document, backend: Arc<dyn CompletionBackend>) -> Self {
        let resolver = resolver_for(config.pipeline.addressing, config.pipeline.on_stale_snapshot);
        let executor = ActionExecutor::new(config.pipeline.settle_ms);
        Self {
            state: SessionState::Idle,
            doc,
            snapshot: None,
            backend,
            resolver,
            executor,
            config,
            notifier: Box::new(LogNotifier),
            history: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_history(mut self, history: SessionHistory) -> Self {
        self.history = Some(history);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == SessionState::Listening
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Host-side mutations go through here; structural ones invalidate the
    /// current snapshot via the document's revision counter.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn handle_control(&mut self, msg: ControlMessage) {
        match msg {
            ControlMessage::StartListening => self.start_listening(),
            ControlMessage::StopListening => self.stop_listening(),
        }
    }

    /// Idle → Listening; runs an initial extraction pass.
    pub fn start_listening(&mut self) {
        if self.is_listening() {
            return;
        }
        self.state = SessionState::Listening;
        self.snapshot = Some(extract(&self.doc, self.config.pipeline.addressing));
        tracing::info!("listening started");
    }

    /// Listening → Idle; the snapshot does not outlive the session.
    pub fn stop_listening(&mut self) {
        if !self.is_listening() {
            return;
        }
        self.state = SessionState::Idle;
        self.snapshot = None;
        tracing::info!("listening stopped");
    }

    /// Pull speech events until the source ends. Transcripts arriving while
    /// idle are dropped; engine errors are logged and the session keeps
    /// going; end-of-stream resumes the source when it can.
    pub async fn run(&mut self, source: &mut dyn TranscriptSource) {
        loop {
            match source.next_event().await {
                SpeechEvent::Transcript(transcript) => {
                    if self.is_listening() {
                        self.handle_transcript(&transcript).await;
                    } else {
                        tracing::debug!(transcript = %transcript, "transcript ignored while idle");
                    }
                }
                SpeechEvent::Control(msg) => self.handle_control(msg),
                SpeechEvent::Error(e) => {
                    tracing::error!(error = %e, "speech recognition error");
                }
                SpeechEvent::End => {
                    if self.is_listening() && source.resume() {
                        continue;
                    }
                    break;
                }
            }
        }
        tracing::info!("session loop ended");
    }

    /// One full pipeline run for one finalized transcript. Runs even for
    /// empty or whitespace-only transcripts; the model gets to decide what
    /// they mean.
    pub async fn handle_transcript(&mut self, transcript: &str) -> Vec<ActionOutcome> {
        tracing::info!(transcript = %transcript, "handling command");
        self.push_history(HistoryEntry::transcript(transcript));

        let mode = self.config.pipeline.addressing;
        let mut snapshot = extract(&self.doc, mode);
        let prompt = build_prompt(transcript, &snapshot, mode);

        // Transport and credential failures end the pipeline here; only
        // output we actually received but could not use gets the
        // "not understood" notice.
        let response = match self.backend.complete(&prompt).await {
            Ok(response) => response,
            Err(VoiceNavError::ApiKeyMissing) => {
                self.notifier.notify("OpenAI API key is not set.");
                self.snapshot = Some(snapshot);
                return Vec::new();
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch LLM response");
                self.snapshot = Some(snapshot);
                return Vec::new();
            }
        };

        let actions = parse_actions(&response, mode, self.config.pipeline.max_actions)
            .unwrap_or_default();

        if actions.is_empty() {
            self.notifier
                .notify("Sorry, I could not understand your command.");
            self.snapshot = Some(snapshot);
            return Vec::new();
        }

        let mut outcomes = Vec::new();
        for action in actions {
            let node = self.resolver.resolve(&self.doc, &mut snapshot, &action.target);

            let status = match node {
                Some(node) => self.executor.perform(&mut self.doc, node, &action).await,
                None => ActionStatus::Skipped {
                    reason: "target did not resolve".into(),
                },
            };

            let unresolved = node.is_none();
            let outcome = ActionOutcome::now(action, status);
            self.push_history(HistoryEntry::action(&outcome));
            outcomes.push(outcome);

            if unresolved && self.config.pipeline.on_resolve_failure == ResolveFailurePolicy::Abort
            {
                tracing::warn!("target resolution failed, aborting remaining actions");
                break;
            }
        }
        self.snapshot = Some(snapshot);
        outcomes
    }

    fn push_history(&mut self, entry: HistoryEntry) {
        if let Some(history) = &mut self.history {
            history.push(entry);
            let _ = history.flush();
        }
    }
}
