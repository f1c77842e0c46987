//! End-to-end pipeline tests over a scripted completion backend.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use voicenav::actions::{ActionKind, ActionStatus};
use voicenav::config::{AddressingMode, AppConfig, ResolveFailurePolicy};
use voicenav::dom::{Document, PageEvent};
use voicenav::errors::{VoiceNavError, VoiceNavResult};
use voicenav::llm::CompletionBackend;
use voicenav::session::{
    ControlMessage, Notifier, Session, SessionState, SpeechEvent, TranscriptSource,
};

// ── Test doubles ─────────────────────────────────────────────────────────

struct ScriptedBackend {
    responses: Mutex<VecDeque<VoiceNavResult<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    fn new<I: IntoIterator<Item = VoiceNavResult<String>>>(responses: I) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn replying(response: &str) -> Arc<Self> {
        Self::new([Ok(response.to_string())])
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, prompt: &str) -> VoiceNavResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(VoiceNavError::Llm("script exhausted".into())))
    }
}

#[derive(Clone, Default)]
struct RecordingNotifier(Arc<Mutex<Vec<String>>>);

impl RecordingNotifier {
    fn notices(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.0.lock().unwrap().push(message.to_string());
    }
}

struct ScriptedSource(VecDeque<SpeechEvent>);

#[async_trait]
impl TranscriptSource for ScriptedSource {
    async fn next_event(&mut self) -> SpeechEvent {
        self.0.pop_front().unwrap_or(SpeechEvent::End)
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────

/// body > form#search > [input[name=q], button "Search"], plus a nav link.
/// Index inventory: 0 = link, 1 = input, 2 = button.
fn search_page() -> Document {
    Document::from_json(
        r#"{
            "tag": "body",
            "children": [
                {"tag": "a", "attrs": {"href": "/about"}, "text": "About"},
                {
                    "tag": "form",
                    "attrs": {"id": "search"},
                    "children": [
                        {"tag": "input", "attrs": {"type": "text", "name": "q"}},
                        {"tag": "button", "attrs": {"class": "go"}, "text": "Search"}
                    ]
                }
            ]
        }"#,
    )
    .unwrap()
}

fn test_config(mode: AddressingMode) -> AppConfig {
    let mut config = AppConfig::default();
    config.pipeline.addressing = mode;
    config.pipeline.settle_ms = 0;
    config
}

fn session(mode: AddressingMode, backend: Arc<ScriptedBackend>) -> (Session, RecordingNotifier) {
    let notifier = RecordingNotifier::default();
    let session = Session::new(test_config(mode), search_page(), backend)
        .with_notifier(Box::new(notifier.clone()));
    (session, notifier)
}

fn node_tag(session: &Session, event: &PageEvent) -> String {
    let target = match event {
        PageEvent::Click { target, .. }
        | PageEvent::Input { target, .. }
        | PageEvent::ScrolledIntoView { target, .. }
        | PageEvent::Focused { target } => *target,
        PageEvent::FormSubmitted { form } => *form,
    };
    session.document().node(target).tag().to_string()
}

// ── Tests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn round_trip_input_fills_the_field() {
    let backend =
        ScriptedBackend::replying(r#"[{"targetIndex":1,"actionType":"input","textToInput":"hello"}]"#);
    let (mut session, _) = session(AddressingMode::Index, backend);
    session.start_listening();

    let outcomes = session.handle_transcript("type hello into the search box").await;
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status, ActionStatus::Performed);
    assert_eq!(outcomes[0].action.kind, ActionKind::Input);

    let events = session.document_mut().drain_events();
    let inputs: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, PageEvent::Input { .. }))
        .collect();
    assert_eq!(inputs.len(), 1, "exactly one input event fired");

    let field = events
        .iter()
        .find_map(|e| match e {
            PageEvent::Input { target, .. } => Some(*target),
            _ => None,
        })
        .unwrap();
    assert_eq!(session.document().node(field).value(), "hello");
}

#[tokio::test]
async fn actions_execute_strictly_in_returned_order() {
    let backend = ScriptedBackend::replying(
        r#"[{"targetIndex":2,"actionType":"click"},{"targetIndex":1,"actionType":"submit"}]"#,
    );
    let (mut session, _) = session(AddressingMode::Index, backend);
    session.start_listening();

    let outcomes = session.handle_transcript("search").await;
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.status == ActionStatus::Performed));

    // The click (scroll + settle + dispatch) finishes before the submit
    // starts; the event log is strictly ordered.
    let events = session.document_mut().drain_events();
    let shapes: Vec<(String, String)> = events
        .iter()
        .map(|e| {
            let kind = match e {
                PageEvent::ScrolledIntoView { .. } => "scroll",
                PageEvent::Click { .. } => "click",
                PageEvent::FormSubmitted { .. } => "submit",
                PageEvent::Input { .. } => "input",
                PageEvent::Focused { .. } => "focus",
            };
            (kind.to_string(), node_tag(&session, e))
        })
        .collect();
    assert_eq!(
        shapes,
        vec![
            ("scroll".to_string(), "button".to_string()),
            ("click".to_string(), "button".to_string()),
            ("submit".to_string(), "form".to_string()),
        ]
    );
}

#[tokio::test]
async fn path_mode_resolves_selector_targets() {
    let backend = ScriptedBackend::replying(
        r#"[{"targetPath":"body > form#search > button.go","actionType":"click"}]"#,
    );
    let (mut session, _) = session(AddressingMode::Path, backend);
    session.start_listening();

    let outcomes = session.handle_transcript("press search").await;
    assert_eq!(outcomes[0].status, ActionStatus::Performed);

    let events = session.document_mut().drain_events();
    assert!(matches!(events.last(), Some(PageEvent::Click { .. })));
    assert_eq!(node_tag(&session, events.last().unwrap()), "button");
}

#[tokio::test]
async fn malformed_output_notifies_not_understood() {
    let backend = ScriptedBackend::replying(r#"[{"targetIndex": 1, "actionType": "cl"#);
    let (mut session, notifier) = session(AddressingMode::Index, backend);
    session.start_listening();

    let outcomes = session.handle_transcript("do something").await;
    assert!(outcomes.is_empty());
    assert_eq!(
        notifier.notices(),
        vec!["Sorry, I could not understand your command.".to_string()]
    );
    assert!(session.document_mut().drain_events().is_empty());
}

#[tokio::test]
async fn transport_failure_is_silent_beyond_the_log() {
    let backend = ScriptedBackend::new([Err(VoiceNavError::Llm("connection refused".into()))]);
    let (mut session, notifier) = session(AddressingMode::Index, backend);
    session.start_listening();

    let outcomes = session.handle_transcript("do something").await;
    assert!(outcomes.is_empty());
    assert!(notifier.notices().is_empty(), "no user notice for transport failures");
}

#[tokio::test]
async fn unsupported_kind_is_skipped_not_fatal() {
    let backend = ScriptedBackend::replying(
        r#"[{"targetIndex":1,"actionType":"teleport"},{"targetIndex":2,"actionType":"click"}]"#,
    );
    let (mut session, _) = session(AddressingMode::Index, backend);
    session.start_listening();

    let outcomes = session.handle_transcript("teleport then click").await;
    assert_eq!(outcomes.len(), 2);
    assert_eq!(
        outcomes[0].status,
        ActionStatus::Skipped {
            reason: "unsupported action kind \"teleport\"".into()
        }
    );
    assert_eq!(outcomes[1].status, ActionStatus::Performed);
}

#[tokio::test]
async fn empty_transcript_still_runs_the_full_pipeline() {
    let backend = ScriptedBackend::replying("[]");
    let (mut session, notifier) = session(AddressingMode::Index, backend.clone());
    session.start_listening();

    let outcomes = session.handle_transcript("").await;
    assert!(outcomes.is_empty());

    let prompts = backend.prompts();
    assert_eq!(prompts.len(), 1, "the model is still consulted");
    assert!(prompts[0].contains("User Command: \"\""));
    assert_eq!(
        notifier.notices(),
        vec!["Sorry, I could not understand your command.".to_string()]
    );
}

#[tokio::test]
async fn resolve_failure_abort_policy_stops_the_sequence() {
    let backend = ScriptedBackend::replying(
        r#"[{"targetIndex":99,"actionType":"click"},{"targetIndex":2,"actionType":"click"}]"#,
    );
    let mut config = test_config(AddressingMode::Index);
    config.pipeline.on_resolve_failure = ResolveFailurePolicy::Abort;
    let mut session = Session::new(config, search_page(), backend);
    session.start_listening();

    let outcomes = session.handle_transcript("click things").await;
    assert_eq!(outcomes.len(), 1, "sequence aborted after the unresolvable target");
    assert!(matches!(outcomes[0].status, ActionStatus::Skipped { .. }));
    assert!(session.document_mut().drain_events().is_empty());
}

#[tokio::test]
async fn resolve_failure_default_policy_skips_and_continues() {
    let backend = ScriptedBackend::replying(
        r#"[{"targetIndex":99,"actionType":"click"},{"targetIndex":2,"actionType":"click"}]"#,
    );
    let (mut session, _) = session(AddressingMode::Index, backend);
    session.start_listening();

    let outcomes = session.handle_transcript("click things").await;
    assert_eq!(outcomes.len(), 2);
    assert!(matches!(outcomes[0].status, ActionStatus::Skipped { .. }));
    assert_eq!(outcomes[1].status, ActionStatus::Performed);
}

#[tokio::test]
async fn control_protocol_gates_transcripts() {
    let backend = ScriptedBackend::replying("[]");
    let (mut session, _) = session(AddressingMode::Index, backend.clone());
    assert_eq!(session.state(), SessionState::Idle);

    let mut source = ScriptedSource(VecDeque::from([
        SpeechEvent::Transcript("ignored while idle".into()),
        SpeechEvent::Control(ControlMessage::StartListening),
        SpeechEvent::Transcript("handled".into()),
        SpeechEvent::Control(ControlMessage::StopListening),
        SpeechEvent::Transcript("ignored again".into()),
        SpeechEvent::End,
    ]));
    session.run(&mut source).await;

    let prompts = backend.prompts();
    assert_eq!(prompts.len(), 1, "only the transcript received while listening runs");
    assert!(prompts[0].contains("User Command: \"handled\""));
    assert_eq!(session.state(), SessionState::Idle);
}

#[tokio::test]
async fn speech_errors_do_not_stop_the_session() {
    let backend = ScriptedBackend::replying("[]");
    let (mut session, _) = session(AddressingMode::Index, backend.clone());
    session.start_listening();

    let mut source = ScriptedSource(VecDeque::from([
        SpeechEvent::Error("no-speech".into()),
        SpeechEvent::Transcript("still here".into()),
        SpeechEvent::End,
    ]));
    session.run(&mut source).await;

    assert_eq!(backend.prompts().len(), 1);
}

#[tokio::test]
async fn page_mutations_between_commands_are_picked_up() {
    // Extraction is rebuilt wholesale before every command, so the snapshot
    // taken at start_listening never gets trusted across a mutation.
    let backend = ScriptedBackend::replying(r#"[{"targetIndex":2,"actionType":"click"}]"#);
    let (mut session, _) = session(AddressingMode::Index, backend);
    session.start_listening();
    let doc = session.document_mut();
    let banner = doc.create_element("div");
    doc.set_text(banner, "cookie banner");
    let body = doc.body();
    doc.append_child(body, banner);

    let outcomes = session.handle_transcript("click search").await;
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status, ActionStatus::Performed);
}
