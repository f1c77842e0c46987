//! Speech capture is a black box that produces finalized text transcripts.
//! The session only sees this event stream.

use async_trait::async_trait;

use crate::session::control::ControlMessage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    /// One finalized transcript.
    Transcript(String),
    /// A control message carried over the same channel.
    Control(ControlMessage),
    /// Engine error; logged, never ends the session by itself.
    Error(String),
    /// End of stream.
    End,
}

#[async_trait]
pub trait TranscriptSource: Send {
    async fn next_event(&mut self) -> SpeechEvent;

    /// Called when the stream ends while the session is still logically
    /// listening; returning true means the source restarted and the session
    /// keeps pulling (speech engines routinely end and get restarted).
    fn resume(&mut self) -> bool {
        false
    }
}

/// CLI stand-in for the speech engine: one event per stdin line. Lines that
/// parse as control messages are forwarded as such; everything else is a
/// transcript.
pub struct StdinTranscripts {
    lines: tokio::io::Lines<tokio::io::BufReader<tokio::io::Stdin>>,
}

impl StdinTranscripts {
    pub fn new() -> Self {
        use tokio::io::AsyncBufReadExt;
        Self {
            lines: tokio::io::BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for StdinTranscripts {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptSource for StdinTranscripts {
    async fn next_event(&mut self) -> SpeechEvent {
        match self.lines.next_line().await {
            Ok(Some(line)) => match ControlMessage::parse(&line) {
                Some(msg) => SpeechEvent::Control(msg),
                None => SpeechEvent::Transcript(line),
            },
            Ok(None) => SpeechEvent::End,
            Err(e) => SpeechEvent::Error(e.to_string()),
        }
    }
}
