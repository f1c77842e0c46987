//! Inbound control protocol. Exactly two commands; anything else is
//! unrecognized and ignored.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "command")]
pub enum ControlMessage {
    #[serde(rename = "start-listening")]
    StartListening,
    #[serde(rename = "stop-listening")]
    StopListening,
}

impl ControlMessage {
    /// `None` for anything that is not a recognized control message.
    pub fn parse(json: &str) -> Option<Self> {
        serde_json::from_str(json).ok()
    }
}
