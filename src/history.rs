use std::io::Write;

use serde::Serialize;

use crate::errors::VoiceNavResult;

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub ts: i64,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<serde_json::Value>,
}

impl HistoryEntry {
    pub fn transcript(text: &str) -> Self {
        Self {
            ts: chrono::Utc::now().timestamp_millis(),
            kind: "transcript".into(),
            content: Some(text.to_string()),
            outcome: None,
        }
    }

    pub fn action(outcome: &impl Serialize) -> Self {
        Self {
            ts: chrono::Utc::now().timestamp_millis(),
            kind: "action".into(),
            content: None,
            outcome: serde_json::to_value(outcome).ok(),
        }
    }
}

/// Append-only JSONL log of one listening session.
pub struct SessionHistory {
    pub session_id: String,
    entries: Vec<HistoryEntry>,
    file_path: std::path::PathBuf,
}

impl SessionHistory {
    pub fn new() -> Self {
        let session_id = uuid::Uuid::new_v4().to_string();
        let dir = sessions_dir_or_cwd();
        let file_path = dir.join(format!("session_{session_id}.jsonl"));
        Self {
            session_id,
            entries: Vec::new(),
            file_path,
        }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    /// Append the latest entry to the JSONL file.
    pub fn flush(&self) -> VoiceNavResult<()> {
        if let Some(last) = self.entries.last() {
            let line = serde_json::to_string(last)?;
            let mut file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.file_path)?;
            writeln!(file, "{}", line)?;
            tracing::debug!(
                path = %self.file_path.display(),
                "history entry flushed"
            );
        }
        Ok(())
    }
}

impl Default for SessionHistory {
    fn default() -> Self {
        Self::new()
    }
}

fn sessions_dir_or_cwd() -> std::path::PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        let d = data_dir.join("voicenav").join("sessions");
        let _ = std::fs::create_dir_all(&d);
        return d;
    }
    std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."))
}
