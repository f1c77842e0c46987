//! voicenav: voice-driven page navigation.
//!
//! A finalized speech transcript is mapped onto live-document interactions:
//! extract the page's actionable elements, ask a chat-completion model for a
//! JSON action sequence, validate it, and execute it action by action.

pub mod actions;
pub mod config;
pub mod dom;
pub mod errors;
pub mod executor;
pub mod extractor;
pub mod history;
pub mod llm;
pub mod parser;
pub mod prompt;
pub mod resolver;
pub mod session;

pub use config::AppConfig;
pub use dom::Document;
pub use errors::{VoiceNavError, VoiceNavResult};
pub use session::Session;
