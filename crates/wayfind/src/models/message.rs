use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn's worth of text in the conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub created: i64,
    pub content: String,
}

impl ChatMessage {
    /// Create a new user message with the current timestamp
    pub fn user<S: Into<String>>(content: S) -> Self {
        ChatMessage {
            role: Role::User,
            created: Utc::now().timestamp(),
            content: content.into(),
        }
    }

    /// Create a new assistant message with the current timestamp
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        ChatMessage {
            role: Role::Assistant,
            created: Utc::now().timestamp(),
            content: content.into(),
        }
    }
}

/// Session-scoped conversation state.
///
/// History is append-only within a session and never mutated retroactively;
/// the orchestrator is the only writer (user message first, then the
/// assistant message when one was produced). An explicit reset starts a
/// fresh conversation.
#[derive(Debug, Default)]
pub struct SessionState {
    messages: Vec<ChatMessage>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn reset(&mut self) {
        self.messages.clear();
    }

    pub(crate) fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }
}
