//! Conversation turns and the inbound chat request

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of a conversation; history is chronological and immutable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Chat history as carried on the wire: either structured turns or a
/// preformatted `Human:`/`Assistant:` transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatHistory {
    Turns(Vec<ConversationTurn>),
    Preformatted(String),
}

impl Default for ChatHistory {
    fn default() -> Self {
        Self::Turns(Vec::new())
    }
}

impl ChatHistory {
    /// True when there is no usable history
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Turns(turns) => turns.is_empty(),
            Self::Preformatted(text) => text.trim().is_empty(),
        }
    }

    /// Serialize history as alternating `Human:`/`Assistant:` lines,
    /// chronological. Preformatted history passes through trimmed.
    pub fn to_transcript(&self) -> String {
        match self {
            Self::Preformatted(text) => text.trim().to_string(),
            Self::Turns(turns) => turns
                .iter()
                .map(|turn| match turn.role {
                    Role::User => format!("Human: {}", turn.content),
                    Role::Assistant => format!("Assistant: {}", turn.content),
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Inbound chat request
///
/// Accepts either a `messages` array (last entry is the question, earlier
/// entries are the history) or an explicit `question`/`message` with an
/// optional `chatHistory` in either representation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub messages: Option<Vec<ConversationTurn>>,
    #[serde(default, rename = "chatHistory")]
    pub chat_history: Option<ChatHistory>,
}

impl ChatRequest {
    /// Resolve the request into `(question, history)`, rejecting blank
    /// questions before any pipeline work happens.
    pub fn into_parts(self) -> Result<(String, ChatHistory)> {
        if let Some(mut turns) = self.messages.filter(|m| !m.is_empty()) {
            if let Some(last) = turns.pop() {
                if last.content.trim().is_empty() {
                    return Err(Error::validation("no question provided"));
                }
                return Ok((last.content, ChatHistory::Turns(turns)));
            }
        }

        let question = self.question.or(self.message).unwrap_or_default();
        if question.trim().is_empty() {
            return Err(Error::validation(
                "no question provided; send { question } or { messages: [...] }",
            ));
        }
        Ok((question, self.chat_history.unwrap_or_default()))
    }
}
