//! Wire types for the agent endpoint

use crate::conversation::{ConversationEntry, Origin};
use serde::{Deserialize, Serialize};

/// Speaker label used in the request history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

impl From<Origin> for Role {
    fn from(origin: Origin) -> Self {
        match origin {
            Origin::User => Role::User,
            Origin::Agent => Role::Agent,
        }
    }
}

/// One prior turn of the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: Role,
    pub content: String,
}

impl From<&ConversationEntry> for HistoryTurn {
    fn from(entry: &ConversationEntry) -> Self {
        Self {
            role: entry.origin.into(),
            content: entry.payload.history_content(),
        }
    }
}

/// Request body: the new message plus everything said before it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRequest {
    pub message: String,
    pub history: Vec<HistoryTurn>,
}

impl AgentRequest {
    pub fn new(message: impl Into<String>, history: Vec<HistoryTurn>) -> Self {
        Self {
            message: message.into(),
            history,
        }
    }
}

/// Map stored entries, in order, to request history
pub fn build_history(entries: &[ConversationEntry]) -> Vec<HistoryTurn> {
    entries.iter().map(HistoryTurn::from).collect()
}

/// Undecoded response body from a successful exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReply(String);

impl RawReply {
    pub fn new(body: impl Into<String>) -> Self {
        Self(body.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
