//! Timeline entry types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a timeline entry.
///
/// UUIDv7 values sort by creation time and stay distinct for entries
/// created within the same millisecond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Who authored an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    User,
    Agent,
}

/// Entry content - exactly one shape per entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payload {
    /// Free text bubble
    Text { text: String },
    /// Card reply: one card per showtime
    ShowtimeList { showtimes: Vec<String> },
}

impl Payload {
    pub fn text(text: impl Into<String>) -> Self {
        Payload::Text { text: text.into() }
    }

    pub fn showtimes(showtimes: Vec<String>) -> Self {
        Payload::ShowtimeList { showtimes }
    }

    pub fn is_card(&self) -> bool {
        matches!(self, Payload::ShowtimeList { .. })
    }

    /// Flattened text used when the entry is replayed to the agent as history.
    ///
    /// Card replies are joined back into the comma separated form the agent
    /// produced them from.
    pub fn history_content(&self) -> String {
        match self {
            Payload::Text { text } => text.clone(),
            Payload::ShowtimeList { showtimes } => showtimes.join(", "),
        }
    }
}

/// One item of the conversation timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub id: EntryId,
    pub origin: Origin,
    pub created_at: DateTime<Utc>,
    pub payload: Payload,
}

impl ConversationEntry {
    pub fn new(origin: Origin, payload: Payload) -> Self {
        Self {
            id: EntryId::generate(),
            origin,
            created_at: Utc::now(),
            payload,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Origin::User, Payload::text(text))
    }

    pub fn agent(payload: Payload) -> Self {
        Self::new(Origin::Agent, payload)
    }
}
