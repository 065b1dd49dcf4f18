//! Events that can occur in a widget

use crate::agent::{RawReply, TransportError};
use serde::{Deserialize, Serialize};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // Presenter intents
    Open,
    Close,
    Toggle,
    UpdateDraft {
        text: String,
    },
    /// Send the current draft
    Submit,
    /// Send explicit text
    Send {
        text: String,
    },
    Key {
        key: Key,
        modifiers: Modifiers,
    },
    DismissError,

    // Agent events
    AgentReplied {
        generation: u64,
        reply: RawReply,
    },
    AgentFailed {
        generation: u64,
        error: TransportError,
    },
}

impl Event {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Event::Open => "open",
            Event::Close => "close",
            Event::Toggle => "toggle",
            Event::UpdateDraft { .. } => "update_draft",
            Event::Submit => "submit",
            Event::Send { .. } => "send",
            Event::Key { .. } => "key",
            Event::DismissError => "dismiss_error",
            Event::AgentReplied { .. } => "agent_replied",
            Event::AgentFailed { .. } => "agent_failed",
        }
    }
}

/// Keys the widget reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Enter,
    Escape,
    /// Any other key; handled by the input field itself
    Other,
}

/// Modifier keys held with a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
        meta: false,
    };
}
