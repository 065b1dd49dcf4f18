//! Effects produced by state transitions

use crate::agent::AgentRequest;
use crate::conversation::{Origin, Payload};
use crate::state_machine::state::ERROR_REPLY;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append a new entry to the timeline
    AppendEntry { origin: Origin, payload: Payload },

    /// Send one request to the agent (spawns as background task)
    RequestAgent {
        generation: u64,
        request: AgentRequest,
    },
}

impl Effect {
    pub fn append_user(text: impl Into<String>) -> Self {
        Effect::AppendEntry {
            origin: Origin::User,
            payload: Payload::text(text),
        }
    }

    pub fn append_agent(payload: Payload) -> Self {
        Effect::AppendEntry {
            origin: Origin::Agent,
            payload,
        }
    }

    pub fn append_error_reply() -> Self {
        Self::append_agent(Payload::text(ERROR_REPLY))
    }
}
