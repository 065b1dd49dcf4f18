//! Pure state transition function
//!
//! Given the same state, timeline and event, `transition` always produces
//! the same result and performs no I/O. Entry creation and the network call
//! are returned as effects for the runtime to execute.

use super::state::{ConvState, ErrorKind, LastError, PanelState, WidgetContext, WidgetState};
use super::{Effect, Event, Key};
use crate::agent::{build_history, AgentRequest};
use crate::conversation::{ConversationEntry, Payload};
use crate::reply;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: WidgetState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: WidgetState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Reasons an event is rejected without changing anything
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("A request is already in flight")]
    RequestInFlight,
    #[error("Input is locked while a request is in flight")]
    InputLocked,
    #[error("Ignoring response for stale request {generation}")]
    StaleResponse { generation: u64 },
}

/// Pure transition function
pub fn transition(
    state: &WidgetState,
    context: &WidgetContext,
    entries: &[ConversationEntry],
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match event {
        // ============================================================
        // Panel
        // ============================================================
        Event::Open => Ok(open(state, context, entries)),
        Event::Close => Ok(close(state)),
        Event::Toggle => {
            if state.is_open() {
                Ok(close(state))
            } else {
                Ok(open(state, context, entries))
            }
        }

        // ============================================================
        // Input
        // ============================================================
        Event::UpdateDraft { text } => {
            if state.is_pending() {
                return Err(TransitionError::InputLocked);
            }
            Ok(TransitionResult::new(WidgetState {
                draft: text,
                ..state.clone()
            }))
        }

        Event::Submit => send(state, entries, state.draft.clone()),
        Event::Send { text } => send(state, entries, text),

        // Shift+Enter is reserved for multi-line input
        Event::Key {
            key: Key::Enter,
            modifiers,
        } if !modifiers.shift => send(state, entries, state.draft.clone()),
        Event::Key {
            key: Key::Escape, ..
        } => Ok(close(state)),
        Event::Key { .. } => Ok(TransitionResult::new(state.clone())),

        Event::DismissError => Ok(TransitionResult::new(WidgetState {
            last_error: None,
            ..state.clone()
        })),

        // ============================================================
        // Agent responses
        // ============================================================
        Event::AgentReplied { generation, reply } => {
            ensure_current(state, generation)?;
            match reply::parse(reply.as_str()) {
                Ok(showtimes) => Ok(TransitionResult::new(WidgetState {
                    conv: ConvState::Idle,
                    ..state.clone()
                })
                .with_effect(Effect::append_agent(Payload::showtimes(showtimes)))),
                Err(e) => Ok(fail(state, ErrorKind::MalformedReply, e.to_string())),
            }
        }

        Event::AgentFailed { generation, error } => {
            ensure_current(state, generation)?;
            Ok(fail(state, ErrorKind::Transport, error.to_string()))
        }
    }
}

/// Show the panel, greeting on first open
fn open(
    state: &WidgetState,
    context: &WidgetContext,
    entries: &[ConversationEntry],
) -> TransitionResult {
    let result = TransitionResult::new(WidgetState {
        panel: PanelState::Open,
        ..state.clone()
    });
    if entries.is_empty() && !state.is_pending() {
        result.with_effect(Effect::append_agent(Payload::text(&context.greeting)))
    } else {
        result
    }
}

/// Hide the panel; the conversation is untouched
fn close(state: &WidgetState) -> TransitionResult {
    TransitionResult::new(WidgetState {
        panel: PanelState::Closed,
        ..state.clone()
    })
}

fn send(
    state: &WidgetState,
    entries: &[ConversationEntry],
    text: String,
) -> Result<TransitionResult, TransitionError> {
    if text.trim().is_empty() {
        return Err(TransitionError::EmptyMessage);
    }
    if state.is_pending() {
        return Err(TransitionError::RequestInFlight);
    }

    let generation = state.generation + 1;
    // History is everything before the message being sent
    let request = AgentRequest::new(text.clone(), build_history(entries));

    Ok(TransitionResult::new(WidgetState {
        conv: ConvState::Sending { generation },
        draft: String::new(),
        last_error: None,
        generation,
        ..state.clone()
    })
    .with_effect(Effect::append_user(text))
    .with_effect(Effect::RequestAgent {
        generation,
        request,
    }))
}

fn ensure_current(state: &WidgetState, generation: u64) -> Result<(), TransitionError> {
    match state.conv {
        ConvState::Sending { generation: current } if current == generation => Ok(()),
        _ => Err(TransitionError::StaleResponse { generation }),
    }
}

/// Fold a failed exchange back into the timeline
fn fail(state: &WidgetState, kind: ErrorKind, detail: String) -> TransitionResult {
    TransitionResult::new(WidgetState {
        conv: ConvState::Idle,
        last_error: Some(LastError::new(kind, detail)),
        ..state.clone()
    })
    .with_effect(Effect::append_error_reply())
}
