//! Showtime chat - floating chat widget talking to a showtime agent
//!
//! A pure state machine decides what each intent does; a runtime actor
//! executes its effects against the agent endpoint and publishes
//! snapshots for presenters.

pub mod agent;
pub mod config;
pub mod conversation;
pub mod presenter;
pub mod reply;
pub mod runtime;
pub mod state_machine;

pub use runtime::{ControllerError, WidgetEvent, WidgetHandle, WidgetSnapshot};
