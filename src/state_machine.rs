//! Core widget state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;


pub use effect::Effect;
pub use event::{Event, Key, Modifiers};
pub use state::{
    ConvState, ErrorKind, LastError, PanelState, WidgetContext, WidgetState, ERROR_BANNER,
    ERROR_REPLY,
};
pub use transition::{transition, TransitionError, TransitionResult};
