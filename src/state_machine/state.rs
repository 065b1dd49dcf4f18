//! Widget state types

use crate::config::DEFAULT_GREETING;
use serde::{Deserialize, Serialize};

/// Timeline text appended whenever an exchange fails
pub const ERROR_REPLY: &str = "Sorry, I encountered an error. Please try again.";

/// Out-of-band banner text for a failed exchange
pub const ERROR_BANNER: &str = "Failed to get response. Please try again.";

/// Request lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConvState {
    /// Ready for user input, no request outstanding
    #[default]
    Idle,

    /// One request in flight; only a response with this generation resolves it
    Sending { generation: u64 },
}

impl ConvState {
    pub fn is_pending(&self) -> bool {
        matches!(self, ConvState::Sending { .. })
    }
}

/// Whether the chat panel is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PanelState {
    #[default]
    Closed,
    Open,
}

/// Which step of the exchange failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transport,
    MalformedReply,
}

/// Error descriptor for banner display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastError {
    pub kind: ErrorKind,
    /// User-facing banner text
    pub message: String,
    /// Technical cause, for logs and tooltips
    pub detail: String,
}

impl LastError {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            message: ERROR_BANNER.to_string(),
            detail: detail.into(),
        }
    }
}

/// Everything about the widget except the timeline itself
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WidgetState {
    pub panel: PanelState,
    pub conv: ConvState,
    pub draft: String,
    pub last_error: Option<LastError>,
    /// Bumped on every dispatched send
    pub generation: u64,
}

impl WidgetState {
    pub fn is_pending(&self) -> bool {
        self.conv.is_pending()
    }

    pub fn is_open(&self) -> bool {
        self.panel == PanelState::Open
    }
}

/// Immutable configuration for a widget
#[derive(Debug, Clone)]
pub struct WidgetContext {
    pub greeting: String,
}

impl WidgetContext {
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            greeting: greeting.into(),
        }
    }
}

impl Default for WidgetContext {
    fn default() -> Self {
        Self::new(DEFAULT_GREETING)
    }
}
