//! Terminal rendering of the widget
//!
//! Text entries render as bubbles with a `HH:MM` stamp; showtime lists
//! render as one card per showtime.

use crate::conversation::{ConversationEntry, Origin, Payload};
use crate::runtime::{ControllerError, WidgetEvent, WidgetHandle, WidgetSnapshot};
use crate::state_machine::{Key, Modifiers, PanelState, TransitionError};
use chrono::Local;
use tokio::sync::broadcast::{self, error::RecvError};

const TYPING_INDICATOR: &str = "Agent is typing...";
const EMPTY_CARDS: &str = "(no showtimes found)";

/// Printed when input arrives while the agent is still answering
pub const WAITING_NOTICE: &str = "(waiting for the agent, try again in a moment)";

/// Render one entry as display lines
pub fn render_entry(entry: &ConversationEntry) -> Vec<String> {
    let speaker = match entry.origin {
        Origin::User => "You",
        Origin::Agent => "Agent",
    };

    match &entry.payload {
        Payload::Text { text } => {
            let stamp = entry.created_at.with_timezone(&Local).format("%H:%M");
            vec![format!("[{speaker} {stamp}] {text}")]
        }
        Payload::ShowtimeList { showtimes } if showtimes.is_empty() => {
            vec![format!("[{speaker}] {EMPTY_CARDS}")]
        }
        Payload::ShowtimeList { showtimes } => {
            let mut lines = Vec::with_capacity(showtimes.len() + 1);
            lines.push(format!("[{speaker}] {} showtime(s):", showtimes.len()));
            lines.extend(showtimes.iter().map(|s| format!("  | {s}")));
            lines
        }
    }
}

/// Render the whole panel; a closed panel renders as just the launcher
pub fn render_snapshot(snapshot: &WidgetSnapshot) -> String {
    if !snapshot.is_open() {
        return "[chat closed - type /open]".to_string();
    }

    let mut lines = vec!["=== Agent Assistant ===".to_string()];
    if let Some(error) = &snapshot.last_error {
        lines.push(format!("! {} (/dismiss)", error.message));
    }
    lines.extend(snapshot.entries.iter().flat_map(render_entry));
    if snapshot.pending {
        lines.push(TYPING_INDICATOR.to_string());
    }
    lines.join("\n")
}

/// Feedback line for a dropped intent, if the user should see one
pub fn rejection_notice(reason: &TransitionError) -> Option<&'static str> {
    match reason {
        TransitionError::RequestInFlight | TransitionError::InputLocked => Some(WAITING_NOTICE),
        TransitionError::EmptyMessage | TransitionError::StaleResponse { .. } => None,
    }
}

/// Multi-line drafts are built up one Shift+Enter line at a time
fn append_line(draft: &str, line: &str) -> String {
    if draft.is_empty() {
        line.to_string()
    } else {
        format!("{draft}\n{line}")
    }
}

/// One line of terminal input mapped to a widget intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open,
    Close,
    Toggle,
    Dismiss,
    Quit,
    /// Typed text followed by Enter
    Message(String),
    /// Text followed by Shift+Enter: stays in the draft
    Draft(String),
    Key(Key, Modifiers),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        match line.trim() {
            "/open" => Command::Open,
            "/close" => Command::Close,
            "/toggle" => Command::Toggle,
            "/dismiss" => Command::Dismiss,
            "/quit" | "/exit" => Command::Quit,
            "/esc" => Command::Key(Key::Escape, Modifiers::NONE),
            _ => match line.strip_suffix('\\') {
                // Trailing backslash stands in for Shift+Enter
                Some(draft) => Command::Draft(draft.to_string()),
                None => Command::Message(line.to_string()),
            },
        }
    }

    /// Forward the command to the widget; `Quit` is left to the caller
    pub async fn apply(self, widget: &WidgetHandle) -> Result<(), ControllerError> {
        match self {
            Command::Open => widget.open_widget().await,
            Command::Close => widget.close_widget().await,
            Command::Toggle => widget.toggle_widget().await,
            Command::Dismiss => widget.dismiss_error().await,
            Command::Quit => Ok(()),
            Command::Key(key, modifiers) => widget.key_intent(key, modifiers).await,
            Command::Draft(text) => {
                let draft = append_line(&widget.snapshot().draft, &text);
                widget.update_draft(draft).await
            }
            Command::Message(text) => {
                // Typed like a user would: fill the input, then press Enter
                let draft = append_line(&widget.snapshot().draft, &text);
                widget.update_draft(draft).await?;
                widget.key_intent(Key::Enter, Modifiers::NONE).await
            }
        }
    }
}

/// Turns widget notifications into terminal output
pub struct TerminalView {
    widget: WidgetHandle,
    events: broadcast::Receiver<WidgetEvent>,
    /// Panel state as last rendered
    panel: PanelState,
}

impl TerminalView {
    /// Subscribes immediately, so nothing published after this returns is missed
    pub fn attach(widget: WidgetHandle) -> Self {
        let events = widget.subscribe();
        let panel = widget.snapshot().panel;
        Self {
            widget,
            events,
            panel,
        }
    }

    /// Lines for the next notification that changes the screen.
    ///
    /// Returns `None` once the runtime is gone.
    pub async fn next_lines(&mut self) -> Option<Vec<String>> {
        loop {
            let event = match self.events.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Presenter fell behind, redrawing");
                    return Some(vec![render_snapshot(&self.widget.snapshot())]);
                }
                Err(RecvError::Closed) => return None,
            };

            let lines = self.lines_for(event);
            if !lines.is_empty() {
                return Some(lines);
            }
        }
    }

    fn lines_for(&mut self, event: WidgetEvent) -> Vec<String> {
        match event {
            // Appends while closed show up when the panel is redrawn on open
            WidgetEvent::EntryAppended { entry } if self.panel == PanelState::Open => {
                render_entry(&entry)
            }
            WidgetEvent::ExchangeSettled { failed: true, .. } if self.panel == PanelState::Open => {
                self.widget
                    .snapshot()
                    .last_error
                    .map(|error| vec![format!("! {} (/dismiss)", error.message)])
                    .unwrap_or_default()
            }
            WidgetEvent::EntryAppended { .. } | WidgetEvent::ExchangeSettled { .. } => vec![],
            WidgetEvent::StateChanged { state } => {
                if state.panel != self.panel {
                    self.panel = state.panel;
                    vec![render_snapshot(&self.widget.snapshot())]
                } else if state.is_open() && state.is_pending() {
                    vec![TYPING_INDICATOR.to_string()]
                } else {
                    vec![]
                }
            }
            WidgetEvent::Rejected { reason } => rejection_notice(&reason)
                .map(|notice| vec![notice.to_string()])
                .unwrap_or_default(),
        }
    }
}
