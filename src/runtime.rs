//! Runtime for executing the widget
//!
//! One actor task owns the widget state and the message store and handles
//! events strictly in arrival order. Presenters talk to it through a
//! [`WidgetHandle`].

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::ConversationRuntime;

use crate::agent::AgentClient;
use crate::config::WidgetConfig;
use crate::conversation::{ConversationEntry, MessageStore};
use crate::state_machine::{
    Event, Key, LastError, Modifiers, PanelState, TransitionError, WidgetContext, WidgetState,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::{CancellationToken, DropGuard};

/// Change notifications sent to presenters
#[derive(Debug, Clone)]
pub enum WidgetEvent {
    /// A new entry is at the end of the timeline; re-render and scroll to it
    EntryAppended { entry: ConversationEntry },
    /// Any part of the widget state changed
    StateChanged { state: WidgetState },
    /// The in-flight request resolved, successfully or not
    ExchangeSettled { generation: u64, failed: bool },
    /// An intent was dropped without effect
    Rejected { reason: TransitionError },
}

/// Everything a presenter needs to render the widget
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct WidgetSnapshot {
    pub entries: Vec<ConversationEntry>,
    pub pending: bool,
    pub panel: PanelState,
    pub draft: String,
    pub last_error: Option<LastError>,
}

impl WidgetSnapshot {
    pub fn capture(state: &WidgetState, store: &MessageStore) -> Self {
        Self {
            entries: store.snapshot().to_vec(),
            pending: state.is_pending(),
            panel: state.panel,
            draft: state.draft.clone(),
            last_error: state.last_error.clone(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.panel == PanelState::Open
    }
}

/// Errors returned to presenters
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Widget runtime has shut down")]
    Closed,
}

/// Handle to interact with a running widget.
///
/// Dropping the last clone tears the runtime down.
#[derive(Clone)]
pub struct WidgetHandle {
    event_tx: mpsc::Sender<Event>,
    snapshot_rx: watch::Receiver<WidgetSnapshot>,
    notify_tx: broadcast::Sender<WidgetEvent>,
    shutdown: CancellationToken,
    _guard: Arc<DropGuard>,
}

impl WidgetHandle {
    /// Start a widget runtime in the background
    pub fn spawn<C: AgentClient + 'static>(client: C, config: &WidgetConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel(config.event_capacity);
        let (notify_tx, _) = broadcast::channel(config.notify_capacity);
        let (snapshot_tx, snapshot_rx) = watch::channel(WidgetSnapshot::default());
        let shutdown = CancellationToken::new();

        let runtime = ConversationRuntime::new(
            WidgetContext::new(&config.greeting),
            client,
            event_rx,
            event_tx.clone(),
            snapshot_tx,
            notify_tx.clone(),
            shutdown.clone(),
        );

        tokio::spawn(async move {
            runtime.run().await;
        });

        Self {
            event_tx,
            snapshot_rx,
            notify_tx,
            _guard: Arc::new(shutdown.clone().drop_guard()),
            shutdown,
        }
    }

    async fn dispatch(&self, event: Event) -> Result<(), ControllerError> {
        if self.shutdown.is_cancelled() {
            return Err(ControllerError::Closed);
        }
        self.event_tx
            .send(event)
            .await
            .map_err(|_| ControllerError::Closed)
    }

    pub async fn open_widget(&self) -> Result<(), ControllerError> {
        self.dispatch(Event::Open).await
    }

    pub async fn close_widget(&self) -> Result<(), ControllerError> {
        self.dispatch(Event::Close).await
    }

    pub async fn toggle_widget(&self) -> Result<(), ControllerError> {
        self.dispatch(Event::Toggle).await
    }

    pub async fn update_draft(&self, text: impl Into<String>) -> Result<(), ControllerError> {
        self.dispatch(Event::UpdateDraft { text: text.into() }).await
    }

    /// Send the current draft
    pub async fn submit(&self) -> Result<(), ControllerError> {
        self.dispatch(Event::Submit).await
    }

    /// Send explicit text; the draft is cleared if the send is accepted
    pub async fn send(&self, text: impl Into<String>) -> Result<(), ControllerError> {
        self.dispatch(Event::Send { text: text.into() }).await
    }

    pub async fn key_intent(&self, key: Key, modifiers: Modifiers) -> Result<(), ControllerError> {
        self.dispatch(Event::Key { key, modifiers }).await
    }

    pub async fn dismiss_error(&self) -> Result<(), ControllerError> {
        self.dispatch(Event::DismissError).await
    }

    /// Latest published state
    pub fn snapshot(&self) -> WidgetSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver that is marked changed on every published snapshot
    pub fn watch(&self) -> watch::Receiver<WidgetSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Subscribe to change notifications; drop the receiver to unsubscribe
    pub fn subscribe(&self) -> broadcast::Receiver<WidgetEvent> {
        self.notify_tx.subscribe()
    }

    /// Stop the runtime; an in-flight response is discarded
    pub fn teardown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}
