//! Widget runtime executor

use super::{WidgetEvent, WidgetSnapshot};
use crate::agent::{AgentClient, AgentRequest};
use crate::conversation::{ConversationEntry, MessageStore};
use crate::state_machine::{transition, ConvState, Effect, Event, WidgetContext, WidgetState};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;

/// Widget runtime that can work with any agent client implementation
pub struct ConversationRuntime<C>
where
    C: AgentClient + 'static,
{
    context: WidgetContext,
    state: WidgetState,
    store: MessageStore,
    client: Arc<C>,
    event_rx: mpsc::Receiver<Event>,
    /// Cloned into request tasks so responses come back as events
    event_tx: mpsc::Sender<Event>,
    snapshot_tx: watch::Sender<WidgetSnapshot>,
    notify_tx: broadcast::Sender<WidgetEvent>,
    /// Cancelled on teardown; stops the loop and abandons in-flight requests
    shutdown: CancellationToken,
}

impl<C> ConversationRuntime<C>
where
    C: AgentClient + 'static,
{
    pub fn new(
        context: WidgetContext,
        client: C,
        event_rx: mpsc::Receiver<Event>,
        event_tx: mpsc::Sender<Event>,
        snapshot_tx: watch::Sender<WidgetSnapshot>,
        notify_tx: broadcast::Sender<WidgetEvent>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            context,
            state: WidgetState::default(),
            store: MessageStore::new(),
            client: Arc::new(client),
            event_rx,
            event_tx,
            snapshot_tx,
            notify_tx,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(endpoint = %self.client.endpoint(), "Starting widget runtime");

        loop {
            tokio::select! {
                biased;

                () = self.shutdown.cancelled() => break,

                event = self.event_rx.recv() => match event {
                    Some(event) => self.process_event(event),
                    None => break,
                },
            }
        }

        tracing::info!(
            entries = self.store.len(),
            pending = self.state.is_pending(),
            "Widget runtime stopped"
        );
    }

    fn process_event(&mut self, event: Event) {
        let event_name = event.name();

        let result = match transition(&self.state, &self.context, self.store.snapshot(), event) {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(event = event_name, reason = %e, "Event rejected");
                let _ = self.notify_tx.send(WidgetEvent::Rejected { reason: e });
                return;
            }
        };

        let old_state = std::mem::replace(&mut self.state, result.new_state);

        let mut notifications = Vec::new();
        for effect in result.effects {
            if let Some(notification) = self.execute_effect(effect) {
                notifications.push(notification);
            }
        }

        if old_state != self.state {
            notifications.push(WidgetEvent::StateChanged {
                state: self.state.clone(),
            });
        }

        if let (ConvState::Sending { generation }, ConvState::Idle) = (old_state.conv, self.state.conv)
        {
            let failed = self.state.last_error.is_some();
            if let Some(error) = &self.state.last_error {
                tracing::warn!(
                    generation,
                    kind = ?error.kind,
                    detail = %error.detail,
                    "Exchange failed"
                );
            } else {
                tracing::info!(generation, "Exchange completed");
            }
            notifications.push(WidgetEvent::ExchangeSettled { generation, failed });
        }

        // Publish the snapshot first so notified presenters read fresh state
        self.snapshot_tx
            .send_replace(WidgetSnapshot::capture(&self.state, &self.store));
        for notification in notifications {
            let _ = self.notify_tx.send(notification);
        }
    }

    /// Execute an effect and optionally return a notification for presenters
    fn execute_effect(&mut self, effect: Effect) -> Option<WidgetEvent> {
        match effect {
            Effect::AppendEntry { origin, payload } => {
                let entry = self.store.append(ConversationEntry::new(origin, payload));
                tracing::debug!(
                    entry_id = %entry.id,
                    origin = ?entry.origin,
                    card = entry.payload.is_card(),
                    "Appended entry"
                );
                Some(WidgetEvent::EntryAppended {
                    entry: entry.clone(),
                })
            }

            Effect::RequestAgent {
                generation,
                request,
            } => {
                self.spawn_request(generation, request);
                None
            }
        }
    }

    /// Run the agent call in the background; its outcome returns as an event
    fn spawn_request(&self, generation: u64, request: AgentRequest) {
        let client = self.client.clone();
        let event_tx = self.event_tx.clone();
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            tracing::info!(
                generation,
                history_len = request.history.len(),
                "Making agent request (background)"
            );

            // Race the request against teardown
            let event = tokio::select! {
                biased;

                () = shutdown.cancelled() => {
                    tracing::debug!(generation, "Agent request abandoned at teardown");
                    return;
                }

                result = client.request(&request) => match result {
                    Ok(reply) => Event::AgentReplied { generation, reply },
                    Err(error) => Event::AgentFailed { generation, error },
                },
            };

            if event_tx.send(event).await.is_err() {
                tracing::debug!(generation, "Runtime gone, dropping agent response");
            }
        });
    }
}
