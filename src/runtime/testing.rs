//! Mock implementations for testing
//!
//! These mocks enable integration testing of the runtime without network I/O.

use super::{WidgetEvent, WidgetHandle};
use crate::agent::{AgentClient, AgentRequest, RawReply, TransportError};
use crate::config::WidgetConfig;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, Notify};

// ============================================================================
// Mock Agent Client
// ============================================================================

/// Mock agent client that returns queued responses
pub struct MockAgentClient {
    responses: Mutex<VecDeque<Result<RawReply, TransportError>>>,
    /// Record of all requests made
    pub requests: Mutex<Vec<AgentRequest>>,
}

impl MockAgentClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a raw response body
    pub fn queue_body(&self, body: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(RawReply::new(body)));
    }

    /// Queue a well-formed showtime reply
    pub fn queue_showtimes(&self, showtimes: &[&str]) {
        let inner = serde_json::json!({ "data": showtimes }).to_string();
        self.queue_body(serde_json::json!({ "reply": inner }).to_string());
    }

    /// Queue a transport failure
    pub fn queue_error(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<AgentRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_response(&self) -> Result<RawReply, TransportError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::other("No mock response queued")))
    }
}

impl Default for MockAgentClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentClient for MockAgentClient {
    async fn request(&self, request: &AgentRequest) -> Result<RawReply, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.next_response()
    }

    fn endpoint(&self) -> &str {
        "mock://agent"
    }
}

// ============================================================================
// Delayed Mock Agent Client (for single-flight and teardown testing)
// ============================================================================

/// Mock agent client with configurable delay
pub struct DelayedMockAgentClient {
    inner: MockAgentClient,
    delay: Duration,
    /// Notified when a request starts (for test synchronization)
    pub request_started: Arc<Notify>,
}

impl DelayedMockAgentClient {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MockAgentClient::new(),
            delay,
            request_started: Arc::new(Notify::new()),
        }
    }

    pub fn queue_showtimes(&self, showtimes: &[&str]) {
        self.inner.queue_showtimes(showtimes);
    }

    pub fn recorded_requests(&self) -> Vec<AgentRequest> {
        self.inner.recorded_requests()
    }
}

#[async_trait]
impl AgentClient for DelayedMockAgentClient {
    async fn request(&self, request: &AgentRequest) -> Result<RawReply, TransportError> {
        self.inner.requests.lock().unwrap().push(request.clone());
        self.request_started.notify_one();
        tokio::time::sleep(self.delay).await;
        self.inner.next_response()
    }

    fn endpoint(&self) -> &str {
        "mock://delayed-agent"
    }
}

// ============================================================================
// Test Widget
// ============================================================================

/// Widget handle plus a notification receiver subscribed before any event
pub struct TestWidget<C: AgentClient + 'static> {
    pub handle: WidgetHandle,
    pub notifications: broadcast::Receiver<WidgetEvent>,
    pub client: Arc<C>,
}

impl<C: AgentClient + 'static> TestWidget<C> {
    pub fn spawn(client: C) -> Self {
        let client = Arc::new(client);
        let handle = WidgetHandle::spawn(client.clone(), &WidgetConfig::default());
        let notifications = handle.subscribe();
        Self {
            handle,
            notifications,
            client,
        }
    }

    /// Wait for the first notification matching `pred`
    pub async fn wait_for(
        &mut self,
        pred: impl Fn(&WidgetEvent) -> bool,
        timeout: Duration,
    ) -> Option<WidgetEvent> {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            match tokio::time::timeout(Duration::from_millis(50), self.notifications.recv()).await {
                Ok(Ok(event)) if pred(&event) => return Some(event),
                _ => continue,
            }
        }
        None
    }

    /// Wait for the in-flight exchange to resolve
    pub async fn wait_for_settled(&mut self, timeout: Duration) -> bool {
        self.wait_for(
            |e| matches!(e, WidgetEvent::ExchangeSettled { .. }),
            timeout,
        )
        .await
        .is_some()
    }

    /// Wait until any state change has been processed
    pub async fn wait_for_state_change(&mut self, timeout: Duration) -> bool {
        self.wait_for(|e| matches!(e, WidgetEvent::StateChanged { .. }), timeout)
            .await
            .is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_GREETING;
    use crate::conversation::{Origin, Payload};
    use crate::presenter::{Command, TerminalView, WAITING_NOTICE};
    use crate::runtime::ControllerError;
    use crate::state_machine::{
        ErrorKind, Key, Modifiers, PanelState, TransitionError, ERROR_BANNER, ERROR_REPLY,
    };

    const WAIT: Duration = Duration::from_secs(2);

    fn texts(widget: &WidgetHandle) -> Vec<(Origin, Payload)> {
        widget
            .snapshot()
            .entries
            .into_iter()
            .map(|e| (e.origin, e.payload))
            .collect()
    }

    #[tokio::test]
    async fn test_mock_agent_client() {
        let mock = MockAgentClient::new();
        mock.queue_showtimes(&["7:00 PM"]);

        let request = AgentRequest::new("hi", vec![]);
        let reply = mock.request(&request).await.unwrap();
        assert!(reply.as_str().contains("7:00 PM"));

        // Second call should fail (no more responses)
        assert!(mock.request(&request).await.is_err());
        assert_eq!(mock.recorded_requests().len(), 2);
    }

    /// Opening the widget greets once and leaves nothing pending
    #[tokio::test]
    async fn test_open_greets() {
        let mut w = TestWidget::spawn(MockAgentClient::new());
        w.handle.open_widget().await.unwrap();
        assert!(w.wait_for_state_change(WAIT).await);

        let snapshot = w.handle.snapshot();
        assert_eq!(snapshot.panel, PanelState::Open);
        assert!(!snapshot.pending);
        assert_eq!(
            texts(&w.handle),
            vec![(Origin::Agent, Payload::text(DEFAULT_GREETING))]
        );

        // Close and reopen: no second greeting
        w.handle.close_widget().await.unwrap();
        w.handle.open_widget().await.unwrap();
        assert!(w
            .wait_for(
                |e| matches!(e, WidgetEvent::StateChanged { state } if state.panel == PanelState::Open),
                WAIT
            )
            .await
            .is_some());
        assert_eq!(w.handle.snapshot().entries.len(), 1);
    }

    /// Successful exchange appends a showtime card
    #[tokio::test]
    async fn test_showtime_reply() {
        let client = MockAgentClient::new();
        client.queue_body(r#"{"reply":"{\"data\":[\"7:00 PM\",\"9:30 PM\"]}"}"#);
        let mut w = TestWidget::spawn(client);

        w.handle.send("Show me movies tonight").await.unwrap();
        assert!(w.wait_for_settled(WAIT).await);

        assert_eq!(
            texts(&w.handle),
            vec![
                (Origin::User, Payload::text("Show me movies tonight")),
                (
                    Origin::Agent,
                    Payload::showtimes(vec!["7:00 PM".into(), "9:30 PM".into()])
                ),
            ]
        );
        let snapshot = w.handle.snapshot();
        assert!(!snapshot.pending);
        assert!(snapshot.last_error.is_none());

        let requests = w.client.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].message, "Show me movies tonight");
        assert!(requests[0].history.is_empty());
    }

    /// Transport failure folds into the timeline and sets the banner
    #[tokio::test]
    async fn test_transport_failure() {
        let client = MockAgentClient::new();
        client.queue_error(TransportError::connect("Connection refused"));
        let mut w = TestWidget::spawn(client);

        w.handle.send("hi").await.unwrap();
        assert!(w.wait_for_settled(WAIT).await);

        assert_eq!(
            texts(&w.handle),
            vec![
                (Origin::User, Payload::text("hi")),
                (Origin::Agent, Payload::text(ERROR_REPLY)),
            ]
        );
        let snapshot = w.handle.snapshot();
        assert!(!snapshot.pending);
        let error = snapshot.last_error.unwrap();
        assert_eq!(error.kind, ErrorKind::Transport);
        assert_eq!(error.message, ERROR_BANNER);

        // Banner can be dismissed independently of the timeline
        w.handle.dismiss_error().await.unwrap();
        assert!(w.wait_for_state_change(WAIT).await);
        assert!(w.handle.snapshot().last_error.is_none());
    }

    /// Malformed reply is handled exactly like a transport failure
    #[tokio::test]
    async fn test_malformed_reply() {
        let client = MockAgentClient::new();
        client.queue_body(r#"{"reply":"{\"type\":\"clarification\",\"message\":\"Which movie?\"}"}"#);
        let mut w = TestWidget::spawn(client);

        w.handle.send("showtimes?").await.unwrap();
        assert!(w.wait_for_settled(WAIT).await);

        let snapshot = w.handle.snapshot();
        assert_eq!(snapshot.entries.len(), 2);
        assert_eq!(snapshot.entries[1].payload, Payload::text(ERROR_REPLY));
        assert_eq!(snapshot.last_error.unwrap().kind, ErrorKind::MalformedReply);
    }

    /// Blank input is rejected without touching the timeline
    #[tokio::test]
    async fn test_blank_send_rejected() {
        let mut w = TestWidget::spawn(MockAgentClient::new());

        for text in ["", "   "] {
            w.handle.send(text).await.unwrap();
            let event = w
                .wait_for(|e| matches!(e, WidgetEvent::Rejected { .. }), WAIT)
                .await;
            assert!(matches!(
                event,
                Some(WidgetEvent::Rejected {
                    reason: TransitionError::EmptyMessage
                })
            ));
        }

        assert!(w.handle.snapshot().entries.is_empty());
        assert!(w.client.recorded_requests().is_empty());
    }

    /// A second send while the first is in flight is dropped
    #[tokio::test]
    async fn test_single_flight() {
        let client = DelayedMockAgentClient::new(Duration::from_millis(200));
        client.queue_showtimes(&["7:00 PM"]);
        client.queue_showtimes(&["should never be requested"]);
        let mut w = TestWidget::spawn(client);

        w.handle.send("a").await.unwrap();
        w.handle.send("b").await.unwrap();

        let event = w
            .wait_for(|e| matches!(e, WidgetEvent::Rejected { .. }), WAIT)
            .await;
        assert!(matches!(
            event,
            Some(WidgetEvent::Rejected {
                reason: TransitionError::RequestInFlight
            })
        ));

        let snapshot = w.handle.snapshot();
        assert!(snapshot.pending);
        assert_eq!(
            texts(&w.handle),
            vec![(Origin::User, Payload::text("a"))]
        );

        assert!(w.wait_for_settled(WAIT).await);
        assert_eq!(
            texts(&w.handle),
            vec![
                (Origin::User, Payload::text("a")),
                (Origin::Agent, Payload::showtimes(vec!["7:00 PM".into()])),
            ]
        );
        assert_eq!(w.client.recorded_requests().len(), 1);
    }

    /// Draft is cleared on dispatch even when the exchange fails
    #[tokio::test]
    async fn test_draft_cleared_on_dispatch() {
        let client = MockAgentClient::new();
        client.queue_error(TransportError::timeout("Request timeout"));
        let mut w = TestWidget::spawn(client);

        w.handle.update_draft("Any shows at 9?").await.unwrap();
        w.handle.submit().await.unwrap();
        assert!(w.wait_for_settled(WAIT).await);

        let snapshot = w.handle.snapshot();
        assert!(snapshot.draft.is_empty());
        assert_eq!(
            snapshot.entries[0].payload,
            Payload::text("Any shows at 9?")
        );
    }

    /// Enter sends, Shift+Enter does not, Escape closes the panel
    #[tokio::test]
    async fn test_key_intents() {
        let client = MockAgentClient::new();
        client.queue_showtimes(&["6:00 PM"]);
        let mut w = TestWidget::spawn(client);

        w.handle.open_widget().await.unwrap();
        w.handle.update_draft("tonight").await.unwrap();
        w.handle
            .key_intent(Key::Enter, Modifiers::SHIFT)
            .await
            .unwrap();
        w.handle.key_intent(Key::Enter, Modifiers::NONE).await.unwrap();
        assert!(w.wait_for_settled(WAIT).await);

        let requests = w.client.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].message, "tonight");
        // Greeting was sent as history
        assert_eq!(requests[0].history.len(), 1);

        w.handle
            .key_intent(Key::Escape, Modifiers::NONE)
            .await
            .unwrap();
        assert!(w
            .wait_for(
                |e| matches!(e, WidgetEvent::StateChanged { state } if state.panel == PanelState::Closed),
                WAIT
            )
            .await
            .is_some());
        // Greeting, user, card
        assert_eq!(w.handle.snapshot().entries.len(), 3);
    }

    /// History carries every prior entry in order
    #[tokio::test]
    async fn test_history_accumulates() {
        let client = MockAgentClient::new();
        client.queue_showtimes(&["7:00 PM"]);
        client.queue_error(TransportError::connect("refused"));
        client.queue_showtimes(&["9:30 PM"]);
        let mut w = TestWidget::spawn(client);

        for text in ["one", "two", "three"] {
            w.handle.send(text).await.unwrap();
            assert!(w.wait_for_settled(WAIT).await);
        }

        let requests = w.client.recorded_requests();
        let history_lens: Vec<usize> = requests.iter().map(|r| r.history.len()).collect();
        assert_eq!(history_lens, vec![0, 2, 4]);
        assert_eq!(requests[2].history[1].content, "7:00 PM");
        assert_eq!(requests[2].history[3].content, ERROR_REPLY);
        assert_eq!(w.handle.snapshot().entries.len(), 6);
    }

    /// Teardown abandons the in-flight request without touching the timeline
    #[tokio::test]
    async fn test_teardown_discards_in_flight_reply() {
        let client = DelayedMockAgentClient::new(Duration::from_millis(200));
        client.queue_showtimes(&["7:00 PM"]);
        let started = client.request_started.clone();
        let w = TestWidget::spawn(client);

        w.handle.send("a").await.unwrap();
        tokio::time::timeout(WAIT, started.notified())
            .await
            .expect("request should start");

        w.handle.teardown();
        assert!(w.handle.is_closed());
        tokio::time::sleep(Duration::from_millis(400)).await;

        let snapshot = w.handle.snapshot();
        assert_eq!(
            snapshot
                .entries
                .iter()
                .map(|e| e.origin)
                .collect::<Vec<_>>(),
            vec![Origin::User]
        );
        assert!(matches!(
            w.handle.send("b").await,
            Err(ControllerError::Closed)
        ));
    }

    /// Every append is announced so presenters can scroll to it
    #[tokio::test]
    async fn test_entry_notifications_in_order() {
        let client = MockAgentClient::new();
        client.queue_showtimes(&["7:00 PM"]);
        let mut w = TestWidget::spawn(client);

        w.handle.open_widget().await.unwrap();
        w.handle.send("tonight").await.unwrap();

        let mut appended = Vec::new();
        while appended.len() < 3 {
            let Some(WidgetEvent::EntryAppended { entry }) = w
                .wait_for(|e| matches!(e, WidgetEvent::EntryAppended { .. }), WAIT)
                .await
            else {
                panic!("missing entry notification");
            };
            appended.push(entry.origin);
        }
        assert_eq!(appended, vec![Origin::Agent, Origin::User, Origin::Agent]);
    }

    /// Closing the panel hides the chat but the exchange still completes
    #[tokio::test]
    async fn test_close_does_not_cancel_request() {
        let client = DelayedMockAgentClient::new(Duration::from_millis(200));
        client.queue_showtimes(&["7:00 PM"]);
        let mut w = TestWidget::spawn(client);

        w.handle.open_widget().await.unwrap();
        w.handle.send("tonight").await.unwrap();
        w.handle.close_widget().await.unwrap();
        assert!(w
            .wait_for(
                |e| matches!(e, WidgetEvent::StateChanged { state } if state.panel == PanelState::Closed),
                WAIT
            )
            .await
            .is_some());
        assert!(w.handle.snapshot().pending);

        assert!(w.wait_for_settled(WAIT).await);
        let snapshot = w.handle.snapshot();
        assert!(!snapshot.pending);
        assert_eq!(snapshot.panel, PanelState::Closed);
        assert!(snapshot.last_error.is_none());
        assert_eq!(
            snapshot.entries.last().map(|e| e.payload.clone()),
            Some(Payload::showtimes(vec!["7:00 PM".into()]))
        );
    }

    /// Typing a line while the agent is answering tells the user to wait
    #[tokio::test]
    async fn test_typed_line_while_pending_reports_waiting() {
        let client = DelayedMockAgentClient::new(Duration::from_millis(300));
        client.queue_showtimes(&["7:00 PM"]);
        let mut w = TestWidget::spawn(client);
        let mut view = TerminalView::attach(w.handle.clone());

        w.handle.send("a").await.unwrap();
        Command::parse("b").apply(&w.handle).await.unwrap();

        let event = w
            .wait_for(|e| matches!(e, WidgetEvent::Rejected { .. }), WAIT)
            .await;
        assert!(matches!(
            event,
            Some(WidgetEvent::Rejected {
                reason: TransitionError::InputLocked
            })
        ));

        let mut printed = Vec::new();
        while !printed.iter().any(|line| line == WAITING_NOTICE) {
            let lines = tokio::time::timeout(WAIT, view.next_lines())
                .await
                .expect("view should print the notice")
                .expect("runtime still running");
            printed.extend(lines);
        }

        assert!(w.wait_for_settled(WAIT).await);
        assert_eq!(
            texts(&w.handle),
            vec![
                (Origin::User, Payload::text("a")),
                (Origin::Agent, Payload::showtimes(vec!["7:00 PM".into()])),
            ]
        );
        assert_eq!(w.client.recorded_requests().len(), 1);
    }

    /// A view attached before the first open renders the greeting
    #[tokio::test]
    async fn test_view_attached_before_open_shows_greeting() {
        let w = TestWidget::spawn(MockAgentClient::new());
        let mut view = TerminalView::attach(w.handle.clone());

        w.handle.open_widget().await.unwrap();

        let lines = tokio::time::timeout(WAIT, view.next_lines())
            .await
            .expect("panel should be drawn")
            .expect("runtime still running");
        let screen = lines.join("\n");
        assert!(screen.contains("=== Agent Assistant ==="));
        assert!(screen.contains(DEFAULT_GREETING));
    }
}
