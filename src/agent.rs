//! Remote agent access
//!
//! The agent is a black box behind one HTTP endpoint. A client performs
//! exactly one call per request and holds no conversation state.

mod error;
mod http;
mod types;

pub use error::{TransportError, TransportErrorKind};
pub use http::HttpAgentClient;
pub use types::{build_history, AgentRequest, HistoryTurn, RawReply, Role};

use async_trait::async_trait;
use std::sync::Arc;

/// One request/response exchange with the agent service
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Send the message with its history and return the undecoded body
    async fn request(&self, request: &AgentRequest) -> Result<RawReply, TransportError>;

    /// Endpoint this client talks to (for logging)
    fn endpoint(&self) -> &str;
}

#[async_trait]
impl<T: AgentClient + ?Sized> AgentClient for Arc<T> {
    async fn request(&self, request: &AgentRequest) -> Result<RawReply, TransportError> {
        (**self).request(request).await
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}

/// Logging wrapper for agent clients
pub struct LoggingClient {
    inner: Arc<dyn AgentClient>,
    endpoint: String,
}

impl LoggingClient {
    pub fn new(inner: Arc<dyn AgentClient>) -> Self {
        let endpoint = inner.endpoint().to_string();
        Self { inner, endpoint }
    }
}

#[async_trait]
impl AgentClient for LoggingClient {
    async fn request(&self, request: &AgentRequest) -> Result<RawReply, TransportError> {
        let start = std::time::Instant::now();
        let result = self.inner.request(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    endpoint = %self.endpoint,
                    duration_ms = %duration.as_millis(),
                    history_len = request.history.len(),
                    body_len = reply.as_str().len(),
                    "Agent request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    endpoint = %self.endpoint,
                    duration_ms = %duration.as_millis(),
                    kind = e.kind.as_str(),
                    status = ?e.status,
                    error = %e.message,
                    "Agent request failed"
                );
            }
        }

        result
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
