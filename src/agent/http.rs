//! HTTP transport to the agent endpoint

use super::{AgentClient, AgentRequest, RawReply, TransportError};
use crate::config::AgentConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

/// Agent client that POSTs JSON to a fixed endpoint
pub struct HttpAgentClient {
    client: Client,
    endpoint: String,
}

impl HttpAgentClient {
    pub fn new(config: &AgentConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::other(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    fn classify_status(status: StatusCode, body: &str) -> TransportError {
        let message = if body.is_empty() {
            format!("HTTP {status}")
        } else {
            format!("HTTP {status}: {body}")
        };
        TransportError::status(status.as_u16(), message)
    }
}

#[async_trait]
impl AgentClient for HttpAgentClient {
    async fn request(&self, request: &AgentRequest) -> Result<RawReply, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::timeout(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    TransportError::connect(format!("Connection failed: {e}"))
                } else {
                    TransportError::other(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::body(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(Self::classify_status(status, &body));
        }

        Ok(RawReply::new(body))
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
