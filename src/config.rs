//! Widget configuration
//!
//! Everything comes from the environment; unset or unparsable values fall
//! back to defaults.

use std::time::Duration;

/// Agent endpoint used when `SHOWTIME_AGENT_URL` is unset
pub const DEFAULT_AGENT_URL: &str = "http://127.0.0.1:8000/api/ai_agent_test/";

/// First entry shown when the widget opens on an empty timeline
pub const DEFAULT_GREETING: &str = "Hello! How can I help you today?";

/// Configuration for the agent transport
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub endpoint: String,
    /// Transport timeout. `None` leaves a hung request pending indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_AGENT_URL.to_string(),
            timeout: None,
        }
    }
}

impl AgentConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let endpoint = lookup("SHOWTIME_AGENT_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_AGENT_URL.to_string());

        let timeout = lookup("SHOWTIME_AGENT_TIMEOUT_SECS")
            .and_then(|secs| secs.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Self { endpoint, timeout }
    }
}

/// Configuration for one widget runtime
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    pub agent: AgentConfig,
    pub greeting: String,
    /// Capacity of the presenter → runtime event queue
    pub event_capacity: usize,
    /// Capacity of the change notification channel
    pub notify_capacity: usize,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            agent: AgentConfig::default(),
            greeting: DEFAULT_GREETING.to_string(),
            event_capacity: 32,
            notify_capacity: 128,
        }
    }
}

impl WidgetConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let greeting = lookup("SHOWTIME_GREETING")
            .filter(|g| !g.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GREETING.to_string());

        Self {
            agent: AgentConfig::from_lookup(&lookup),
            greeting,
            ..Self::default()
        }
    }
}
