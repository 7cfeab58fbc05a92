use std::time::Duration;

use serde::Deserialize;

pub(crate) const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// =======================================================
// UPSTREAM CONFIG + DEFAULTS
// =======================================================
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub request_timeout_ms: u64,
    /// Sent when an adapter does not set its own `User-Agent`.
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 6000,
            user_agent: DEFAULT_USER_AGENT.into(),
        }
    }
}

impl UpstreamConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub(crate) fn apply_defaults_from(&mut self, defaults: &UpstreamConfig) {
        if self.request_timeout_ms == 0 {
            self.request_timeout_ms = defaults.request_timeout_ms;
        }
        if self.user_agent.trim().is_empty() {
            self.user_agent = defaults.user_agent.clone();
        }
    }
}
