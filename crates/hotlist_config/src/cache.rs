use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Memory,
    Redis,
}

impl std::fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackend::Memory => write!(f, "memory"),
            CacheBackend::Redis => write!(f, "redis"),
        }
    }
}

// =======================================================
// CACHE CONFIG + DEFAULTS
// =======================================================
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    /// TTL for sources that do not pick their own.
    pub default_ttl_secs: u64,
    /// Period of the memory sweeper; `0` disables it.
    pub sweep_interval_secs: u64,
    pub redis_url: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            default_ttl_secs: 3600,
            sweep_interval_secs: 300,
            redis_url: "redis://127.0.0.1:6379/0".into(),
        }
    }
}

impl CacheConfig {
    pub fn backend(&self) -> CacheBackend {
        self.backend
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    /// `None` when the sweeper is disabled.
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }

    pub fn redis_url(&self) -> &str {
        &self.redis_url
    }

    pub(crate) fn apply_defaults_from(&mut self, defaults: &CacheConfig) {
        if self.default_ttl_secs == 0 {
            self.default_ttl_secs = defaults.default_ttl_secs;
        }
        if self.redis_url.trim().is_empty() {
            self.redis_url = defaults.redis_url.clone();
        }
    }
}
