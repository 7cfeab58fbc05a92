use std::time::Duration;

use hotlist_cache::CacheError;

/// Outcome of a failed fetch.
///
/// `Clone` because a single in-flight failure is handed to every waiter.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("upstream request to {url} failed: {message}")]
    Upstream { url: String, message: String },

    #[error("upstream {url} answered with status {status}")]
    UpstreamStatus { url: String, status: u16 },

    #[error("upstream fetch for {key} timed out after {}ms", after.as_millis())]
    Timeout { key: String, after: Duration },

    #[error("in-flight fetch for {key} was interrupted: {message}")]
    Interrupted { key: String, message: String },
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout { .. })
    }
}
