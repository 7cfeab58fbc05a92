use std::time::Duration;

/// Errors surfaced by a cache store.
///
/// `Unavailable` is recoverable: callers treat it as a miss. `InvalidTtl` is a
/// programming error at the call site.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    #[error("invalid cache ttl {0:?}: must be at least one second")]
    InvalidTtl(Duration),
}
