use std::time::Duration;

use crate::error::CacheError;

pub struct CachePolicy;

impl CachePolicy {
    /// TTL used by adapters that do not declare their own.
    pub fn default_ttl() -> Duration {
        Duration::from_secs(3600)
    }

    /// Rejects TTLs that would make an entry expire on arrival.
    pub fn validate_ttl(ttl: Duration) -> Result<Duration, CacheError> {
        if ttl.as_secs() == 0 {
            return Err(CacheError::InvalidTtl(ttl));
        }
        Ok(ttl)
    }
}
