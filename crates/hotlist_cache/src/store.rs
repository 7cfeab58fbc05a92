use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::entry::CacheEntry;
use crate::error::CacheError;
use crate::policy::CachePolicy;

/// Key/value store with per-entry expiry.
///
/// Implementations never return an expired entry from `get`. Storage-medium
/// failures come back as [`CacheError::Unavailable`].
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError>;

    /// Stores a fully stamped entry, overwriting any entry under the same key.
    /// TTLs under one second are rejected.
    async fn put(&self, entry: CacheEntry) -> Result<(), CacheError>;

    /// Stores `value` stamped with the store's notion of now.
    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        self.put(CacheEntry::new(key, value, self.now(), ttl)).await
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    /// Drops expired entries and returns how many were removed. Stores with
    /// native expiry keep the default no-op.
    async fn purge_expired(&self) -> usize {
        0
    }

    /// Short name for logs.
    fn backend(&self) -> &'static str;
}

/// Process-local store backed by a sharded concurrent map.
pub struct MemoryCacheStore {
    inner: DashMap<String, CacheEntry>,
    clock: Arc<dyn Clock>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: DashMap::new(),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCacheStore")
            .field("entries", &self.inner.len())
            .finish()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let now = self.clock.now();
        let entry = match self.inner.get(key) {
            Some(entry) => entry.clone(),
            None => return Ok(None),
        };

        if entry.is_expired(now) {
            // Only drop it if nobody replaced it since we looked.
            self.inner
                .remove_if(key, |_, current| current.stored_at == entry.stored_at);
            debug!(target: "hotlist::cache", cache_key = %key, "Expired entry evicted on read");
            return Ok(None);
        }

        Ok(Some(entry))
    }

    async fn put(&self, entry: CacheEntry) -> Result<(), CacheError> {
        CachePolicy::validate_ttl(entry.ttl)?;
        self.inner.insert(entry.key.clone(), entry);
        Ok(())
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.inner.len();
        self.inner.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.inner.len())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
