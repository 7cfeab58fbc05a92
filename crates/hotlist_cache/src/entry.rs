use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, TimeDelta, Utc};

/// A cached upstream payload.
///
/// Entries are replaced whole; nothing mutates a stored payload in place.
#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub key: String,
    pub payload: Bytes,
    pub stored_at: DateTime<Utc>,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn new(key: impl Into<String>, payload: Bytes, stored_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            key: key.into(),
            payload,
            stored_at,
            ttl,
        }
    }

    /// Instant after which the entry must not be served.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let ttl = TimeDelta::from_std(self.ttl).ok()?;
        self.stored_at.checked_add_signed(ttl)
    }

    /// `now >= stored_at + ttl`. An unrepresentable deadline never expires.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at() {
            Some(deadline) => now >= deadline,
            None => false,
        }
    }
}
