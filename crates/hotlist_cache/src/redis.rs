//! Redis-backed cache store.
//!
//! Each entry is a hash `{payload, stored_at, ttl}` with a native `EXPIRE`, so
//! Redis reclaims memory itself. Reads still check `stored_at + ttl` against
//! the local clock.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use redis::{aio::ConnectionManager, AsyncCommands};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::entry::CacheEntry;
use crate::error::CacheError;
use crate::policy::CachePolicy;
use crate::store::CacheStore;

const FIELD_PAYLOAD: &str = "payload";
const FIELD_STORED_AT: &str = "stored_at";
const FIELD_TTL: &str = "ttl";

#[derive(Clone)]
pub struct RedisCacheStore {
    conn_manager: ConnectionManager,
    redis_url: String,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for RedisCacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCacheStore")
            .field("redis_url", &self.redis_url)
            .field("conn_manager", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisCacheStore {
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        Self::connect_with_clock(redis_url, Arc::new(SystemClock)).await
    }

    pub async fn connect_with_clock(
        redis_url: &str,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CacheError> {
        info!(target: "hotlist::cache", %redis_url, "Initializing Redis connection manager");
        let client = redis::Client::open(redis_url).map_err(unavailable)?;
        let conn_manager = ConnectionManager::new(client).await.map_err(unavailable)?;
        Ok(Self {
            conn_manager,
            redis_url: redis_url.to_string(),
            clock,
        })
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let mut conn = self.conn_manager.clone();
        let fields: HashMap<String, Vec<u8>> = conn.hgetall(key).await.map_err(unavailable)?;
        if fields.is_empty() {
            debug!(target: "hotlist::cache", cache_key = %key, backend = "redis", "Cache miss");
            return Ok(None);
        }

        let entry = decode_entry(key, fields)?;
        if entry.is_expired(self.clock.now()) {
            return Ok(None);
        }
        Ok(Some(entry))
    }

    async fn put(&self, entry: CacheEntry) -> Result<(), CacheError> {
        let ttl = CachePolicy::validate_ttl(entry.ttl)?;
        let key = entry.key.as_str();
        let stored_at = entry.stored_at.timestamp_millis();
        let mut conn = self.conn_manager.clone();

        redis::pipe()
            .atomic()
            .cmd("DEL")
            .arg(key)
            .ignore()
            .cmd("HSET")
            .arg(key)
            .arg(FIELD_PAYLOAD)
            .arg(entry.payload.to_vec())
            .arg(FIELD_STORED_AT)
            .arg(stored_at)
            .arg(FIELD_TTL)
            .arg(ttl.as_secs())
            .ignore()
            .cmd("EXPIRE")
            .arg(key)
            .arg(ttl.as_secs())
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(unavailable)?;

        debug!(target: "hotlist::cache", cache_key = %key, backend = "redis", ttl_secs = ttl.as_secs(), "Cache write");
        Ok(())
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

fn unavailable(err: redis::RedisError) -> CacheError {
    CacheError::Unavailable(err.to_string())
}

fn decode_entry(key: &str, mut fields: HashMap<String, Vec<u8>>) -> Result<CacheEntry, CacheError> {
    let payload = fields
        .remove(FIELD_PAYLOAD)
        .ok_or_else(|| CacheError::Unavailable(format!("entry {key} has no payload")))?;
    let stored_at = fields
        .get(FIELD_STORED_AT)
        .and_then(|raw| std::str::from_utf8(raw).ok())
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .ok_or_else(|| CacheError::Unavailable(format!("entry {key} has a bad stored_at")))?;
    let ttl = fields
        .get(FIELD_TTL)
        .and_then(|raw| std::str::from_utf8(raw).ok())
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .ok_or_else(|| CacheError::Unavailable(format!("entry {key} has a bad ttl")))?;

    Ok(CacheEntry::new(key, Bytes::from(payload), stored_at, ttl))
}
