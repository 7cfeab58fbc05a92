use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use hotlist_cache::{CacheEntry, CachePolicy, CacheStore, Clock, SystemClock};
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::flight::{Flight, FlightGuard, InFlight};
use crate::stats::FetchStats;
use crate::upstream::{DEFAULT_TIMEOUT, Upstream, UpstreamRequest};

/// Raw upstream payload plus the moment it was fetched.
///
/// `update_time` is when the upstream call completed, so every cache hit for
/// the same entry reports the same value.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    pub data: Bytes,
    pub update_time: DateTime<Utc>,
    pub from_cache: bool,
}

impl FetchResult {
    fn from_entry(entry: CacheEntry) -> Self {
        Self {
            data: entry.payload,
            update_time: entry.stored_at,
            from_cache: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub ttl: Duration,
    pub no_cache: bool,
    pub timeout: Duration,
}

impl FetchOptions {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            no_cache: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Cache-aware, deduplicating fetcher shared by every source adapter.
#[derive(Clone)]
pub struct Fetcher {
    store: Arc<dyn CacheStore>,
    in_flight: InFlight,
    clock: Arc<dyn Clock>,
    stats: Arc<FetchStats>,
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("backend", &self.store.backend())
            .field("in_flight", &self.in_flight.len())
            .finish()
    }
}

impl Fetcher {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn CacheStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            in_flight: Arc::new(DashMap::new()),
            clock,
            stats: Arc::new(FetchStats::default()),
        }
    }

    /// The shared store, for helper services that manage their own keys.
    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    pub fn stats(&self) -> &FetchStats {
        &self.stats
    }

    /// Number of keys with an upstream call currently running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Cache read, in-flight dedup, producer call, cache write.
    ///
    /// With `no_cache` the read is skipped but a successful result is still
    /// written back. Concurrent calls for a key that is already in flight
    /// share its outcome, errors included. Errors are never cached.
    pub async fn fetch<F>(
        &self,
        key: &str,
        opts: FetchOptions,
        producer: F,
    ) -> Result<FetchResult, FetchError>
    where
        F: Future<Output = Result<Bytes, FetchError>> + Send + 'static,
    {
        CachePolicy::validate_ttl(opts.ttl)?;

        if !opts.no_cache {
            if let Some(entry) = self.lookup(key).await {
                self.stats.hit();
                debug!(target: "hotlist::fetch", cache_key = %key, "Cache hit");
                return Ok(FetchResult::from_entry(entry));
            }
            self.stats.miss();
            debug!(target: "hotlist::fetch", cache_key = %key, "Cache miss");
        }

        let flight = match self.in_flight.entry(key.to_string()) {
            Entry::Occupied(slot) => {
                self.stats.joined();
                debug!(target: "hotlist::fetch", cache_key = %key, "Joining in-flight request");
                slot.get().clone()
            }
            Entry::Vacant(slot) => {
                let flight = self.launch(key, opts, producer);
                slot.insert(flight.clone());
                flight
            }
        };

        flight.await
    }

    /// `fetch` with an [`Upstream`] GET as the producer. The request inherits
    /// the options' timeout.
    pub async fn fetch_upstream(
        &self,
        key: &str,
        opts: FetchOptions,
        upstream: Arc<dyn Upstream>,
        req: UpstreamRequest,
    ) -> Result<FetchResult, FetchError> {
        let req = req.timeout(opts.timeout);
        self.fetch(key, opts, async move { upstream.get(req).await })
            .await
    }

    async fn lookup(&self, key: &str) -> Option<CacheEntry> {
        match self.store.get(key).await {
            Ok(entry) => entry,
            Err(err) => {
                self.stats.cache_error();
                warn!(
                    target: "hotlist::fetch",
                    cache_key = %key,
                    backend = self.store.backend(),
                    error = %err,
                    "Cache read failed; treating as miss"
                );
                None
            }
        }
    }

    /// Spawns the producer so that dropping any waiter, the first included,
    /// never cancels the shared call. Unless bypassing, the cache is read once
    /// more inside the flight before the producer runs.
    fn launch<F>(&self, key: &str, opts: FetchOptions, producer: F) -> Flight
    where
        F: Future<Output = Result<Bytes, FetchError>> + Send + 'static,
    {
        let guard = FlightGuard::new(self.in_flight.clone(), key.to_string());
        let store = self.store.clone();
        let clock = self.clock.clone();
        let stats = self.stats.clone();
        let task_key = key.to_string();

        let handle = tokio::spawn(async move {
            let _guard = guard;

            // A caller whose first read raced a finishing flight lands here
            // after that flight already stored its result.
            if !opts.no_cache {
                if let Ok(Some(entry)) = store.get(&task_key).await {
                    stats.hit();
                    debug!(
                        target: "hotlist::fetch",
                        cache_key = %task_key,
                        "Cache filled by previous flight; skipping upstream"
                    );
                    return Ok(FetchResult::from_entry(entry));
                }
            }

            stats.upstream_call();
            let started = Instant::now();

            let outcome = match tokio::time::timeout(opts.timeout, producer).await {
                Ok(outcome) => outcome,
                Err(_) => Err(FetchError::Timeout {
                    key: task_key.clone(),
                    after: opts.timeout,
                }),
            };

            let data = match outcome {
                Ok(data) => data,
                Err(err) => {
                    stats.upstream_failure();
                    warn!(
                        target: "hotlist::fetch",
                        cache_key = %task_key,
                        error = %err,
                        "Upstream fetch failed"
                    );
                    return Err(err);
                }
            };

            let update_time = clock.now();
            let entry = CacheEntry::new(task_key.as_str(), data.clone(), update_time, opts.ttl);
            if let Err(err) = store.put(entry).await {
                stats.cache_error();
                warn!(
                    target: "hotlist::fetch",
                    cache_key = %task_key,
                    error = %err,
                    "Cache write failed; serving uncached result"
                );
            }

            debug!(
                target: "hotlist::fetch",
                cache_key = %task_key,
                bytes = data.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                ttl_secs = opts.ttl.as_secs(),
                "Upstream fetch stored"
            );

            Ok(FetchResult {
                data,
                update_time,
                from_cache: false,
            })
        });

        let key = key.to_string();
        async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(join_err) => Err(FetchError::Interrupted {
                    key,
                    message: join_err.to_string(),
                }),
            }
        }
        .boxed()
        .shared()
    }
}
