use std::sync::Arc;
use std::time::Duration;

use hotlist_cache::CachePolicy;
use hotlist_fetch::{DEFAULT_TIMEOUT, FetchOptions, FetchResult, Fetcher, Upstream, UpstreamRequest};
use hotlist_router::RouteError;

/// Everything an adapter needs to reach its upstream: the shared fetcher,
/// the network client and the default TTL/timeout.
#[derive(Clone)]
pub struct SourceContext {
    fetcher: Fetcher,
    upstream: Arc<dyn Upstream>,
    timeout: Duration,
    default_ttl: Duration,
}

impl SourceContext {
    pub fn new(fetcher: Fetcher, upstream: Arc<dyn Upstream>) -> Self {
        Self {
            fetcher,
            upstream,
            timeout: DEFAULT_TIMEOUT,
            default_ttl: CachePolicy::default_ttl(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Cached GET of `req` under `key`. `ttl` of `None` uses the default.
    pub async fn fetch(
        &self,
        key: &str,
        req: UpstreamRequest,
        ttl: Option<Duration>,
        no_cache: bool,
    ) -> Result<FetchResult, RouteError> {
        let opts = FetchOptions::new(ttl.unwrap_or(self.default_ttl))
            .no_cache(no_cache)
            .timeout(self.timeout);
        let result = self
            .fetcher
            .fetch_upstream(key, opts, self.upstream.clone(), req)
            .await?;
        Ok(result)
    }
}

impl std::fmt::Debug for SourceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceContext")
            .field("fetcher", &self.fetcher)
            .field("timeout", &self.timeout)
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}
