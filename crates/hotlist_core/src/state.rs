use hotlist_fetch::Fetcher;
use hotlist_http::CorsPolicy;
use hotlist_router::Registry;

/// Shared, read-only state every request handler sees.
#[derive(Debug)]
pub struct AppState {
    registry: Registry,
    fetcher: Fetcher,
    cors: CorsPolicy,
}

impl AppState {
    pub fn new(registry: Registry, fetcher: Fetcher, cors: CorsPolicy) -> Self {
        Self {
            registry,
            fetcher,
            cors,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    pub fn cors(&self) -> &CorsPolicy {
        &self.cors
    }
}
