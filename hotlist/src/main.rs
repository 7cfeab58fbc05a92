use std::sync::Arc;

use hotlist_cache::{CacheStore, MemoryCacheStore, RedisCacheStore, spawn_sweeper};
use hotlist_config::{CacheBackend, DEFAULT_CONFIG_FILE, HotlistConfig};
use hotlist_core::Master;
use hotlist_fetch::{Fetcher, HttpUpstream};
use hotlist_router::Registry;
use hotlist_sources::{SourceContext, register_all};
use tracing::{info, warn};
use utils::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = HotlistConfig::from_file_or_default(DEFAULT_CONFIG_FILE);
    init_tracing(cfg.global().log_level());
    cfg.print();

    let store = build_store(&cfg).await;
    if let Some(every) = cfg.cache().sweep_interval() {
        if store.backend() == "memory" {
            spawn_sweeper(store.clone(), every);
        }
    }

    let fetcher = Fetcher::new(store);
    let upstream = Arc::new(HttpUpstream::new(cfg.upstream().user_agent())?);
    let ctx = SourceContext::new(fetcher.clone(), upstream)
        .with_timeout(cfg.upstream().request_timeout())
        .with_default_ttl(cfg.cache().default_ttl());

    let mut builder = Registry::builder();
    let registered = register_all(&mut builder, &ctx, cfg.sources().disabled());
    info!(target: "hotlist::main", registered, "Sources registered");

    Master::new(cfg, builder.build(), fetcher).run().await
}

async fn build_store(cfg: &HotlistConfig) -> Arc<dyn CacheStore> {
    match cfg.cache().backend() {
        CacheBackend::Memory => Arc::new(MemoryCacheStore::new()),
        CacheBackend::Redis => match RedisCacheStore::connect(cfg.cache().redis_url()).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                warn!(
                    target: "hotlist::main",
                    error = %e,
                    "Redis unavailable, falling back to the in-memory cache"
                );
                Arc::new(MemoryCacheStore::new())
            }
        },
    }
}
