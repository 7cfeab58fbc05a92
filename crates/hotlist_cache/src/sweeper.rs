use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use crate::store::CacheStore;

/// Periodically reclaims memory held by expired-but-unread entries.
///
/// Expiry correctness never depends on this task; reads already ignore stale
/// entries.
pub fn spawn_sweeper(store: Arc<dyn CacheStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick fires immediately; nothing can be stale yet.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let purged = store.purge_expired().await;
            if purged > 0 {
                debug!(
                    target: "hotlist::cache",
                    backend = store.backend(),
                    purged,
                    "Swept expired cache entries"
                );
            }
        }
    })
}
