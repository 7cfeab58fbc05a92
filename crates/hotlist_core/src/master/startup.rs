use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{error, info};

use super::Master;

impl Master {
    pub(super) fn log_startup(&self) {
        info!(target: "hotlist::master", "Starting HOTLIST MASTER");
        info!(
            target: "hotlist::master",
            listen = %self.cfg.server().listen(),
            max_connections = self.cfg.server().max_connections(),
            log_level = %self.cfg.global().log_level(),
            cache_backend = %self.cfg.cache().backend(),
            sources = self.state.registry().len(),
            "Configuration loaded"
        );
    }

    pub(super) fn init_semaphore(&self) -> Arc<Semaphore> {
        let max_conns = self.cfg.server().max_connections();
        let semaphore = Arc::new(Semaphore::new(max_conns));
        info!(
            target: "hotlist::master",
            max_conns,
            "Global connection semaphore initialized"
        );
        semaphore
    }
}

/// Resolves on Ctrl+C. If the handler cannot be installed, never resolves.
pub(super) async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(target: "hotlist::master", error = ?e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
