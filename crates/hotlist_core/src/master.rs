use std::{future::Future, sync::Arc, time::Duration};

use hotlist_config::HotlistConfig;
use hotlist_fetch::Fetcher;
use hotlist_http::CorsPolicy;
use hotlist_router::Registry;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

use crate::AppState;

mod accept;
mod startup;

use accept::{accept_loop, bind_listener};

/// How long shutdown waits for open connections to finish.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Master {
    cfg: Arc<HotlistConfig>,
    state: Arc<AppState>,
}

impl Master {
    pub fn new(cfg: HotlistConfig, registry: Registry, fetcher: Fetcher) -> Self {
        let cors = CorsPolicy::new(
            cfg.server().allowed_domain(),
            cfg.server().allowed_host(),
        );
        Self {
            cfg: Arc::new(cfg),
            state: Arc::new(AppState::new(registry, fetcher, cors)),
        }
    }

    /// Binds the configured address and serves until Ctrl+C.
    #[instrument(skip(self), fields(
        listen = %self.cfg.server().listen(),
        max_connections = self.cfg.server().max_connections(),
    ))]
    pub async fn run(self) -> anyhow::Result<()> {
        self.log_startup();
        let listener = bind_listener(self.cfg.server().listen()).await?;
        self.serve(listener, startup::shutdown_signal()).await
    }

    /// Serves on an already bound listener until `shutdown` resolves, then
    /// stops accepting and waits for open connections to close.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()>,
    {
        let max_conns = self.cfg.server().max_connections();
        let semaphore = self.init_semaphore();

        info!(
            target: "hotlist::master",
            sources = self.state.registry().len(),
            "Master initialized. Waiting for incoming connections (Ctrl+C to stop)..."
        );

        tokio::select! {
            res = accept_loop(listener, semaphore.clone(), self.state.clone()) => res?,
            _ = shutdown => {
                info!(target: "hotlist::master", "Shutdown requested; no longer accepting connections");
            }
        }

        let permits = u32::try_from(max_conns).unwrap_or(u32::MAX);
        match tokio::time::timeout(DRAIN_TIMEOUT, semaphore.acquire_many(permits)).await {
            Ok(_) => info!(target: "hotlist::master", "All connections closed"),
            Err(_) => warn!(
                target: "hotlist::master",
                open = max_conns - semaphore.available_permits(),
                "Connections still open after drain timeout; exiting anyway"
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use hotlist_cache::MemoryCacheStore;
    use hotlist_config::HotlistConfig;
    use hotlist_fetch::Fetcher;
    use hotlist_router::Registry;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::oneshot;

    use super::Master;

    #[tokio::test]
    async fn serves_http1_until_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let master = Master::new(
            HotlistConfig::default(),
            Registry::builder().build(),
            Fetcher::new(Arc::new(MemoryCacheStore::new())),
        );

        let (stop, stopped) = oneshot::channel::<()>();
        let server = tokio::spawn(master.serve(listener, async {
            let _ = stopped.await;
        }));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /all HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut raw = String::new();
        stream.read_to_string(&mut raw).await.unwrap();

        assert!(raw.starts_with("HTTP/1.1 200 OK"), "{raw}");
        assert!(raw.contains(r#""count":0"#), "{raw}");
        assert!(raw.to_ascii_lowercase().contains("access-control-allow-origin: *"));

        stop.send(()).unwrap();
        server.await.unwrap().unwrap();
    }
}
