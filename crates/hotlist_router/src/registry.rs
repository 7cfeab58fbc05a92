use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::context::RequestContext;
use crate::data::RouterData;
use crate::error::RouteError;
use crate::handler::RouteHandler;
use crate::normalize::normalize;

/// Entry of the `/all` listing.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RouteInfo {
    pub name: String,
    pub path: String,
}

/// Collects handlers at startup.
#[derive(Default)]
pub struct RegistryBuilder {
    handlers: HashMap<String, Arc<dyn RouteHandler>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `key`. A second registration of the same
    /// key replaces the first.
    pub fn register(&mut self, key: &str, handler: Arc<dyn RouteHandler>) -> &mut Self {
        if self.handlers.insert(key.to_string(), handler).is_some() {
            warn!(target: "hotlist::router", source = key, "handler re-registered, previous one replaced");
        }
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            handlers: self.handlers,
        }
    }
}

/// Read-only map from source key to handler. Safe to share across tasks.
#[derive(Clone, Default)]
pub struct Registry {
    handlers: HashMap<String, Arc<dyn RouteHandler>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Runs the handler registered under `key` and normalizes its output.
    pub async fn dispatch(
        &self,
        key: &str,
        ctx: &RequestContext,
        no_cache: bool,
    ) -> Result<RouterData, RouteError> {
        let handler = self
            .handlers
            .get(key)
            .ok_or_else(|| RouteError::UnknownSource(key.to_string()))?;

        debug!(target: "hotlist::router", source = key, no_cache, "dispatch");
        let output = handler.handle(ctx, no_cache).await?;
        Ok(normalize(output))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.handlers.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered sources sorted by key.
    pub fn routes(&self) -> Vec<RouteInfo> {
        let mut routes: Vec<RouteInfo> = self
            .handlers
            .keys()
            .map(|name| RouteInfo {
                name: name.clone(),
                path: format!("/{name}"),
            })
            .collect();
        routes.sort_by(|a, b| a.name.cmp(&b.name));
        routes
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("routes", &self.routes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use bytes::Bytes;
    use chrono::Utc;
    use hotlist_fetch::{FetchError, FetchResult};

    use super::Registry;
    use crate::{HandlerOutput, ListItem, RequestContext, RouteError, RouteMeta, handler_fn};

    fn fetched(from_cache: bool) -> FetchResult {
        FetchResult {
            data: Bytes::new(),
            update_time: Utc::now(),
            from_cache,
        }
    }

    fn registry() -> Registry {
        let mut builder = Registry::builder();
        builder.register(
            "echo",
            Arc::new(handler_fn(|ctx: RequestContext, no_cache: bool| async move {
                let kind = ctx.query("type").unwrap_or("hot").to_string();
                let items = vec![
                    ListItem::new(1i64, format!("{kind}-1"), "https://example.com/1"),
                    ListItem::new(2i64, format!("{kind}-2"), "https://example.com/2"),
                ];
                Ok::<_, RouteError>(HandlerOutput::new(
                    RouteMeta::new("echo", "Echo", kind.as_str(), "https://example.com"),
                    &fetched(!no_cache),
                    items,
                ))
            })),
        );
        builder.register(
            "broken",
            Arc::new(handler_fn(|_ctx: RequestContext, _no_cache: bool| async move {
                Err::<HandlerOutput, _>(RouteError::from(FetchError::UpstreamStatus {
                    url: "https://example.com".into(),
                    status: 503,
                }))
            })),
        );
        builder.build()
    }

    #[tokio::test]
    async fn dispatch_normalizes_handler_output() {
        let registry = registry();
        let ctx = RequestContext::from_query("type=realtime");
        let data = registry.dispatch("echo", &ctx, false).await.unwrap();

        assert_eq!(data.name(), "echo");
        assert_eq!(data.type_label(), "realtime");
        assert_eq!(data.total(), data.data().len());
        assert_eq!(data.data()[0].title, "realtime-1");
        assert!(data.from_cache());
    }

    #[tokio::test]
    async fn no_cache_reaches_the_handler() {
        let registry = registry();
        let data = registry
            .dispatch("echo", &RequestContext::default(), true)
            .await
            .unwrap();
        assert!(!data.from_cache());
    }

    #[tokio::test]
    async fn unknown_source_is_reported() {
        let err = registry()
            .dispatch("unknown-source", &RequestContext::default(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, RouteError::UnknownSource(ref key) if key == "unknown-source"));
    }

    #[tokio::test]
    async fn handler_errors_propagate() {
        let err = registry()
            .dispatch("broken", &RequestContext::default(), false)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RouteError::Fetch(FetchError::UpstreamStatus { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn later_registration_wins() {
        let replaced = Arc::new(AtomicBool::new(false));
        let flag = replaced.clone();

        let mut builder = Registry::builder();
        builder.register(
            "dup",
            Arc::new(handler_fn(|_ctx: RequestContext, _: bool| async move {
                Err::<HandlerOutput, _>(RouteError::UnknownSource("first".into()))
            })),
        );
        builder.register(
            "dup",
            Arc::new(handler_fn(move |_ctx: RequestContext, _: bool| {
                let flag = flag.clone();
                async move {
                    flag.store(true, Ordering::SeqCst);
                    Ok::<_, RouteError>(HandlerOutput::new(
                        RouteMeta::new("dup", "Dup", "热榜", "https://example.com"),
                        &fetched(false),
                        Vec::new(),
                    ))
                }
            })),
        );
        let registry = builder.build();

        assert_eq!(registry.len(), 1);
        let data = registry
            .dispatch("dup", &RequestContext::default(), false)
            .await
            .unwrap();
        assert_eq!(data.total(), 0);
        assert!(replaced.load(Ordering::SeqCst));
    }

    #[test]
    fn routes_are_sorted_with_paths() {
        let routes = registry().routes();
        let names: Vec<_> = routes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["broken", "echo"]);
        assert_eq!(routes[1].path, "/echo");
    }
}
