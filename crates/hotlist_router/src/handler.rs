use std::future::Future;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hotlist_fetch::FetchResult;

use crate::context::RequestContext;
use crate::data::{ListItem, RouteMeta};
use crate::error::RouteError;

/// What a handler hands back to the registry: its metadata, the ranked
/// list, and the freshness of the payload it was built from.
#[derive(Debug, Clone)]
pub struct HandlerOutput {
    pub meta: RouteMeta,
    pub items: Vec<ListItem>,
    pub update_time: DateTime<Utc>,
    pub from_cache: bool,
}

impl HandlerOutput {
    pub fn new(meta: RouteMeta, fetched: &FetchResult, items: Vec<ListItem>) -> Self {
        Self {
            meta,
            items,
            update_time: fetched.update_time,
            from_cache: fetched.from_cache,
        }
    }
}

/// Adapter for one source. `no_cache` must reach every fetch the handler
/// makes while serving the request.
#[async_trait]
pub trait RouteHandler: Send + Sync {
    async fn handle(&self, ctx: &RequestContext, no_cache: bool)
    -> Result<HandlerOutput, RouteError>;
}

/// Handler backed by an async closure.
pub struct FnHandler<F> {
    f: F,
}

pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(RequestContext, bool) -> Fut + Send + Sync,
    Fut: Future<Output = Result<HandlerOutput, RouteError>> + Send,
{
    FnHandler { f }
}

#[async_trait]
impl<F, Fut> RouteHandler for FnHandler<F>
where
    F: Fn(RequestContext, bool) -> Fut + Send + Sync,
    Fut: Future<Output = Result<HandlerOutput, RouteError>> + Send,
{
    async fn handle(
        &self,
        ctx: &RequestContext,
        no_cache: bool,
    ) -> Result<HandlerOutput, RouteError> {
        (self.f)(ctx.clone(), no_cache).await
    }
}
