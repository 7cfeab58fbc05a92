use std::net::SocketAddr;

use hotlist_fetch::FetchStatsSnapshot;
use hotlist_http::{Body, JsonStyle, error_response, json_response, not_found, status_for, success};
use hotlist_router::{RequestContext, RouteInfo};
use http::header::CACHE_CONTROL;
use http::{HeaderMap, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};

use crate::AppState;

#[derive(Serialize)]
struct Listing<'a> {
    code: u16,
    message: &'a str,
    count: usize,
    routes: Vec<RouteInfo>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CacheView {
    backend: &'static str,
    in_flight: usize,
    #[serde(flatten)]
    stats: FetchStatsSnapshot,
}

/// Bypass is requested with `noCache=true|1` or `Cache-Control: no-cache`.
pub(crate) fn wants_fresh(ctx: &RequestContext, headers: &HeaderMap) -> bool {
    ctx.flag("noCache")
        || headers
            .get_all(CACHE_CONTROL)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .any(|directive| directive.trim().eq_ignore_ascii_case("no-cache"))
}

pub(crate) async fn source(
    state: &AppState,
    key: &str,
    ctx: &RequestContext,
    headers: &HeaderMap,
    style: JsonStyle,
) -> hyper::Response<Body> {
    let no_cache = wants_fresh(ctx, headers);

    match state.registry().dispatch(key, ctx, no_cache).await {
        Ok(data) => {
            debug!(
                target: "hotlist::worker",
                source = %key,
                total = data.total(),
                from_cache = data.from_cache(),
                "Source served"
            );
            success(&data, style)
        }
        Err(err) => {
            let status = status_for(&err);
            if status.is_server_error() {
                warn!(target: "hotlist::worker", source = %key, status = status.as_u16(), error = %err, "Source failed");
            } else {
                debug!(target: "hotlist::worker", source = %key, error = %err, "Source not served");
            }
            error_response(status, &err.to_string(), style)
        }
    }
}

pub(crate) fn listing(state: &AppState, style: JsonStyle) -> hyper::Response<Body> {
    let routes = state.registry().routes();
    json_response(
        StatusCode::OK,
        &Listing {
            code: StatusCode::OK.as_u16(),
            message: "success",
            count: routes.len(),
            routes,
        },
        style,
    )
}

/// Loopback clients get the fetch counters; everybody else a plain 404.
pub(crate) fn cache_stats(
    state: &AppState,
    client_addr: SocketAddr,
    path: &str,
    style: JsonStyle,
) -> hyper::Response<Body> {
    if !client_addr.ip().is_loopback() {
        return not_found(path, style);
    }
    let fetcher = state.fetcher();
    let view = CacheView {
        backend: fetcher.store().backend(),
        in_flight: fetcher.in_flight(),
        stats: fetcher.stats().snapshot(),
    };
    success(&view, style)
}
