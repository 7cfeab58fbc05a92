//! Per-request handler.
//!
//! Applies the method guard, resolves the path and dispatches into the
//! registry. Every response carries the CORS headers; JSON bodies honour
//! `?pretty` and are compressed when the client accepts gzip or deflate.

use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Instant};

use bytes::Bytes;
use hotlist_http::{
    Body, ContentCoding, JsonStyle, compress, method_not_allowed, no_content, not_found,
};
use hotlist_router::RequestContext;
use http::header::{CONTENT_LENGTH, HeaderValue, ORIGIN};
use http::{Method, Request, Response};
use http_body_util::Full;
use hyper::body::Body as _;
use tracing::{debug, instrument};

use crate::AppState;

mod dispatch;
mod routing;

use routing::{Route, resolve};

pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Serves one request. The request body is ignored.
#[instrument(
    name = "request",
    skip(req, state),
    fields(method = %req.method(), path = %req.uri().path(), client = %client_addr)
)]
pub async fn handle_request<B>(
    req: Request<B>,
    client_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Body>, Infallible> {
    let started = Instant::now();
    let (parts, _body) = req.into_parts();
    let origin = parts
        .headers
        .get(ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let ctx = RequestContext::from_query(parts.uri.query().unwrap_or_default());
    let style = JsonStyle::from_pretty(ctx.contains("pretty"));

    let mut response = match parts.method {
        Method::OPTIONS => {
            let mut response = no_content();
            state
                .cors()
                .apply_preflight(origin.as_deref(), response.headers_mut());
            return Ok(response);
        }
        Method::GET | Method::HEAD => {
            let path = parts.uri.path();
            match resolve(path) {
                Route::Listing => dispatch::listing(&state, style),
                Route::CacheStats => dispatch::cache_stats(&state, client_addr, path, style),
                Route::Source(key) => {
                    dispatch::source(&state, key, &ctx, &parts.headers, style).await
                }
                Route::NotFound => not_found(path, style),
            }
        }
        _ => method_not_allowed(ALLOWED_METHODS, style),
    };

    state
        .cors()
        .apply(origin.as_deref(), response.headers_mut());
    let mut response = compress(response, ContentCoding::negotiate(&parts.headers)).await;

    // HEAD advertises the length the GET body would have.
    if parts.method == Method::HEAD {
        if let Some(len) = response.body().size_hint().exact() {
            response
                .headers_mut()
                .insert(CONTENT_LENGTH, HeaderValue::from(len));
        }
        *response.body_mut() = Full::new(Bytes::new());
    }

    debug!(
        target: "hotlist::worker",
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Request served"
    );
    Ok(response)
}
