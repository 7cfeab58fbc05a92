use hotlist_cache::CacheError;
use hotlist_fetch::FetchError;
use hotlist_router::RouteError;
use http::StatusCode;

/// HTTP status for a failed dispatch.
pub fn status_for(err: &RouteError) -> StatusCode {
    match err {
        RouteError::UnknownSource(_) => StatusCode::NOT_FOUND,
        RouteError::MalformedPayload { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        RouteError::Fetch(fetch) => match fetch {
            FetchError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            FetchError::Upstream { .. }
            | FetchError::UpstreamStatus { .. }
            | FetchError::Interrupted { .. } => StatusCode::BAD_GATEWAY,
            FetchError::Cache(CacheError::InvalidTtl(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            FetchError::Cache(CacheError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
        },
    }
}
