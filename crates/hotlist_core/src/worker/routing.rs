use tracing::debug;

/// Fetch statistics, served to loopback clients only.
pub(crate) const CACHE_STATS_PATH: &str = "/_hotlist/cache";

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Route<'a> {
    /// `/` and `/all`: every registered source.
    Listing,
    CacheStats,
    /// `/<source>`.
    Source(&'a str),
    NotFound,
}

/// Trailing slashes are ignored: `/baidu/` is `/baidu`.
pub(crate) fn normalize_path(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

pub(crate) fn resolve(path: &str) -> Route<'_> {
    let route = match normalize_path(path) {
        "/" | "/all" => Route::Listing,
        CACHE_STATS_PATH => Route::CacheStats,
        p => match p.strip_prefix('/') {
            Some(key) if !key.is_empty() && !key.contains('/') => Route::Source(key),
            _ => Route::NotFound,
        },
    };

    debug!(target: "hotlist::worker", request_path = %path, ?route, "Resolved route");
    route
}
