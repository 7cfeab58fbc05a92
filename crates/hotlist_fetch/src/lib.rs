//! Single-flight fetch layer.
//!
//! `Fetcher::fetch` reads through the shared cache store, collapses concurrent
//! misses for one key into a single producer call, and writes successful
//! payloads back with the caller's TTL.

mod error;
mod fetcher;
mod flight;
mod stats;
mod upstream;

pub use error::FetchError;
pub use fetcher::{FetchOptions, FetchResult, Fetcher};
pub use stats::{FetchStats, FetchStatsSnapshot};
pub use upstream::{DEFAULT_TIMEOUT, HttpUpstream, Upstream, UpstreamRequest};
