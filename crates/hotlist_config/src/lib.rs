//! Configuration model for the hot list server.
//!
//! Loaded from `hotlist.toml` (optional) layered with `HOTLIST__*`
//! environment variables; zero/empty values are backfilled from defaults.

mod cache;
mod global;
mod hotlist;
mod server;
mod sources;
mod upstream;
mod validation;

pub use cache::{CacheBackend, CacheConfig};
pub use global::GlobalConfig;
pub use hotlist::{DEFAULT_CONFIG_FILE, HotlistConfig};
pub use server::ServerConfig;
pub use sources::SourcesConfig;
pub use upstream::UpstreamConfig;
pub use validation::{ConfigReport, validate};
