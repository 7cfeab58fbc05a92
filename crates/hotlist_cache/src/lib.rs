//! TTL response cache shared by every source adapter.
//!
//! The store keeps whole entries, checks expiry
//! lazily on read and never talks to the network on behalf of callers.
//! Deduplication of concurrent misses lives one layer up, in `hotlist_fetch`.

pub mod clock;
pub mod entry;
pub mod error;
pub mod key;
pub mod policy;
pub mod redis;
pub mod store;
pub mod sweeper;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use error::CacheError;
pub use key::CacheKey;
pub use policy::CachePolicy;
pub use redis::RedisCacheStore;
pub use store::{CacheStore, MemoryCacheStore};
pub use sweeper::spawn_sweeper;
