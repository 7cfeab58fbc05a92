//! In-flight request bookkeeping.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::{BoxFuture, Shared};

use crate::error::FetchError;
use crate::fetcher::FetchResult;

/// Handle every waiter on one upstream call awaits.
pub(crate) type Flight = Shared<BoxFuture<'static, Result<FetchResult, FetchError>>>;

/// At most one [`Flight`] per key.
pub(crate) type InFlight = Arc<DashMap<String, Flight>>;

/// Removes the key's in-flight slot when the producer task ends, including
/// on panic. Lives inside the spawned task so it drops before waiters wake.
pub(crate) struct FlightGuard {
    in_flight: InFlight,
    key: String,
}

impl FlightGuard {
    pub(crate) fn new(in_flight: InFlight, key: String) -> Self {
        Self { in_flight, key }
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.in_flight.remove(&self.key);
    }
}
