//! Transport: the master owns the listener and connection permits, the
//! worker turns each HTTP request into a registry dispatch.

pub mod master;
mod state;
pub mod worker;

pub use master::Master;
pub use state::AppState;
