//! Source registry and the `RouterData` envelope.
//!
//! The registry is built once at startup and only read afterwards; the
//! transport layer calls [`Registry::dispatch`] for every `/<source>` request.

mod context;
mod data;
mod error;
mod handler;
mod normalize;
mod registry;

pub use context::RequestContext;
pub use data::{ItemId, ListItem, ParamSpec, RouteMeta, RouterData, Variant, Variants};
pub use error::RouteError;
pub use handler::{FnHandler, HandlerOutput, RouteHandler, handler_fn};
pub use normalize::normalize;
pub use registry::{Registry, RegistryBuilder, RouteInfo};
