//! Per-site adapters.
//!
//! Every adapter fetches through the shared [`hotlist_fetch::Fetcher`] and
//! maps a typed model of the upstream payload into [`hotlist_router::ListItem`]s.
//! Parsing is kept in plain functions so it can be tested on fixtures.

mod context;
mod error;
mod payload;
mod rss;
mod text;

pub mod baidu;
pub mod bbc;
pub mod devto;
pub mod linuxdo;
pub mod lobsters;
pub mod mastodon;
pub mod producthunt;
pub mod reddit;

use std::sync::Arc;

use hotlist_router::{RegistryBuilder, RouteHandler};
use tracing::info;

pub use context::SourceContext;
pub use error::ParseError;
pub use rss::{FeedItem, parse_feed};

/// Item cap for the adapters that trim their feed. Baidu and Linux.do return
/// whole boards.
pub const MAX_ITEMS: usize = 30;

/// Keys of every built-in source.
pub const SOURCES: &[&str] = &[
    baidu::NAME,
    bbc::NAME,
    devto::NAME,
    linuxdo::NAME,
    lobsters::NAME,
    mastodon::NAME,
    producthunt::NAME,
    reddit::NAME,
];

fn handler_for(name: &str, ctx: &SourceContext) -> Option<Arc<dyn RouteHandler>> {
    let handler: Arc<dyn RouteHandler> = match name {
        baidu::NAME => Arc::new(baidu::Baidu::new(ctx.clone())),
        bbc::NAME => Arc::new(bbc::Bbc::new(ctx.clone())),
        devto::NAME => Arc::new(devto::DevTo::new(ctx.clone())),
        linuxdo::NAME => Arc::new(linuxdo::LinuxDo::new(ctx.clone())),
        lobsters::NAME => Arc::new(lobsters::Lobsters::new(ctx.clone())),
        mastodon::NAME => Arc::new(mastodon::Mastodon::new(ctx.clone())),
        producthunt::NAME => Arc::new(producthunt::ProductHunt::new(ctx.clone())),
        reddit::NAME => Arc::new(reddit::Reddit::new(ctx.clone())),
        _ => return None,
    };
    Some(handler)
}

/// Registers every built-in source not listed in `disabled`. Returns how many
/// were registered.
pub fn register_all(builder: &mut RegistryBuilder, ctx: &SourceContext, disabled: &[String]) -> usize {
    let mut registered = 0;
    for name in SOURCES {
        if disabled.iter().any(|d| d.as_str() == *name) {
            info!(target: "hotlist::sources", source = *name, "Source disabled by configuration");
            continue;
        }
        if let Some(handler) = handler_for(name, ctx) {
            builder.register(name, handler);
            registered += 1;
        }
    }
    registered
}
