//! Product Hunt daily feed.

use std::time::Duration;

use async_trait::async_trait;
use hotlist_cache::CacheKey;
use hotlist_fetch::UpstreamRequest;
use hotlist_router::{HandlerOutput, ListItem, RequestContext, RouteError, RouteHandler, RouteMeta};

use crate::MAX_ITEMS;
use crate::context::SourceContext;
use crate::error::ParseError;
use crate::payload::utf8;
use crate::rss::parse_feed;

pub const NAME: &str = "producthunt";
pub const TTL: Duration = Duration::from_secs(1800);

const FEED_ACCEPT: &str = "application/rss+xml, application/xml, text/xml, */*";

pub fn parse(body: &[u8]) -> Result<Vec<ListItem>, ParseError> {
    Ok(parse_feed(utf8(body)?)?
        .into_iter()
        .take(MAX_ITEMS)
        .enumerate()
        .map(|(index, entry)| entry.into_list_item(index))
        .collect())
}

fn meta() -> RouteMeta {
    RouteMeta::new(NAME, "Product Hunt", "Today", "https://www.producthunt.com/")
        .description("The best new products, every day")
}

pub struct ProductHunt {
    ctx: SourceContext,
}

impl ProductHunt {
    pub fn new(ctx: SourceContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl RouteHandler for ProductHunt {
    async fn handle(&self, _req: &RequestContext, no_cache: bool) -> Result<HandlerOutput, RouteError> {
        let key = CacheKey::source(NAME).with("today").build();
        let fetched = self
            .ctx
            .fetch(
                &key,
                UpstreamRequest::get("https://www.producthunt.com/feed").header("Accept", FEED_ACCEPT),
                Some(TTL),
                no_cache,
            )
            .await?;
        let items = parse(&fetched.data).map_err(|e| RouteError::malformed(NAME, e))?;
        Ok(HandlerOutput::new(meta(), &fetched, items))
    }
}
