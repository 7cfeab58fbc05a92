//! BBC News section feeds.

use std::time::Duration;

use async_trait::async_trait;
use hotlist_cache::CacheKey;
use hotlist_fetch::UpstreamRequest;
use hotlist_router::{
    HandlerOutput, ListItem, RequestContext, RouteError, RouteHandler, RouteMeta, Variant, Variants,
};

use crate::MAX_ITEMS;
use crate::context::SourceContext;
use crate::error::ParseError;
use crate::payload::utf8;
use crate::rss::parse_feed;

pub const NAME: &str = "bbc";
pub const TTL: Duration = Duration::from_secs(1800);

pub const SECTIONS: Variants = Variants(&[
    ("world", "国际新闻"),
    ("technology", "科技"),
    ("business", "商业"),
    ("science", "科学"),
]);
const DEFAULT_SECTION: &str = "world";
const FALLBACK_AUTHOR: &str = "BBC";

fn feed_url(section: &str) -> &'static str {
    match section {
        "technology" => "https://feeds.bbci.co.uk/news/technology/rss.xml",
        "business" => "https://feeds.bbci.co.uk/news/business/rss.xml",
        "science" => "https://feeds.bbci.co.uk/news/science_and_environment/rss.xml",
        _ => "https://feeds.bbci.co.uk/news/world/rss.xml",
    }
}

pub fn parse(body: &[u8]) -> Result<Vec<ListItem>, ParseError> {
    Ok(parse_feed(utf8(body)?)?
        .into_iter()
        .take(MAX_ITEMS)
        .enumerate()
        .map(|(index, entry)| {
            let mut item = entry.into_list_item(index);
            item.author.get_or_insert_with(|| FALLBACK_AUTHOR.to_string());
            item
        })
        .collect())
}

fn meta(section: Variant) -> RouteMeta {
    RouteMeta::new(NAME, "BBC News", section.label, "https://www.bbc.com/news")
        .description("BBC 新闻")
        .param("type", "新闻分类", SECTIONS)
}

pub struct Bbc {
    ctx: SourceContext,
}

impl Bbc {
    pub fn new(ctx: SourceContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl RouteHandler for Bbc {
    async fn handle(&self, req: &RequestContext, no_cache: bool) -> Result<HandlerOutput, RouteError> {
        let section = SECTIONS.resolve(req.query("type"), DEFAULT_SECTION);
        let key = CacheKey::source(NAME).with(section.key).build();

        let fetched = self
            .ctx
            .fetch(
                &key,
                UpstreamRequest::get(feed_url(section.key)),
                Some(TTL),
                no_cache,
            )
            .await?;
        let items = parse(&fetched.data).map_err(|e| RouteError::malformed(NAME, e))?;
        Ok(HandlerOutput::new(meta(section), &fetched, items))
    }
}
