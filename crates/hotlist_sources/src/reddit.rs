//! Reddit subreddit hot listings.

use std::time::Duration;

use async_trait::async_trait;
use hotlist_cache::CacheKey;
use hotlist_fetch::UpstreamRequest;
use hotlist_router::{
    HandlerOutput, ListItem, RequestContext, RouteError, RouteHandler, RouteMeta, Variant, Variants,
};
use serde::Deserialize;

use crate::MAX_ITEMS;
use crate::context::SourceContext;
use crate::error::ParseError;
use crate::payload::RawId;
use crate::text::{non_empty, truncate_chars};

pub const NAME: &str = "reddit";
pub const TTL: Duration = Duration::from_secs(1800);

pub const SUBREDDITS: Variants = Variants(&[
    ("popular", "热门"),
    ("programming", "编程"),
    ("technology", "科技"),
    ("webdev", "Web开发"),
    ("javascript", "JavaScript"),
]);
const DEFAULT_SUBREDDIT: &str = "popular";
const DESC_CHARS: usize = 200;

#[derive(Debug, Default, Deserialize)]
struct Listing {
    #[serde(default)]
    data: ListingData,
}

#[derive(Debug, Default, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Option<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    id: Option<RawId>,
    title: Option<String>,
    selftext: Option<String>,
    author: Option<String>,
    ups: Option<i64>,
    /// Seconds since the epoch, sent as a float.
    created_utc: Option<f64>,
    permalink: Option<String>,
}

pub fn parse(body: &[u8]) -> Result<Vec<ListItem>, ParseError> {
    let listing: Listing = serde_json::from_slice(body)?;
    Ok(listing
        .data
        .children
        .into_iter()
        .filter_map(|child| child.data)
        .take(MAX_ITEMS)
        .enumerate()
        .map(|(index, p)| {
            let url = format!("https://reddit.com{}", p.permalink.unwrap_or_default());
            let mut item = ListItem::new(
                RawId::or_position(p.id, index),
                p.title.unwrap_or_default(),
                url,
            );
            item.desc = non_empty(p.selftext).map(|text| truncate_chars(&text, DESC_CHARS));
            item.author = non_empty(p.author);
            item.hot = p.ups;
            item.timestamp = p.created_utc.map(|secs| (secs * 1000.0) as i64);
            item
        })
        .collect())
}

fn meta(sub: Variant) -> RouteMeta {
    RouteMeta::new(
        NAME,
        "Reddit",
        sub.label,
        format!("https://www.reddit.com/r/{}/", sub.key),
    )
    .description("Reddit 热门帖子")
    .param("type", "版块分类", SUBREDDITS)
}

pub struct Reddit {
    ctx: SourceContext,
}

impl Reddit {
    pub fn new(ctx: SourceContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl RouteHandler for Reddit {
    async fn handle(&self, req: &RequestContext, no_cache: bool) -> Result<HandlerOutput, RouteError> {
        let sub = SUBREDDITS.resolve(req.query("type"), DEFAULT_SUBREDDIT);
        let url = format!("https://www.reddit.com/r/{}/hot.json?limit={MAX_ITEMS}", sub.key);
        let key = CacheKey::source(NAME).with(sub.key).build();

        let fetched = self
            .ctx
            .fetch(&key, UpstreamRequest::get(url), Some(TTL), no_cache)
            .await?;
        let items = parse(&fetched.data).map_err(|e| RouteError::malformed(NAME, e))?;
        Ok(HandlerOutput::new(meta(sub), &fetched, items))
    }
}
