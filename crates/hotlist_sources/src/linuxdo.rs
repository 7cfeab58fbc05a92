//! Linux.do top topics.

use async_trait::async_trait;
use hotlist_cache::CacheKey;
use hotlist_fetch::UpstreamRequest;
use hotlist_router::{
    HandlerOutput, ListItem, RequestContext, RouteError, RouteHandler, RouteMeta, Variant, Variants,
};

use crate::context::SourceContext;
use crate::error::ParseError;
use crate::payload::utf8;
use crate::rss::parse_feed;

pub const NAME: &str = "linuxdo";

pub const PERIODS: Variants = Variants(&[("daily", "日榜"), ("weekly", "周榜"), ("monthly", "月榜")]);
const DEFAULT_PERIOD: &str = "weekly";

const FEED_ACCEPT: &str = "application/rss+xml, application/xml;q=0.9, */*;q=0.8";

pub fn parse(body: &[u8]) -> Result<Vec<ListItem>, ParseError> {
    Ok(parse_feed(utf8(body)?)?
        .into_iter()
        .enumerate()
        .map(|(index, entry)| entry.into_list_item(index))
        .collect())
}

fn meta(period: Variant) -> RouteMeta {
    RouteMeta::new(
        NAME,
        "Linux.do",
        period.label,
        format!("https://linux.do/top/{}", period.key),
    )
    .description("Linux 技术社区热搜")
    .param("period", "榜单周期", PERIODS)
}

pub struct LinuxDo {
    ctx: SourceContext,
}

impl LinuxDo {
    pub fn new(ctx: SourceContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl RouteHandler for LinuxDo {
    async fn handle(&self, req: &RequestContext, no_cache: bool) -> Result<HandlerOutput, RouteError> {
        let period = PERIODS.resolve(req.query("period"), DEFAULT_PERIOD);
        let url = format!("https://linux.do/top.rss?period={}", period.key);
        let key = CacheKey::source(NAME).with(period.key).build();

        let fetched = self
            .ctx
            .fetch(
                &key,
                UpstreamRequest::get(url).header("Accept", FEED_ACCEPT),
                None,
                no_cache,
            )
            .await?;
        let items = parse(&fetched.data).map_err(|e| RouteError::malformed(NAME, e))?;
        Ok(HandlerOutput::new(meta(period), &fetched, items))
    }
}
