//! Dev.to top articles.

use std::time::Duration;

use async_trait::async_trait;
use hotlist_cache::CacheKey;
use hotlist_fetch::UpstreamRequest;
use hotlist_router::{
    HandlerOutput, ListItem, RequestContext, RouteError, RouteHandler, RouteMeta, Variant, Variants,
};
use serde::Deserialize;

use crate::context::SourceContext;
use crate::error::ParseError;
use crate::payload::{RawId, json_list};
use crate::text::{non_empty, timestamp_ms};
use crate::MAX_ITEMS;

pub const NAME: &str = "devto";
pub const TTL: Duration = Duration::from_secs(3600);

pub const PERIODS: Variants = Variants(&[
    ("week", "本周热门"),
    ("month", "本月热门"),
    ("year", "年度热门"),
    ("infinity", "全部时间"),
]);
const DEFAULT_PERIOD: &str = "week";

#[derive(Debug, Deserialize)]
struct Article {
    id: Option<RawId>,
    title: Option<String>,
    description: Option<String>,
    cover_image: Option<String>,
    social_image: Option<String>,
    user: Option<Author>,
    public_reactions_count: Option<i64>,
    published_at: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Author {
    name: Option<String>,
    username: Option<String>,
}

/// `top` window in days for a period.
fn top_days(period: &str) -> u32 {
    match period {
        "month" => 30,
        "year" | "infinity" => 365,
        _ => 7,
    }
}

pub fn parse(body: &[u8]) -> Result<Vec<ListItem>, ParseError> {
    let articles: Vec<Article> = json_list(body)?;
    Ok(articles
        .into_iter()
        .take(MAX_ITEMS)
        .enumerate()
        .map(|(index, a)| {
            let url = a.url.unwrap_or_default();
            let mut item = ListItem::new(
                RawId::or_position(a.id, index),
                a.title.unwrap_or_default(),
                url,
            );
            item.desc = non_empty(a.description);
            item.cover = non_empty(a.cover_image).or_else(|| non_empty(a.social_image));
            item.author = a
                .user
                .and_then(|u| non_empty(u.name).or_else(|| non_empty(u.username)));
            item.hot = a.public_reactions_count;
            item.timestamp = a.published_at.as_deref().and_then(timestamp_ms);
            item
        })
        .collect())
}

fn meta(period: Variant) -> RouteMeta {
    RouteMeta::new(NAME, "Dev.to", period.label, "https://dev.to/")
        .description("Dev.to 开发者社区热门文章")
        .param("type", "时间范围", PERIODS)
}

pub struct DevTo {
    ctx: SourceContext,
}

impl DevTo {
    pub fn new(ctx: SourceContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl RouteHandler for DevTo {
    async fn handle(&self, req: &RequestContext, no_cache: bool) -> Result<HandlerOutput, RouteError> {
        let period = PERIODS.resolve(req.query("type"), DEFAULT_PERIOD);
        let url = format!(
            "https://dev.to/api/articles?top={}&per_page={MAX_ITEMS}",
            top_days(period.key)
        );
        let key = CacheKey::source(NAME).with(period.key).build();

        let fetched = self
            .ctx
            .fetch(&key, UpstreamRequest::get(url), Some(TTL), no_cache)
            .await?;
        let items = parse(&fetched.data).map_err(|e| RouteError::malformed(NAME, e))?;
        Ok(HandlerOutput::new(meta(period), &fetched, items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotlist_router::ItemId;
    use pretty_assertions::assert_eq;

    const FIXTURE: &str = r#"[
        {"id": 101, "title": "Async Rust", "description": "Pinning explained",
         "cover_image": null, "social_image": "https://dev.to/social/101.png",
         "user": {"name": "", "username": "ferris"}, "public_reactions_count": 42,
         "published_at": "2024-01-02T03:04:05Z", "url": "https://dev.to/ferris/async"},
        {"id": 102, "title": "Zero cost", "url": "https://dev.to/x/zero"}
    ]"#;

    #[test]
    fn maps_articles() {
        let items = parse(FIXTURE.as_bytes()).unwrap();
        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.id, ItemId::Num(101));
        assert_eq!(first.desc.as_deref(), Some("Pinning explained"));
        assert_eq!(first.cover.as_deref(), Some("https://dev.to/social/101.png"));
        assert_eq!(first.author.as_deref(), Some("ferris"));
        assert_eq!(first.hot, Some(42));
        assert_eq!(first.timestamp, Some(1_704_164_645_000));
        assert_eq!(first.mobile_url, "https://dev.to/ferris/async");

        let second = &items[1];
        assert_eq!(second.desc, None);
        assert_eq!(second.author, None);
        assert_eq!(second.hot, None);
    }

    #[test]
    fn error_objects_yield_no_items() {
        assert!(parse(br#"{"error":"not found","status":404}"#).unwrap().is_empty());
    }

    #[test]
    fn periods_map_to_windows() {
        assert_eq!(top_days("week"), 7);
        assert_eq!(top_days("month"), 30);
        assert_eq!(top_days("infinity"), 365);
    }
}
