//! Trending statuses on mastodon.social.

use std::time::Duration;

use async_trait::async_trait;
use hotlist_cache::CacheKey;
use hotlist_fetch::UpstreamRequest;
use hotlist_router::{HandlerOutput, ListItem, RequestContext, RouteError, RouteHandler, RouteMeta};
use serde::Deserialize;

use crate::MAX_ITEMS;
use crate::context::SourceContext;
use crate::error::ParseError;
use crate::payload::{RawId, json_list};
use crate::text::{non_empty, strip_html, timestamp_ms, truncate_chars};

pub const NAME: &str = "mastodon";
pub const TTL: Duration = Duration::from_secs(1800);

const TITLE_CHARS: usize = 100;
const UNTITLED: &str = "无标题";

#[derive(Debug, Deserialize)]
struct Status {
    id: Option<RawId>,
    /// HTML.
    content: Option<String>,
    account: Option<Account>,
    favourites_count: Option<i64>,
    reblogs_count: Option<i64>,
    created_at: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Account {
    display_name: Option<String>,
    username: Option<String>,
}

pub fn parse(body: &[u8]) -> Result<Vec<ListItem>, ParseError> {
    let statuses: Vec<Status> = json_list(body)?;
    let mut items = Vec::with_capacity(statuses.len().min(MAX_ITEMS));

    for (index, s) in statuses.into_iter().take(MAX_ITEMS).enumerate() {
        let text = strip_html(s.content.as_deref().unwrap_or_default())?;
        let title = match truncate_chars(&text, TITLE_CHARS) {
            t if t.is_empty() => UNTITLED.to_string(),
            t => t,
        };

        let mut item = ListItem::new(
            RawId::or_position(s.id, index),
            title,
            s.url.unwrap_or_default(),
        );
        item.desc = non_empty(Some(text));
        item.author = s
            .account
            .and_then(|a| non_empty(a.display_name).or_else(|| non_empty(a.username)));
        item.hot = match (s.favourites_count, s.reblogs_count) {
            (None, None) => None,
            (f, r) => Some(f.unwrap_or(0) + r.unwrap_or(0)),
        };
        item.timestamp = s.created_at.as_deref().and_then(timestamp_ms);
        items.push(item);
    }
    Ok(items)
}

fn meta() -> RouteMeta {
    RouteMeta::new(NAME, "Mastodon", "趋势", "https://mastodon.social/explore")
        .description("Mastodon 社交网络趋势")
}

pub struct Mastodon {
    ctx: SourceContext,
}

impl Mastodon {
    pub fn new(ctx: SourceContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl RouteHandler for Mastodon {
    async fn handle(&self, _req: &RequestContext, no_cache: bool) -> Result<HandlerOutput, RouteError> {
        let key = CacheKey::source(NAME).with("trends").build();
        let url = format!("https://mastodon.social/api/v1/trends/statuses?limit={MAX_ITEMS}");
        let fetched = self
            .ctx
            .fetch(&key, UpstreamRequest::get(url), Some(TTL), no_cache)
            .await?;
        let items = parse(&fetched.data).map_err(|e| RouteError::malformed(NAME, e))?;
        Ok(HandlerOutput::new(meta(), &fetched, items))
    }
}

#[cfg(test)]
mod tests {
    use super::{UNTITLED, parse};
    use hotlist_router::ItemId;

    #[test]
    fn strips_markup_and_sums_engagement() {
        let body = br#"[
            {"id":"111","content":"<p>Hello <a href=\"https://x\">#rust</a>&nbsp;world</p>",
             "account":{"display_name":"","username":"ferris"},
             "favourites_count":10,"reblogs_count":5,
             "created_at":"2024-01-02T03:04:05.000Z","url":"https://mastodon.social/@ferris/111"},
            {"id":"112","content":"<p></p>","account":{"display_name":"Crab"}}
        ]"#;
        let items = parse(body).unwrap();

        assert_eq!(items[0].id, ItemId::Text("111".into()));
        assert_eq!(items[0].title, "Hello #rust world");
        assert_eq!(items[0].desc.as_deref(), Some("Hello #rust world"));
        assert_eq!(items[0].author.as_deref(), Some("ferris"));
        assert_eq!(items[0].hot, Some(15));
        assert_eq!(items[0].timestamp, Some(1_704_164_645_000));

        assert_eq!(items[1].title, UNTITLED);
        assert_eq!(items[1].desc, None);
        assert_eq!(items[1].hot, None);
        assert_eq!(items[1].author.as_deref(), Some("Crab"));
    }

    #[test]
    fn titles_are_truncated() {
        let content = "a".repeat(150);
        let body = format!(r#"[{{"id":"1","content":"{content}"}}]"#);
        let items = parse(body.as_bytes()).unwrap();
        assert_eq!(items[0].title.chars().count(), 100);
        assert_eq!(items[0].desc.as_ref().map(|d| d.len()), Some(150));
    }
}
