//! Lobsters hottest stories.

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
use crate::text::{non_empty, timestamp_ms};

pub const NAME: &str = "lobsters";
pub const TTL: Duration = Duration::from_secs(1800);

#[derive(Debug, Deserialize)]
struct Story {
    short_id: Option<RawId>,
    title: Option<String>,
    description: Option<String>,
    submitter_user: Option<Submitter>,
    score: Option<i64>,
    created_at: Option<String>,
    url: Option<String>,
    comments_url: Option<String>,
}

/// Older API versions nest the submitter, newer ones send the bare name.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Submitter {
    Name(String),
    User { username: Option<String> },
}

impl Submitter {
    fn into_name(self) -> Option<String> {
        match self {
            Submitter::Name(name) => non_empty(Some(name)),
            Submitter::User { username } => non_empty(username),
        }
    }
}

pub fn parse(body: &[u8]) -> Result<Vec<ListItem>, ParseError> {
    let stories: Vec<Story> = json_list(body)?;
    Ok(stories
        .into_iter()
        .take(MAX_ITEMS)
        .enumerate()
        .map(|(index, s)| {
            // Text posts have no external url; link their discussion instead.
            let url = non_empty(s.url)
                .or_else(|| non_empty(s.comments_url))
                .unwrap_or_default();
            let mut item = ListItem::new(
                RawId::or_position(s.short_id, index),
                s.title.unwrap_or_default(),
                url,
            );
            item.desc = non_empty(s.description);
            item.author = s.submitter_user.and_then(Submitter::into_name);
            item.hot = s.score;
            item.timestamp = s.created_at.as_deref().and_then(timestamp_ms);
            item
        })
        .collect())
}

fn meta() -> RouteMeta {
    RouteMeta::new(NAME, "Lobsters", "热门", "https://lobste.rs/")
        .description("Lobsters 技术社区热门文章")
}

pub struct Lobsters {
    ctx: SourceContext,
}

impl Lobsters {
    pub fn new(ctx: SourceContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl RouteHandler for Lobsters {
    async fn handle(&self, _req: &RequestContext, no_cache: bool) -> Result<HandlerOutput, RouteError> {
        let key = CacheKey::source(NAME).with("hottest").build();
        let fetched = self
            .ctx
            .fetch(
                &key,
                UpstreamRequest::get("https://lobste.rs/hottest.json"),
                Some(TTL),
                no_cache,
            )
            .await?;
        let items = parse(&fetched.data).map_err(|e| RouteError::malformed(NAME, e))?;
        Ok(HandlerOutput::new(meta(), &fetched, items))
    }
}

#[cfg(test)]
mod tests {
    use super::parse;
    use hotlist_router::ItemId;

    #[test]
    fn maps_stories_and_both_submitter_shapes() {
        let body = br#"[
            {"short_id": "abc123", "title": "Tokio 2.0", "score": 57,
             "created_at": "2024-01-02T03:04:05.000-06:00",
             "url": "https://tokio.rs/blog", "comments_url": "https://lobste.rs/s/abc123",
             "submitter_user": "alice", "description": ""},
            {"short_id": "def456", "title": "Ask: editors?", "url": "",
             "comments_url": "https://lobste.rs/s/def456",
             "submitter_user": {"username": "bob"}}
        ]"#;
        let items = parse(body).unwrap();

        assert_eq!(items[0].id, ItemId::Text("abc123".into()));
        assert_eq!(items[0].url, "https://tokio.rs/blog");
        assert_eq!(items[0].author.as_deref(), Some("alice"));
        assert_eq!(items[0].hot, Some(57));
        assert_eq!(items[0].desc, None);
        assert!(items[0].timestamp.is_some());

        assert_eq!(items[1].url, "https://lobste.rs/s/def456");
        assert_eq!(items[1].author.as_deref(), Some("bob"));
    }

    #[test]
    fn caps_the_list() {
        let stories: Vec<String> = (0..40)
            .map(|i| format!(r#"{{"short_id":"s{i}","title":"t{i}","url":"https://x/{i}"}}"#))
            .collect();
        let body = format!("[{}]", stories.join(","));
        let items = parse(body.as_bytes()).unwrap();
        assert_eq!(items.len(), crate::MAX_ITEMS);
        assert_eq!(items[0].title, "t0");
    }
}
