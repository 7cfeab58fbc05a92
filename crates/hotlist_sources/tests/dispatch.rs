use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use hotlist_cache::{CacheStore, MemoryCacheStore};
use hotlist_fetch::{FetchError, Fetcher, Upstream, UpstreamRequest};
use hotlist_router::{ItemId, Registry, RequestContext, RouteError};
use hotlist_sources::{SOURCES, SourceContext, register_all};
use pretty_assertions::assert_eq;

/// Serves canned bodies by URL prefix and counts requests.
#[derive(Default)]
struct FakeUpstream {
    fixtures: Vec<(&'static str, &'static str)>,
    calls: AtomicUsize,
    seen: Mutex<Vec<UpstreamRequest>>,
    latency: Duration,
}

impl FakeUpstream {
    fn with(mut self, prefix: &'static str, body: &'static str) -> Self {
        self.fixtures.push((prefix, body));
        self
    }

    fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn urls(&self) -> Vec<String> {
        self.seen
            .lock()
            .map(|seen| seen.iter().map(|r| r.url.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Upstream for FakeUpstream {
    async fn get(&self, req: UpstreamRequest) -> Result<Bytes, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let body = self
            .fixtures
            .iter()
            .find(|(prefix, _)| req.url.starts_with(prefix))
            .map(|(_, body)| *body);
        let url = req.url.clone();
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(req);
        }
        match body {
            Some(body) => Ok(Bytes::from_static(body.as_bytes())),
            None => Err(FetchError::UpstreamStatus { url, status: 404 }),
        }
    }
}

const DEVTO_WEEK: &str = r#"[
    {"id": 1, "title": "First", "url": "https://dev.to/a/1", "public_reactions_count": 30},
    {"id": 2, "title": "Second", "url": "https://dev.to/a/2", "public_reactions_count": 20},
    {"id": 3, "title": "Third", "url": "https://dev.to/a/3", "public_reactions_count": 10}
]"#;

const BAIDU_REALTIME: &str = r#"<html><!--s-data:{"data":{"cards":[{"content":[
    {"index":0,"word":"一","rawUrl":"https://m.baidu.com/1","hotScore":"300"},
    {"index":1,"word":"二","rawUrl":"https://m.baidu.com/2","hotScore":"200"}
]}]}}--></html>"#;

struct Harness {
    registry: Registry,
    fetcher: Fetcher,
    upstream: Arc<FakeUpstream>,
    store: Arc<MemoryCacheStore>,
}

fn harness(upstream: FakeUpstream, disabled: &[String]) -> Harness {
    let store = Arc::new(MemoryCacheStore::new());
    let upstream = Arc::new(upstream);
    let fetcher = Fetcher::new(store.clone());
    let ctx = SourceContext::new(fetcher.clone(), upstream.clone());

    let mut builder = Registry::builder();
    register_all(&mut builder, &ctx, disabled);
    Harness {
        registry: builder.build(),
        fetcher,
        upstream,
        store,
    }
}

#[tokio::test]
async fn unknown_source_fails() {
    let h = harness(FakeUpstream::default(), &[]);
    let err = h
        .registry
        .dispatch("unknown-source", &RequestContext::default(), false)
        .await
        .unwrap_err();
    assert!(matches!(err, RouteError::UnknownSource(_)));
    assert_eq!(h.upstream.calls(), 0);
}

#[tokio::test]
async fn baidu_realtime_envelope() {
    let h = harness(
        FakeUpstream::default().with("https://top.baidu.com/board?tab=realtime", BAIDU_REALTIME),
        &[],
    );
    let ctx = RequestContext::from_pairs([("type", "realtime")]);
    let data = h.registry.dispatch("baidu", &ctx, false).await.unwrap();

    assert_eq!(data.name(), "baidu");
    assert_eq!(data.type_label(), "热搜");
    assert_eq!(data.total(), data.data().len());
    assert_eq!(data.total(), 2);
    assert_eq!(data.data()[0].title, "一");
    assert_eq!(data.data()[1].hot, Some(200));
    assert!(data.params().is_some_and(|p| p.contains_key("type")));
}

#[tokio::test]
async fn devto_second_call_is_served_from_cache() {
    let h = harness(
        FakeUpstream::default().with("https://dev.to/api/articles?top=7", DEVTO_WEEK),
        &[],
    );
    let ctx = RequestContext::from_pairs([("type", "week")]);

    let first = h.registry.dispatch("devto", &ctx, false).await.unwrap();
    let second = h.registry.dispatch("devto", &ctx, false).await.unwrap();

    assert_eq!(first.total(), 3);
    assert!(!first.from_cache());
    assert!(second.from_cache());
    assert_eq!(first.update_time(), second.update_time());
    assert_eq!(first.data(), second.data());
    assert_eq!(h.upstream.calls(), 1);

    let entry = h.store.get("devto:week").await.unwrap().unwrap();
    assert_eq!(entry.ttl, Duration::from_secs(3600));
    assert_eq!(entry.stored_at, first.update_time());
}

#[tokio::test]
async fn no_cache_refetches_and_refreshes_the_entry() {
    let h = harness(
        FakeUpstream::default().with("https://dev.to/api/articles", DEVTO_WEEK),
        &[],
    );
    let ctx = RequestContext::default();

    let first = h.registry.dispatch("devto", &ctx, false).await.unwrap();
    let fresh = h.registry.dispatch("devto", &ctx, true).await.unwrap();
    let cached = h.registry.dispatch("devto", &ctx, false).await.unwrap();

    assert!(!fresh.from_cache());
    assert_eq!(h.upstream.calls(), 2);
    assert!(fresh.update_time() >= first.update_time());
    assert!(cached.from_cache());
    assert_eq!(cached.update_time(), fresh.update_time());
}

#[tokio::test]
async fn concurrent_requests_share_one_upstream_call() {
    let h = harness(
        FakeUpstream::default()
            .with("https://dev.to/api/articles", DEVTO_WEEK)
            .with_latency(Duration::from_millis(20)),
        &[],
    );
    let registry = Arc::new(h.registry);

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let registry = registry.clone();
            tokio::spawn(async move {
                registry
                    .dispatch("devto", &RequestContext::default(), false)
                    .await
            })
        })
        .collect();

    let mut updates = HashMap::new();
    for task in tasks {
        let data = task.await.unwrap().unwrap();
        *updates.entry(data.update_time()).or_insert(0) += 1;
    }
    assert_eq!(h.upstream.calls(), 1);
    assert_eq!(updates.len(), 1);
    assert_eq!(h.fetcher.stats().snapshot().joined_in_flight, 15);
}

#[tokio::test]
async fn unknown_variant_uses_default() {
    let h = harness(
        FakeUpstream::default().with("https://dev.to/api/articles", DEVTO_WEEK),
        &[],
    );
    let ctx = RequestContext::from_pairs([("type", "decade")]);
    let data = h.registry.dispatch("devto", &ctx, false).await.unwrap();

    assert_eq!(data.type_label(), "本周热门");
    assert_eq!(
        h.upstream.urls(),
        ["https://dev.to/api/articles?top=7&per_page=30"]
    );
    assert!(h.store.get("devto:week").await.unwrap().is_some());
}

#[tokio::test]
async fn upstream_failure_is_not_cached() {
    let h = harness(FakeUpstream::default(), &[]);
    let ctx = RequestContext::default();

    for _ in 0..2 {
        let err = h.registry.dispatch("lobsters", &ctx, false).await.unwrap_err();
        assert!(matches!(
            err,
            RouteError::Fetch(FetchError::UpstreamStatus { status: 404, .. })
        ));
    }
    assert_eq!(h.upstream.calls(), 2);
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn malformed_payload_is_reported() {
    let h = harness(
        FakeUpstream::default().with("https://lobste.rs/", "<html>oops</html>"),
        &[],
    );
    let err = h
        .registry
        .dispatch("lobsters", &RequestContext::default(), false)
        .await
        .unwrap_err();
    assert!(matches!(err, RouteError::MalformedPayload { ref name, .. } if name == "lobsters"));
}

#[test]
fn disabled_sources_are_skipped() {
    let h = harness(FakeUpstream::default(), &["reddit".to_string()]);
    assert_eq!(h.registry.len(), SOURCES.len() - 1);
    assert!(!h.registry.contains("reddit"));
    assert!(h.registry.contains("devto"));

    let ids: Vec<_> = h.registry.routes().into_iter().map(|r| r.name).collect();
    assert_eq!(ids.first().map(String::as_str), Some("baidu"));
}

#[test]
fn item_ids_are_stable_across_parses() {
    let a = hotlist_sources::devto::parse(DEVTO_WEEK.as_bytes()).unwrap();
    let b = hotlist_sources::devto::parse(DEVTO_WEEK.as_bytes()).unwrap();
    let ids: Vec<&ItemId> = a.iter().map(|i| &i.id).collect();
    assert_eq!(ids, b.iter().map(|i| &i.id).collect::<Vec<_>>());
}
