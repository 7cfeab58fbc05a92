//! Baidu hot search boards.
//!
//! The board page embeds its data as JSON inside an HTML comment,
//! `<!--s-data:{...}-->`. Two layouts exist: the desktop ("rich") one with
//! cover, description and hot score, and a reduced ("lite") one that only
//! carries the word and a link.

use std::sync::LazyLock;

use async_trait::async_trait;
use hotlist_cache::CacheKey;
use hotlist_fetch::UpstreamRequest;
use hotlist_router::{
    HandlerOutput, ListItem, RequestContext, RouteError, RouteHandler, RouteMeta, Variant, Variants,
};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::context::SourceContext;
use crate::error::ParseError;
use crate::payload::{RawCount, utf8};
use crate::text::{compiled, non_empty};

pub const NAME: &str = "baidu";

pub const BOARDS: Variants = Variants(&[
    ("realtime", "热搜"),
    ("novel", "小说"),
    ("movie", "电影"),
    ("teleplay", "电视剧"),
    ("car", "汽车"),
    ("game", "游戏"),
]);
const DEFAULT_BOARD: &str = "realtime";

const MOBILE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 14_2_1 like Mac OS X) \
AppleWebKit/605.1.15 (KHTML, like Gecko) FxiOS/1.0 Mobile/12F69 Safari/605.1.15";

static S_DATA: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"(?s)<!--s-data:(.*?)-->"));

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RichEntry {
    index: Option<i64>,
    word: Option<String>,
    query: Option<String>,
    raw_url: Option<String>,
    img: Option<String>,
    desc: Option<String>,
    show: Option<Shown>,
    hot_score: Option<RawCount>,
}

/// `show` is a list of badges on some boards and a plain string on others.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Shown {
    Text(String),
    List(Vec<String>),
}

impl Shown {
    fn into_text(self) -> Option<String> {
        match self {
            Shown::Text(text) => non_empty(Some(text)),
            Shown::List(parts) => non_empty(Some(parts.join(" "))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LiteEntry {
    index: Option<i64>,
    word: Option<String>,
    url: Option<String>,
}

/// The board as found in the page.
#[derive(Debug)]
enum Board {
    Rich(Vec<RichEntry>),
    Lite(Vec<LiteEntry>),
    Missing,
}

fn search_url(query: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    format!("https://www.baidu.com/s?wd={encoded}")
}

fn locate(page: &str) -> Result<Board, ParseError> {
    let Some(json) = compiled(&S_DATA)?
        .captures(page)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
    else {
        return Ok(Board::Missing);
    };

    let mut doc: Value = serde_json::from_str(json)?;
    if let Some(list @ Value::Array(_)) = doc.pointer_mut("/data/cards/0/content").map(Value::take) {
        return Ok(Board::Rich(serde_json::from_value(list)?));
    }
    if let Some(list @ Value::Array(_)) = doc.pointer_mut("/cards/0/content/0/content").map(Value::take) {
        return Ok(Board::Lite(serde_json::from_value(list)?));
    }
    Ok(Board::Missing)
}

fn rich_item(position: usize, e: RichEntry) -> ListItem {
    let title = e.word.unwrap_or_default();
    let raw_url = non_empty(e.raw_url);
    let query = non_empty(e.query).or_else(|| non_empty(Some(title.clone())));
    let url = match &query {
        Some(q) => search_url(q),
        None => raw_url.clone().unwrap_or_default(),
    };

    let mut item = ListItem::new(e.index.unwrap_or(position as i64), title, url);
    item.mobile_url = raw_url.unwrap_or_else(|| item.url.clone());
    item.desc = non_empty(e.desc);
    item.cover = non_empty(e.img);
    item.author = e.show.and_then(Shown::into_text);
    item.hot = e.hot_score.as_ref().and_then(RawCount::value);
    item
}

fn lite_item(position: usize, e: LiteEntry) -> ListItem {
    let title = e.word.unwrap_or_default();
    let raw_url = non_empty(e.url);
    let url = match non_empty(Some(title.clone())) {
        Some(q) => search_url(&q),
        None => raw_url.clone().unwrap_or_default(),
    };

    let mut item = ListItem::new(e.index.unwrap_or(position as i64), title, url);
    item.mobile_url = raw_url.unwrap_or_else(|| item.url.clone());
    item
}

/// Items of a board page in page order. A page without the embedded block
/// yields an empty list.
pub fn parse(body: &[u8]) -> Result<Vec<ListItem>, ParseError> {
    let items = match locate(utf8(body)?)? {
        Board::Rich(entries) => entries
            .into_iter()
            .enumerate()
            .map(|(i, e)| rich_item(i, e))
            .collect(),
        Board::Lite(entries) => entries
            .into_iter()
            .enumerate()
            .map(|(i, e)| lite_item(i, e))
            .collect(),
        Board::Missing => Vec::new(),
    };
    Ok(items)
}

fn meta(board: Variant) -> RouteMeta {
    RouteMeta::new(NAME, "百度", board.label, "https://top.baidu.com/board")
        .param("type", "热搜类别", BOARDS)
}

pub struct Baidu {
    ctx: SourceContext,
}

impl Baidu {
    pub fn new(ctx: SourceContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl RouteHandler for Baidu {
    async fn handle(&self, req: &RequestContext, no_cache: bool) -> Result<HandlerOutput, RouteError> {
        let board = BOARDS.resolve(req.query("type"), DEFAULT_BOARD);
        let url = format!("https://top.baidu.com/board?tab={}", board.key);
        let key = CacheKey::source(NAME).with(board.key).build();

        let fetched = self
            .ctx
            .fetch(
                &key,
                UpstreamRequest::get(url).header("User-Agent", MOBILE_UA),
                None,
                no_cache,
            )
            .await?;
        let items = parse(&fetched.data).map_err(|e| RouteError::malformed(NAME, e))?;
        Ok(HandlerOutput::new(meta(board), &fetched, items))
    }
}

#[cfg(test)]
mod tests {
    use super::parse;
    use hotlist_router::ItemId;
    use pretty_assertions::assert_eq;

    const RICH: &str = r#"<html><body><div id="sanRoot"></div>
<!--s-data:{"data":{"cards":[{"component":"hotList","content":[
 {"index":0,"word":"神舟发射","query":"神舟发射","rawUrl":"https://m.baidu.com/s?word=1",
  "img":"https://fyb.bdimg.com/1.jpg","desc":"发射成功","show":[],"hotScore":"4960000"},
 {"index":1,"word":"春节 档","rawUrl":"https://m.baidu.com/s?word=2","hotScore":4800000,
  "show":["新"]}
]}]}}-->
</body></html>"#;

    const LITE: &str = r#"<!--s-data:{"cards":[{"content":[{"content":[
 {"index":3,"word":"天气","url":"https://m.baidu.com/s?word=tq"}
]}]}]}-->"#;

    #[test]
    fn whole_board_is_kept() {
        let entries: Vec<String> = (0..50)
            .map(|i| format!(r#"{{"index":{i},"word":"w{i}","rawUrl":"https://m.baidu.com/{i}"}}"#))
            .collect();
        let page = format!(
            r#"<!--s-data:{{"data":{{"cards":[{{"content":[{}]}}]}}}}-->"#,
            entries.join(",")
        );
        let items = parse(page.as_bytes()).unwrap();
        assert_eq!(items.len(), 50);
        assert_eq!(items[49].title, "w49");
    }

    #[test]
    fn rich_layout() {
        let items = parse(RICH.as_bytes()).unwrap();
        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.id, ItemId::Num(0));
        assert_eq!(first.title, "神舟发射");
        assert_eq!(
            first.url,
            "https://www.baidu.com/s?wd=%E7%A5%9E%E8%88%9F%E5%8F%91%E5%B0%84"
        );
        assert_eq!(first.mobile_url, "https://m.baidu.com/s?word=1");
        assert_eq!(first.cover.as_deref(), Some("https://fyb.bdimg.com/1.jpg"));
        assert_eq!(first.desc.as_deref(), Some("发射成功"));
        assert_eq!(first.author, None);
        assert_eq!(first.hot, Some(4_960_000));
        assert_eq!(first.timestamp, None);

        let second = &items[1];
        assert_eq!(second.url, "https://www.baidu.com/s?wd=%E6%98%A5%E8%8A%82+%E6%A1%A3");
        assert_eq!(second.author.as_deref(), Some("新"));
        assert_eq!(second.hot, Some(4_800_000));
    }

    #[test]
    fn lite_layout() {
        let items = parse(LITE.as_bytes()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, ItemId::Num(3));
        assert_eq!(items[0].mobile_url, "https://m.baidu.com/s?word=tq");
        assert_eq!(items[0].hot, None);
    }

    #[test]
    fn page_without_data_block_is_empty() {
        assert!(parse(b"<html>captcha</html>").unwrap().is_empty());
    }

    #[test]
    fn broken_data_block_is_an_error() {
        assert!(parse(b"<!--s-data:{not json}-->").is_err());
    }
}
