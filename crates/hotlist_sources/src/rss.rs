//! Minimal RSS 2.0 / Atom reader.
//!
//! Feeds are scanned with patterns rather than a full XML parser: only the
//! handful of per-item fields the adapters show are extracted.

use std::sync::LazyLock;

use hotlist_router::{ItemId, ListItem};
use regex::Regex;

use crate::error::ParseError;
use crate::text::{decode_entities, non_empty, strip_html, timestamp_ms, unwrap_cdata};

/// One `<item>` or `<entry>` of a feed, cleaned to plain text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: Option<String>,
    pub link: Option<String>,
    /// `<guid>` (RSS) or `<id>` (Atom).
    pub id: Option<String>,
    /// Plain-text description or content.
    pub summary: Option<String>,
    pub author: Option<String>,
    /// Milliseconds since the epoch.
    pub published: Option<i64>,
}

struct FeedPatterns {
    item: Regex,
    link_href: Regex,
    title: Regex,
    link: Regex,
    guid: Regex,
    id: Regex,
    description: Regex,
    summary: Regex,
    content: Regex,
    content_encoded: Regex,
    author: Regex,
    creator: Regex,
    pub_date: Regex,
    published: Regex,
    updated: Regex,
}

fn element(name: &str) -> Result<Regex, regex::Error> {
    let name = regex::escape(name);
    Regex::new(&format!(r"(?s)<{name}(?:\s[^>]*)?>(.*?)</{name}>"))
}

impl FeedPatterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            item: Regex::new(r"(?s)<(?:item|entry)(?:\s[^>]*)?>(.*?)</(?:item|entry)>")?,
            link_href: Regex::new(r#"<link\b[^>]*?\bhref\s*=\s*["']([^"']+)["']"#)?,
            title: element("title")?,
            link: element("link")?,
            guid: element("guid")?,
            id: element("id")?,
            description: element("description")?,
            summary: element("summary")?,
            content: element("content")?,
            content_encoded: element("content:encoded")?,
            author: element("author")?,
            creator: element("dc:creator")?,
            pub_date: element("pubDate")?,
            published: element("published")?,
            updated: element("updated")?,
        })
    }
}

static PATTERNS: LazyLock<Result<FeedPatterns, regex::Error>> = LazyLock::new(FeedPatterns::compile);

fn raw<'a>(pattern: &Regex, body: &'a str) -> Option<&'a str> {
    pattern
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Plain value of a simple element: CDATA unwrapped, entities decoded.
fn value(pattern: &Regex, body: &str) -> Result<Option<String>, ParseError> {
    match raw(pattern, body) {
        Some(text) => Ok(non_empty(Some(decode_entities(&unwrap_cdata(text)?)?))),
        None => Ok(None),
    }
}

/// Like [`value`] but for fields that may carry markup.
fn text(pattern: &Regex, body: &str) -> Result<Option<String>, ParseError> {
    match raw(pattern, body) {
        Some(html) => {
            let html = decode_entities(&unwrap_cdata(html)?)?;
            Ok(non_empty(Some(strip_html(&html)?)))
        }
        None => Ok(None),
    }
}

type Reader = fn(&Regex, &str) -> Result<Option<String>, ParseError>;

fn first_of(patterns: &[&Regex], body: &str, read: Reader) -> Result<Option<String>, ParseError> {
    for pattern in patterns {
        if let Some(found) = read(pattern, body)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

/// Items of an RSS 2.0 or Atom document in feed order. A document without
/// items yields an empty list.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedItem>, ParseError> {
    let p = PATTERNS.as_ref().map_err(|e| ParseError::Pattern(e.clone()))?;

    let mut items = Vec::new();
    for caps in p.item.captures_iter(xml) {
        let body = caps.get(1).map_or("", |m| m.as_str());

        let link = match value(&p.link, body)? {
            Some(link) => Some(link),
            None => raw(&p.link_href, body).map(|href| href.replace("&amp;", "&")),
        };

        items.push(FeedItem {
            title: text(&p.title, body)?,
            link,
            id: first_of(&[&p.guid, &p.id], body, value)?,
            summary: first_of(
                &[&p.description, &p.summary, &p.content_encoded, &p.content],
                body,
                text,
            )?,
            author: first_of(&[&p.author, &p.creator], body, text)?,
            published: first_of(&[&p.pub_date, &p.published, &p.updated], body, value)?
                .as_deref()
                .and_then(timestamp_ms),
        });
    }
    Ok(items)
}

impl FeedItem {
    /// List item for the entry at `position`. The id is the feed's own id,
    /// then the link, then the position.
    pub fn into_list_item(self, position: usize) -> ListItem {
        let link = self.link.unwrap_or_default();
        let id = match self.id {
            Some(id) => ItemId::Text(id),
            None if !link.is_empty() => ItemId::Text(link.clone()),
            None => ItemId::from(position),
        };

        let mut item = ListItem::new(id, self.title.unwrap_or_default(), link);
        item.desc = self.summary;
        item.author = self.author;
        item.timestamp = self.published;
        item
    }
}

#[cfg(test)]
mod tests {
    use super::parse_feed;
    use hotlist_router::ItemId;
    use pretty_assertions::assert_eq;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>BBC News - World</title>
    <item>
      <title><![CDATA[Talks resume in Geneva]]></title>
      <description><![CDATA[<p>Delegates met again &amp; agreed.</p>]]></description>
      <link>https://www.bbc.co.uk/news/world-1</link>
      <guid isPermaLink="false">https://www.bbc.co.uk/news/world-1#0</guid>
      <pubDate>Tue, 02 Jan 2024 03:04:05 GMT</pubDate>
      <dc:creator>Jane Doe</dc:creator>
    </item>
    <item>
      <title>Second &amp; last</title>
      <link>https://www.bbc.co.uk/news/world-2</link>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Product Hunt</title>
  <entry>
    <id>tag:www.producthunt.com,2005:Post/1</id>
    <published>2024-01-02T03:04:05-08:00</published>
    <title>Widget</title>
    <content type="html">&lt;p&gt;A tiny widget&lt;/p&gt;</content>
    <link rel="alternate" type="text/html" href="https://www.producthunt.com/posts/widget?a=1&amp;b=2"/>
    <author><name>Sam</name></author>
  </entry>
</feed>"#;

    #[test]
    fn reads_rss_items_in_order() {
        let items = parse_feed(RSS).unwrap();
        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.title.as_deref(), Some("Talks resume in Geneva"));
        assert_eq!(first.summary.as_deref(), Some("Delegates met again & agreed."));
        assert_eq!(first.link.as_deref(), Some("https://www.bbc.co.uk/news/world-1"));
        assert_eq!(first.id.as_deref(), Some("https://www.bbc.co.uk/news/world-1#0"));
        assert_eq!(first.author.as_deref(), Some("Jane Doe"));
        assert_eq!(first.published, Some(1_704_164_645_000));

        let second = &items[1];
        assert_eq!(second.title.as_deref(), Some("Second & last"));
        assert_eq!(second.summary, None);
        assert_eq!(second.published, None);
    }

    #[test]
    fn reads_atom_entries() {
        let items = parse_feed(ATOM).unwrap();
        assert_eq!(items.len(), 1);

        let entry = &items[0];
        assert_eq!(entry.title.as_deref(), Some("Widget"));
        assert_eq!(entry.summary.as_deref(), Some("A tiny widget"));
        assert_eq!(
            entry.link.as_deref(),
            Some("https://www.producthunt.com/posts/widget?a=1&b=2")
        );
        assert_eq!(entry.id.as_deref(), Some("tag:www.producthunt.com,2005:Post/1"));
        assert_eq!(entry.author.as_deref(), Some("Sam"));
        assert!(entry.published.is_some());
    }

    #[test]
    fn list_items_fall_back_to_link_then_position() {
        let items = parse_feed(RSS).unwrap();
        let second = items[1].clone().into_list_item(1);
        assert_eq!(second.id, ItemId::Text("https://www.bbc.co.uk/news/world-2".into()));
        assert_eq!(second.mobile_url, second.url);

        let bare = super::FeedItem::default().into_list_item(4);
        assert_eq!(bare.id, ItemId::Num(4));
    }

    #[test]
    fn documents_without_items_are_empty() {
        assert!(parse_feed("<html><body>maintenance</body></html>").unwrap().is_empty());
    }
}
