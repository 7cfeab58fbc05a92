//! Text clean-up shared by the HTML and feed based adapters.

use std::sync::LazyLock;

use chrono::DateTime;
use regex::{Captures, Regex};

use crate::error::ParseError;

type Pattern = LazyLock<Result<Regex, regex::Error>>;

static TAGS: Pattern = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>"));
static ENTITIES: Pattern = LazyLock::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);"));
static SPACES: Pattern = LazyLock::new(|| Regex::new(r"\s+"));
static CDATA: Pattern = LazyLock::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>"));

pub(crate) fn compiled(pattern: &'static Pattern) -> Result<&'static Regex, ParseError> {
    pattern.as_ref().map_err(|e| ParseError::Pattern(e.clone()))
}

/// Unwraps `<![CDATA[...]]>` sections, keeping their content verbatim.
pub(crate) fn unwrap_cdata(raw: &str) -> Result<String, ParseError> {
    Ok(compiled(&CDATA)?.replace_all(raw, "$1").into_owned())
}

pub(crate) fn decode_entities(raw: &str) -> Result<String, ParseError> {
    let decoded = compiled(&ENTITIES)?.replace_all(raw, |caps: &Captures<'_>| {
        let name = &caps[1];
        let decoded = match name {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some(' '),
            _ => name
                .strip_prefix("#x")
                .or_else(|| name.strip_prefix("#X"))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| name.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };
        decoded.map_or_else(|| caps[0].to_string(), String::from)
    });
    Ok(decoded.into_owned())
}

/// Plain text out of an HTML fragment: tags removed, entities decoded,
/// whitespace collapsed.
pub(crate) fn strip_html(html: &str) -> Result<String, ParseError> {
    let without_tags = compiled(&TAGS)?.replace_all(html, " ");
    let decoded = decode_entities(&without_tags)?;
    Ok(compiled(&SPACES)?.replace_all(&decoded, " ").trim().to_string())
}

/// `None` for missing or blank strings, trimmed otherwise.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// First `max` characters of `text`.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Milliseconds since the epoch for an RFC 3339 or RFC 2822 date.
pub(crate) fn timestamp_ms(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .ok()
        .map(|dt| dt.timestamp_millis())
}
