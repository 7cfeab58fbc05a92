//! Loose building blocks for typed upstream models.

use hotlist_router::ItemId;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ParseError;

/// Top-level JSON array of `T`. Upstreams answer errors with an object, which
/// reads as an empty list.
pub(crate) fn json_list<T: DeserializeOwned>(bytes: &[u8]) -> Result<Vec<T>, ParseError> {
    match serde_json::from_slice::<Value>(bytes)? {
        value @ Value::Array(_) => Ok(serde_json::from_value(value)?),
        _ => Ok(Vec::new()),
    }
}

pub(crate) fn utf8(bytes: &[u8]) -> Result<&str, ParseError> {
    std::str::from_utf8(bytes).map_err(|_| ParseError::Encoding)
}

/// Identifier an upstream sends either as a number or as a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawId {
    Num(i64),
    Text(String),
}

impl RawId {
    /// The id, or `fallback` when it is an empty string.
    pub(crate) fn or_position(id: Option<RawId>, fallback: usize) -> ItemId {
        match id {
            Some(RawId::Num(n)) => ItemId::Num(n),
            Some(RawId::Text(s)) if !s.trim().is_empty() => ItemId::Text(s),
            _ => ItemId::from(fallback),
        }
    }
}

/// Counter an upstream sends as a number, a float or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawCount {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawCount {
    pub(crate) fn value(&self) -> Option<i64> {
        match self {
            RawCount::Int(n) => Some(*n),
            RawCount::Float(f) => Some(*f as i64),
            RawCount::Text(s) => s.trim().parse().ok(),
        }
    }
}
