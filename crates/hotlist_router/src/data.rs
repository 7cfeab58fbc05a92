use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Identifier of a list item. Upstreams use numeric or textual ids; either
/// must stay stable across refreshes of the same item.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum ItemId {
    Num(i64),
    Text(String),
}

impl From<i64> for ItemId {
    fn from(id: i64) -> Self {
        ItemId::Num(id)
    }
}

/// Positions beyond `i64::MAX` fall back to their decimal text.
impl From<usize> for ItemId {
    fn from(id: usize) -> Self {
        i64::try_from(id).map_or_else(|_| ItemId::Text(id.to_string()), ItemId::Num)
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        ItemId::Text(id)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        ItemId::Text(id.to_string())
    }
}

/// One entry of a hot list. Missing fields are omitted, never blanked.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub id: ItemId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hot: Option<i64>,
    /// Milliseconds since the Unix epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    pub url: String,
    pub mobile_url: String,
}

impl ListItem {
    /// Item whose desktop and mobile links are the same.
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>, url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            id: id.into(),
            title: title.into(),
            desc: None,
            cover: None,
            author: None,
            hot: None,
            timestamp: None,
            mobile_url: url.clone(),
            url,
        }
    }
}

/// Closed set of sub-variants a handler accepts, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variants(pub &'static [(&'static str, &'static str)]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variant {
    pub key: &'static str,
    pub label: &'static str,
}

impl Variants {
    pub fn get(&self, key: &str) -> Option<Variant> {
        self.0
            .iter()
            .find(|(k, _)| *k == key)
            .map(|&(key, label)| Variant { key, label })
    }

    /// Requested variant if declared, otherwise `default`.
    pub fn resolve(&self, requested: Option<&str>, default: &'static str) -> Variant {
        requested
            .and_then(|key| self.get(key))
            .or_else(|| self.get(default))
            .unwrap_or(Variant {
                key: default,
                label: default,
            })
    }
}

impl Serialize for Variants {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, label) in self.0 {
            map.serialize_entry(key, label)?;
        }
        map.end()
    }
}

/// Declaration of one query parameter, as shown to clients.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub variants: Variants,
}

/// Static description of a source, filled in by its handler.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMeta {
    pub name: String,
    pub title: String,
    pub type_label: String,
    pub description: Option<String>,
    pub params: BTreeMap<&'static str, ParamSpec>,
    pub link: String,
}

impl RouteMeta {
    pub fn new(name: &str, title: &str, type_label: &str, link: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            type_label: type_label.to_string(),
            description: None,
            params: BTreeMap::new(),
            link: link.into(),
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn param(mut self, key: &'static str, name: &'static str, variants: Variants) -> Self {
        self.params.insert(key, ParamSpec { name, variants });
        self
    }
}

/// The uniform response envelope. Only [`crate::normalize`] builds one, so
/// `total == data.len()` always holds.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterData {
    pub(crate) name: String,
    pub(crate) title: String,
    #[serde(rename = "type")]
    pub(crate) type_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) params: Option<BTreeMap<&'static str, ParamSpec>>,
    pub(crate) link: String,
    pub(crate) total: usize,
    pub(crate) data: Vec<ListItem>,
    pub(crate) update_time: DateTime<Utc>,
    pub(crate) from_cache: bool,
}

impl RouterData {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn type_label(&self) -> &str {
        &self.type_label
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn params(&self) -> Option<&BTreeMap<&'static str, ParamSpec>> {
        self.params.as_ref()
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn data(&self) -> &[ListItem] {
        &self.data
    }

    pub fn update_time(&self) -> DateTime<Utc> {
        self.update_time
    }

    pub fn from_cache(&self) -> bool {
        self.from_cache
    }
}

#[cfg(test)]
mod tests {
    use super::{ItemId, ListItem, Variants};
    use serde_json::json;

    const PERIODS: Variants = Variants(&[("daily", "日榜"), ("weekly", "周榜")]);

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn oversized_positions_do_not_wrap() {
        assert_eq!(ItemId::from(7usize), ItemId::Num(7));
        assert_eq!(ItemId::from(usize::MAX), ItemId::Text(usize::MAX.to_string()));
    }

    #[test]
    fn resolve_falls_back_to_default_for_unknown_keys() {
        assert_eq!(PERIODS.resolve(Some("daily"), "weekly").key, "daily");
        assert_eq!(PERIODS.resolve(Some("hourly"), "weekly").key, "weekly");
        assert_eq!(PERIODS.resolve(None, "weekly").label, "周榜");
    }

    #[test]
    fn variants_serialize_in_declaration_order() {
        let json = serde_json::to_string(&PERIODS).unwrap();
        assert_eq!(json, r#"{"daily":"日榜","weekly":"周榜"}"#);
    }

    #[test]
    fn list_item_omits_absent_fields() {
        let mut item = ListItem::new(7i64, "title", "https://example.com/7");
        item.hot = Some(12);
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 7,
                "title": "title",
                "hot": 12,
                "url": "https://example.com/7",
                "mobileUrl": "https://example.com/7",
            })
        );
    }
}
