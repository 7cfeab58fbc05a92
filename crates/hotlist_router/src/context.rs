use std::collections::HashMap;

/// Per-request inputs a handler may read.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    query: HashMap<String, String>,
}

impl RequestContext {
    /// Parses a raw query string (`type=realtime&noCache=true`). Later
    /// duplicates win.
    pub fn from_query(raw: &str) -> Self {
        let query = url::form_urlencoded::parse(raw.trim_start_matches('?').as_bytes())
            .into_owned()
            .collect();
        Self { query }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            query: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Query parameter value; empty values read as absent.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Whether `name` was given at all, with or without a value (`?pretty`).
    pub fn contains(&self, name: &str) -> bool {
        self.query.contains_key(name)
    }

    /// Boolean flag: `true`/`1`/`yes` (any case) are true, anything else false.
    pub fn flag(&self, name: &str) -> bool {
        self.query(name)
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false)
    }
}
