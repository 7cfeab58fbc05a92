use std::fmt;

/// Builder for colon-separated cache keys.
///
/// Hot lists use `<source>:<discriminant>` (`"devto:week"`). Helper services
/// sharing the store prefix their own domain and may append a feature set,
/// which is sorted so `[b, a]` and `[a, b]` map to the same key:
/// `ai:<source>:<item>:<a,b>`.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct CacheKey {
    parts: Vec<String>,
}

impl CacheKey {
    /// Key for a hot list source.
    pub fn source(source: &str) -> Self {
        Self {
            parts: vec![source.to_string()],
        }
    }

    /// Key in a foreign namespace (`ai`, `translate`, ...).
    pub fn namespaced(domain: &str, source: &str) -> Self {
        Self {
            parts: vec![domain.to_string(), source.to_string()],
        }
    }

    pub fn with(mut self, part: impl fmt::Display) -> Self {
        self.parts.push(part.to_string());
        self
    }

    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut features: Vec<String> = features
            .into_iter()
            .map(|f| f.as_ref().to_string())
            .collect();
        features.sort();
        features.dedup();
        self.parts.push(features.join(","));
        self
    }

    pub fn build(self) -> String {
        self.parts.join(":")
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts.join(":"))
    }
}
