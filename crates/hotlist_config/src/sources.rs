use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Source keys that are not registered at startup.
    pub disabled: Vec<String>,
}

impl SourcesConfig {
    pub fn disabled(&self) -> &[String] {
        &self.disabled
    }

    pub fn is_disabled(&self, key: &str) -> bool {
        self.disabled.iter().any(|d| d == key)
    }
}
