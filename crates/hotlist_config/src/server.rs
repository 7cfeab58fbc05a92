use serde::Deserialize;

// =======================================================
// SERVER CONFIG + DEFAULTS
// =======================================================
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
    /// Concurrent connection permits.
    pub max_connections: usize,
    /// CORS origin sent back to foreign origins.
    pub allowed_domain: String,
    /// Origins ending with this host are echoed back verbatim.
    pub allowed_host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:6688".into(),
            max_connections: 1024,
            allowed_domain: "*".into(),
            allowed_host: String::new(),
        }
    }
}

impl ServerConfig {
    pub fn listen(&self) -> &str {
        &self.listen
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    pub fn allowed_domain(&self) -> &str {
        &self.allowed_domain
    }

    pub fn allowed_host(&self) -> &str {
        &self.allowed_host
    }

    pub(crate) fn apply_defaults_from(&mut self, defaults: &ServerConfig) {
        if self.listen.trim().is_empty() {
            self.listen = defaults.listen.clone();
        }
        if self.max_connections == 0 {
            self.max_connections = defaults.max_connections;
        }
        if self.allowed_domain.trim().is_empty() {
            self.allowed_domain = defaults.allowed_domain.clone();
        }
    }
}
