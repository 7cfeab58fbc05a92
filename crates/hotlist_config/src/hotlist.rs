use config::{Config, ConfigError, Environment, File, FileFormat, Source};
use serde::Deserialize;

use crate::validation::{ConfigReport, validate};
use crate::{CacheConfig, GlobalConfig, ServerConfig, SourcesConfig, UpstreamConfig};

pub const DEFAULT_CONFIG_FILE: &str = "hotlist.toml";

// =======================================================
// HOTLIST CONFIG (root)
// =======================================================
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HotlistConfig {
    #[serde(default)]
    pub global: GlobalConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub sources: SourcesConfig,
}

fn environment() -> Environment {
    Environment::with_prefix("HOTLIST")
        .prefix_separator("__")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("sources.disabled")
        .try_parsing(true)
}

impl HotlistConfig {
    pub fn global(&self) -> &GlobalConfig {
        &self.global
    }

    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    pub fn cache(&self) -> &CacheConfig {
        &self.cache
    }

    pub fn upstream(&self) -> &UpstreamConfig {
        &self.upstream
    }

    pub fn sources(&self) -> &SourcesConfig {
        &self.sources
    }

    /// Validate the configuration and return a report of warnings and errors.
    pub fn validate(&self) -> ConfigReport {
        validate(self)
    }

    /// Loads `file_name` (missing file is fine) plus `HOTLIST__*` variables.
    pub fn from_file(file_name: &str) -> Result<Self, ConfigError> {
        Self::load(File::new(file_name, FileFormat::Toml).required(false))
    }

    /// Same layering as [`HotlistConfig::from_file`] with inline TOML.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Self::load(File::from_str(raw, FileFormat::Toml))
    }

    fn load<S>(file: S) -> Result<Self, ConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        let built = Config::builder()
            .add_source(file)
            .add_source(environment())
            .build()?;

        let mut cfg: HotlistConfig = built.try_deserialize()?;
        cfg.apply_defaults();
        Ok(cfg)
    }

    pub fn from_file_or_default(file_name: &str) -> Self {
        match Self::from_file(file_name) {
            Ok(cfg) => {
                let report = cfg.validate();
                if report.has_errors() {
                    eprintln!("⚠️  Invalid config in '{file_name}':");
                    eprintln!("{}", report.format());
                    eprintln!("➡️  Using default config(in-memory)...");
                    HotlistConfig::default()
                } else {
                    if !report.warnings().is_empty() {
                        eprintln!("⚠️  Config warnings in '{file_name}':");
                        eprintln!("{}", report.format());
                    }
                    cfg
                }
            }
            Err(e) => {
                eprintln!("⚠️  Error reading config '{file_name}': {e}");
                eprintln!("➡️  Using default config(in-memory)...");
                HotlistConfig::default()
            }
        }
    }

    fn apply_defaults(&mut self) {
        self.global.apply_defaults_from(&GlobalConfig::default());
        self.server.apply_defaults_from(&ServerConfig::default());
        self.cache.apply_defaults_from(&CacheConfig::default());
        self.upstream.apply_defaults_from(&UpstreamConfig::default());
    }

    pub fn print(&self) {
        println!("=============== HOTLIST CONFIG ===============");
        println!("\n[global]");
        println!("  log_level            = {}", self.global.log_level);

        println!("\n[server]");
        println!("  listen               = {}", self.server.listen);
        println!("  max_connections      = {}", self.server.max_connections);
        println!("  allowed_domain       = {}", self.server.allowed_domain);
        println!("  allowed_host         = {:?}", self.server.allowed_host);

        println!("\n[cache]");
        println!("  backend              = {}", self.cache.backend);
        println!("  default_ttl_secs     = {}", self.cache.default_ttl_secs);
        println!("  sweep_interval_secs  = {}", self.cache.sweep_interval_secs);
        if self.cache.backend == crate::CacheBackend::Redis {
            println!("  redis_url            = {}", self.cache.redis_url);
        }

        println!("\n[upstream]");
        println!("  request_timeout_ms   = {}", self.upstream.request_timeout_ms);
        println!("  user_agent           = {}", self.upstream.user_agent);

        println!("\n[sources]");
        println!("  disabled             = {:?}", self.sources.disabled);
        println!("==============================================");
    }
}
