use std::{collections::HashSet, net::SocketAddr};

use crate::{CacheBackend, HotlistConfig};

/// Validation output for a loaded configuration.
#[derive(Debug, Default)]
pub struct ConfigReport {
    warnings: Vec<String>,
    errors: Vec<String>,
}

impl ConfigReport {
    /// Returns true when no errors were found.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Render warnings and errors into a readable, multi-line string.
    pub fn format(&self) -> String {
        let mut out = String::new();
        if !self.errors.is_empty() {
            out.push_str("Errors:\n");
            for err in &self.errors {
                out.push_str("  - ");
                out.push_str(err);
                out.push('\n');
            }
        }
        if !self.warnings.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str("Warnings:\n");
            for warn in &self.warnings {
                out.push_str("  - ");
                out.push_str(warn);
                out.push('\n');
            }
        }
        out
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }
}

pub fn validate(cfg: &HotlistConfig) -> ConfigReport {
    let mut report = ConfigReport::default();

    validate_server(cfg, &mut report);
    validate_cache(cfg, &mut report);
    validate_upstream(cfg, &mut report);
    validate_sources(cfg, &mut report);

    report
}

fn validate_server(cfg: &HotlistConfig, report: &mut ConfigReport) {
    let listen = cfg.server.listen.trim();
    if listen.is_empty() {
        report.error("server.listen is empty");
    } else if listen.parse::<SocketAddr>().is_err() {
        report.error(format!(
            "server.listen '{listen}' is not a socket address (expected host:port)"
        ));
    }

    if cfg.server.allowed_domain.trim().is_empty() {
        report.warn("server.allowed_domain is empty; browsers will reject cross-origin calls");
    }
}

fn validate_cache(cfg: &HotlistConfig, report: &mut ConfigReport) {
    match cfg.cache.backend {
        CacheBackend::Redis => {
            let url = cfg.cache.redis_url.trim();
            if url.is_empty() {
                report.error("cache.backend is redis but cache.redis_url is empty");
            } else if !["redis://", "rediss://", "unix://", "redis+unix://"]
                .iter()
                .any(|scheme| url.starts_with(scheme))
            {
                report.error(format!("cache.redis_url '{url}' has an unsupported scheme"));
            }
            if cfg.cache.sweep_interval_secs > 0 {
                report.warn("cache.sweep_interval_secs is ignored by the redis backend");
            }
        }
        CacheBackend::Memory => {
            if cfg.cache.sweep_interval_secs == 0 {
                report.warn(
                    "cache.sweep_interval_secs is 0; expired entries are only dropped when read",
                );
            }
        }
    }
}

fn validate_upstream(cfg: &HotlistConfig, report: &mut ConfigReport) {
    if cfg.upstream.request_timeout_ms < 100 {
        report.warn(format!(
            "upstream.request_timeout_ms is {}; most upstreams will time out",
            cfg.upstream.request_timeout_ms
        ));
    }
}

fn validate_sources(cfg: &HotlistConfig, report: &mut ConfigReport) {
    let mut seen = HashSet::new();
    for key in &cfg.sources.disabled {
        if key.trim().is_empty() {
            report.warn("sources.disabled contains an empty entry");
        } else if !seen.insert(key.as_str()) {
            report.warn(format!("sources.disabled lists '{key}' more than once"));
        }
    }
}
