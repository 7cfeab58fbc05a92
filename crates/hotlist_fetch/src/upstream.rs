//! Producer side of the fetch layer: the actual network call.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, instrument, warn};

use crate::error::FetchError;

/// Default per-request timeout when the caller does not pick one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(6000);

/// A single upstream GET.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
}

impl UpstreamRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets `name` unless the request already carries it (case-insensitive).
    pub fn header_if_missing(mut self, name: &str, value: impl Into<String>) -> Self {
        if !self.headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name)) {
            self.headers.push((name.to_string(), value.into()));
        }
        self
    }
}

/// Anything that can turn an [`UpstreamRequest`] into raw bytes.
///
/// The real implementation is [`HttpUpstream`]; tests plug in fixtures.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn get(&self, req: UpstreamRequest) -> Result<Bytes, FetchError>;
}

/// reqwest-backed upstream client. Cheap to clone; shares one connection pool.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
    user_agent: String,
}

impl HttpUpstream {
    pub fn new(user_agent: impl Into<String>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .gzip(true)
            .build()
            .map_err(|e| FetchError::Upstream {
                url: String::new(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            user_agent: user_agent.into(),
        })
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    #[instrument(skip(self, req), fields(url = %req.url))]
    async fn get(&self, req: UpstreamRequest) -> Result<Bytes, FetchError> {
        let req = req.header_if_missing("User-Agent", self.user_agent.clone());
        let started = Instant::now();

        let mut builder = self.client.get(&req.url).timeout(req.timeout);
        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| map_reqwest_error(&req, e))?;
        let status = response.status();
        if !status.is_success() {
            warn!(
                target: "hotlist::fetch",
                url = %req.url,
                status = status.as_u16(),
                "Upstream answered with non-success status"
            );
            return Err(FetchError::UpstreamStatus {
                url: req.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| map_reqwest_error(&req, e))?;
        debug!(
            target: "hotlist::fetch",
            url = %req.url,
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Upstream request completed"
        );
        Ok(body)
    }
}

fn map_reqwest_error(req: &UpstreamRequest, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::Timeout {
            key: req.url.clone(),
            after: req.timeout,
        };
    }
    FetchError::Upstream {
        url: req.url.clone(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::UpstreamRequest;
    use std::time::Duration;

    #[test]
    fn header_if_missing_keeps_caller_value() {
        let req = UpstreamRequest::get("https://example.com")
            .header("user-agent", "custom")
            .header_if_missing("User-Agent", "default")
            .header_if_missing("Accept", "*/*")
            .timeout(Duration::from_secs(2));

        assert_eq!(
            req.headers,
            vec![
                ("user-agent".to_string(), "custom".to_string()),
                ("Accept".to_string(), "*/*".to_string()),
            ]
        );
        assert_eq!(req.timeout, Duration::from_secs(2));
    }
}
