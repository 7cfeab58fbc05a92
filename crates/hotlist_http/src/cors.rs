use http::HeaderValue;
use http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, HeaderMap, VARY,
};

const ALLOW_METHODS: &str = "GET, HEAD, OPTIONS";
const ALLOW_HEADERS: &str = "X-Custom-Header, Upgrade-Insecure-Requests, Authorization, Content-Type";

/// Cross-origin policy: origins ending with `allowed_host` are echoed back,
/// every other origin gets `allowed_domain`.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_domain: String,
    allowed_host: String,
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self::new("*", "")
    }
}

impl CorsPolicy {
    pub fn new(allowed_domain: impl Into<String>, allowed_host: impl Into<String>) -> Self {
        Self {
            allowed_domain: allowed_domain.into(),
            allowed_host: allowed_host.into(),
        }
    }

    pub fn allow_origin<'a>(&'a self, origin: Option<&'a str>) -> &'a str {
        match origin {
            Some(origin) if !self.allowed_host.is_empty() && origin.ends_with(&self.allowed_host) => {
                origin
            }
            _ => &self.allowed_domain,
        }
    }

    /// Adds the CORS headers for a request from `origin`.
    pub fn apply(&self, origin: Option<&str>, headers: &mut HeaderMap) {
        if let Ok(value) = HeaderValue::from_str(self.allow_origin(origin)) {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
        }
        headers.insert(
            ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
        headers.insert(VARY, HeaderValue::from_static("Origin"));
    }

    /// Headers for an `OPTIONS` preflight answer.
    pub fn apply_preflight(&self, origin: Option<&str>, headers: &mut HeaderMap) {
        self.apply(origin, headers);
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::CorsPolicy;
    use http::HeaderMap;
    use http::header::{ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN};

    #[test]
    fn echoes_origins_of_the_allowed_host() {
        let cors = CorsPolicy::new("https://hot.example.com", "example.com");
        assert_eq!(
            cors.allow_origin(Some("https://app.example.com")),
            "https://app.example.com"
        );
        assert_eq!(
            cors.allow_origin(Some("https://evil.test")),
            "https://hot.example.com"
        );
        assert_eq!(cors.allow_origin(None), "https://hot.example.com");
    }

    #[test]
    fn empty_host_never_echoes() {
        let cors = CorsPolicy::default();
        assert_eq!(cors.allow_origin(Some("https://anything.test")), "*");
    }

    #[test]
    fn preflight_adds_methods() {
        let mut headers = HeaderMap::new();
        CorsPolicy::default().apply_preflight(Some("https://a.test"), &mut headers);
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert!(headers.contains_key(ACCESS_CONTROL_ALLOW_METHODS));
    }
}
