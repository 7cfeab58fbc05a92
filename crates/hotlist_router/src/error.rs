use std::fmt;

use hotlist_fetch::FetchError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum RouteError {
    #[error("unknown source: {0}")]
    UnknownSource(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to parse {name} data: {message}")]
    MalformedPayload { name: String, message: String },
}

impl RouteError {
    pub fn malformed(name: &str, err: impl fmt::Display) -> Self {
        RouteError::MalformedPayload {
            name: name.to_string(),
            message: err.to_string(),
        }
    }
}
