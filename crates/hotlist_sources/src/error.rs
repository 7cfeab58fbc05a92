/// Why an upstream payload could not be turned into list items.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(String),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("payload is not valid UTF-8")]
    Encoding,
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        ParseError::Json(err.to_string())
    }
}
