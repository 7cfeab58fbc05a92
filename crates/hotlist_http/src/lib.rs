//! HTTP surface helpers: JSON envelopes, error statuses, CORS and response
//! compression.

mod compress;
mod cors;
mod responses;
mod status;

pub use compress::{ContentCoding, MIN_COMPRESS_LEN, compress};
pub use cors::CorsPolicy;
pub use responses::{
    Body, JsonStyle, error_response, json_response, method_not_allowed, no_content, not_found, success,
};
pub use status::status_for;
