use bytes::Bytes;
use http::header::{ALLOW, CONTENT_TYPE, HeaderValue};
use http::{Response, StatusCode};
use http_body_util::Full;
use serde::Serialize;
use tracing::error;

pub type Body = Full<Bytes>;

const JSON: &str = "application/json; charset=utf-8";

#[derive(Serialize)]
struct Success<'a, T: Serialize> {
    code: u16,
    message: &'a str,
    data: &'a T,
}

#[derive(Serialize)]
struct Failure<'a> {
    code: u16,
    message: &'a str,
}

/// Formatting of JSON bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonStyle {
    #[default]
    Compact,
    /// Two-space indentation, requested with `?pretty`.
    Pretty,
}

impl JsonStyle {
    pub fn from_pretty(pretty: bool) -> Self {
        if pretty { JsonStyle::Pretty } else { JsonStyle::Compact }
    }

    fn to_vec<T: Serialize + ?Sized>(self, body: &T) -> serde_json::Result<Vec<u8>> {
        match self {
            JsonStyle::Compact => serde_json::to_vec(body),
            JsonStyle::Pretty => serde_json::to_vec_pretty(body),
        }
    }
}

fn plain(status: StatusCode, body: &'static str) -> Response<Body> {
    let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    response
}

/// Serializes `body` as the response. A body that cannot be serialized turns
/// into a plain 500.
pub fn json_response<T: Serialize + ?Sized>(
    status: StatusCode,
    body: &T,
    style: JsonStyle,
) -> Response<Body> {
    match style.to_vec(body) {
        Ok(bytes) => {
            let mut response = Response::new(Full::new(Bytes::from(bytes)));
            *response.status_mut() = status;
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
            response
        }
        Err(err) => {
            error!(target: "hotlist::worker", error = %err, "Failed to serialize response");
            plain(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error\n")
        }
    }
}

/// `{code: 200, message: "success", data}`.
pub fn success<T: Serialize>(data: &T, style: JsonStyle) -> Response<Body> {
    json_response(
        StatusCode::OK,
        &Success {
            code: StatusCode::OK.as_u16(),
            message: "success",
            data,
        },
        style,
    )
}

/// `{code, message}` with `code` mirroring the HTTP status.
pub fn error_response(status: StatusCode, message: &str, style: JsonStyle) -> Response<Body> {
    json_response(
        status,
        &Failure {
            code: status.as_u16(),
            message,
        },
        style,
    )
}

pub fn not_found(path: &str, style: JsonStyle) -> Response<Body> {
    error_response(StatusCode::NOT_FOUND, &format!("no route for {path}"), style)
}

pub fn method_not_allowed(allow: &'static str, style: JsonStyle) -> Response<Body> {
    let mut response =
        error_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed", style);
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static(allow));
    response
}

pub fn no_content() -> Response<Body> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::NO_CONTENT;
    response
}
