use std::io::Write;

use flate2::Compression;
use flate2::write::{DeflateEncoder, GzEncoder};
use http::header::{ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_LENGTH, HeaderMap, HeaderValue, VARY};
use http::{Response, StatusCode};
use http_body_util::{BodyExt, Full};
use tracing::warn;

use crate::responses::Body;

/// Bodies shorter than this are sent as is.
pub const MIN_COMPRESS_LEN: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentCoding {
    Gzip,
    Deflate,
}

impl ContentCoding {
    /// Reads `Accept-Encoding`. gzip wins over deflate; `q=0` refuses a coding.
    pub fn negotiate(headers: &HeaderMap) -> Option<Self> {
        let (mut gzip, mut deflate) = (false, false);
        let offers = headers
            .get_all(ACCEPT_ENCODING)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','));

        for offer in offers {
            let mut params = offer.split(';');
            let name = params.next().map(str::trim).unwrap_or_default();
            let refused = params.any(|p| {
                p.trim()
                    .strip_prefix("q=")
                    .and_then(|q| q.trim().parse::<f32>().ok())
                    .is_some_and(|q| q <= 0.0)
            });
            if refused {
                continue;
            }
            if name.eq_ignore_ascii_case("gzip") {
                gzip = true;
            } else if name.eq_ignore_ascii_case("deflate") {
                deflate = true;
            }
        }

        match (gzip, deflate) {
            (true, _) => Some(ContentCoding::Gzip),
            (false, true) => Some(ContentCoding::Deflate),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContentCoding::Gzip => "gzip",
            ContentCoding::Deflate => "deflate",
        }
    }

    fn encode(self, data: &[u8]) -> std::io::Result<Vec<u8>> {
        match self {
            ContentCoding::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(data)?;
                encoder.finish()
            }
            ContentCoding::Deflate => {
                let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(data)?;
                encoder.finish()
            }
        }
    }
}

/// Encodes the body with `coding` unless it is small, empty or already encoded.
pub async fn compress(response: Response<Body>, coding: Option<ContentCoding>) -> Response<Body> {
    let Some(coding) = coding else {
        return response;
    };
    if response.status() == StatusCode::NO_CONTENT
        || response.headers().contains_key(CONTENT_ENCODING)
    {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(never) => match never {},
    };
    if bytes.len() < MIN_COMPRESS_LEN {
        return Response::from_parts(parts, Full::new(bytes));
    }

    match coding.encode(&bytes) {
        Ok(encoded) => {
            parts
                .headers
                .insert(CONTENT_ENCODING, HeaderValue::from_static(coding.as_str()));
            parts.headers.remove(CONTENT_LENGTH);
            parts
                .headers
                .append(VARY, HeaderValue::from_static("Accept-Encoding"));
            Response::from_parts(parts, Full::new(encoded.into()))
        }
        Err(err) => {
            warn!(target: "hotlist::worker", coding = coding.as_str(), error = %err, "Compression failed; sending identity body");
            Response::from_parts(parts, Full::new(bytes))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use bytes::Bytes;
    use flate2::read::{DeflateDecoder, GzDecoder};
    use http::header::{ACCEPT_ENCODING, CONTENT_ENCODING, HeaderMap, HeaderValue, VARY};
    use http::Response;
    use http_body_util::{BodyExt, Full};
    use pretty_assertions::assert_eq;

    use super::{ContentCoding, MIN_COMPRESS_LEN, compress};

    fn accepting(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn negotiation_prefers_gzip_and_honours_refusals() {
        assert_eq!(ContentCoding::negotiate(&accepting("gzip, deflate, br")), Some(ContentCoding::Gzip));
        assert_eq!(ContentCoding::negotiate(&accepting("deflate")), Some(ContentCoding::Deflate));
        assert_eq!(
            ContentCoding::negotiate(&accepting("gzip;q=0, deflate;q=0.5")),
            Some(ContentCoding::Deflate)
        );
        assert_eq!(ContentCoding::negotiate(&accepting("br, identity")), None);
        assert_eq!(ContentCoding::negotiate(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn large_bodies_are_encoded() {
        let payload = "x".repeat(MIN_COMPRESS_LEN * 4);
        let response = Response::new(Full::new(Bytes::from(payload.clone())));

        let response = compress(response, Some(ContentCoding::Deflate)).await;
        assert_eq!(response.headers()[CONTENT_ENCODING], "deflate");
        assert_eq!(response.headers()[VARY], "Accept-Encoding");

        let encoded = response.into_body().collect().await.unwrap().to_bytes();
        assert!(encoded.len() < payload.len());
        let mut decoded = String::new();
        DeflateDecoder::new(&encoded[..]).read_to_string(&mut decoded).unwrap();
        assert_eq!(decoded, payload);
    }

    #[tokio::test]
    async fn small_bodies_stay_identity() {
        let response = Response::new(Full::new(Bytes::from_static(b"{\"code\":200}")));
        let response = compress(response, Some(ContentCoding::Gzip)).await;
        assert!(response.headers().get(CONTENT_ENCODING).is_none());
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"{\"code\":200}");
    }

    #[tokio::test]
    async fn gzip_round_trips() {
        let payload = "{\"title\":\"热搜\"}".repeat(200);
        let response = compress(
            Response::new(Full::new(Bytes::from(payload.clone()))),
            Some(ContentCoding::Gzip),
        )
        .await;
        let encoded = response.into_body().collect().await.unwrap().to_bytes();
        let mut decoded = String::new();
        GzDecoder::new(&encoded[..]).read_to_string(&mut decoded).unwrap();
        assert_eq!(decoded, payload);
    }
}
