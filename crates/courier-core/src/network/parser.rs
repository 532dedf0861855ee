//! Conversion of raw transport results into [`Response`] values.

use super::transport::RawResponse;
use crate::models::{Headers, Response};

/// Turns a raw transport result into a response.
pub trait ResponseParser: Send + Sync {
    fn parse(&self, raw: RawResponse) -> Response;
}

/// Default parser.
///
/// Header names are lower-cased; repeated headers are joined with `", "` in
/// arrival order.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultResponseParser;

impl ResponseParser for DefaultResponseParser {
    fn parse(&self, raw: RawResponse) -> Response {
        let mut headers = Headers::new();
        for (name, value) in raw.headers {
            headers
                .entry(name.to_ascii_lowercase())
                .and_modify(|existing: &mut String| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert(value);
        }

        Response::new(raw.body, headers, raw.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fills_all_fields() {
        let raw = RawResponse {
            status: 404,
            headers: vec![("Content-Type".into(), "text/html".into())],
            body: b"<h1>gone</h1>".to_vec(),
        };

        let response = DefaultResponseParser.parse(raw);
        assert_eq!(response.http_code(), 404);
        assert_eq!(response.http_message(), "Not Found");
        assert_eq!(response.text(), "<h1>gone</h1>");
        assert_eq!(response.headers().get("content-type").unwrap(), "text/html");
    }

    #[test]
    fn test_repeated_headers_joined() {
        let raw = RawResponse {
            status: 200,
            headers: vec![
                ("Set-Cookie".into(), "a=1".into()),
                ("set-cookie".into(), "b=2".into()),
            ],
            body: Vec::new(),
        };

        let response = DefaultResponseParser.parse(raw);
        assert_eq!(response.header("Set-Cookie"), Some("a=1, b=2"));
        assert_eq!(response.headers().len(), 1);
    }
}
