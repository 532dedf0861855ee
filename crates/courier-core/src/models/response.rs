//! Completed HTTP response value.

use super::request::Headers;
use crate::error::{CourierError, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Description used for status codes missing from the registry.
pub const UNKNOWN_STATUS_MESSAGE: &str = "Unknown Status";

/// Look up the standard reason phrase for a status code (404 → "Not Found").
pub fn status_message(code: u16) -> &'static str {
    StatusCode::from_u16(code)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or(UNKNOWN_STATUS_MESSAGE)
}

/// A completed request: body, headers, status code and its description.
///
/// Immutable once built; clones are handed out by the caches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    body: Vec<u8>,
    headers: Headers,
    http_code: u16,
    http_message: String,
}

impl Response {
    /// Build a response, deriving the status description from the code.
    pub fn new(body: Vec<u8>, headers: Headers, http_code: u16) -> Self {
        Self {
            body,
            headers,
            http_code,
            http_message: status_message(http_code).to_string(),
        }
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| CourierError::Json {
            message: format!("Failed to decode response body: {}", e),
            source: Some(e),
        })
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Header value by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn http_code(&self) -> u16 {
        self.http_code
    }

    pub fn http_message(&self) -> &str {
        &self.http_message
    }

    /// Whether the status is below the failure threshold (400).
    pub fn is_success(&self) -> bool {
        self.http_code < 400
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_registry() {
        assert_eq!(status_message(200), "OK");
        assert_eq!(status_message(404), "Not Found");
        assert_eq!(status_message(503), "Service Unavailable");
        assert_eq!(status_message(599), UNKNOWN_STATUS_MESSAGE);
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let mut headers = Headers::new();
        headers.insert("content-type".into(), "application/json".into());
        let response = Response::new(Vec::new(), headers, 200);

        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert_eq!(response.header("x-missing"), None);
    }

    #[test]
    fn test_json_body() {
        let response = Response::new(br#"{"id": 1, "name": "Ada"}"#.to_vec(), Headers::new(), 200);
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["name"], "Ada");

        let broken = Response::new(b"not json".to_vec(), Headers::new(), 200);
        assert!(broken.json::<serde_json::Value>().is_err());
    }

    #[test]
    fn test_success_boundary() {
        assert!(Response::new(Vec::new(), Headers::new(), 399).is_success());
        assert!(!Response::new(Vec::new(), Headers::new(), 400).is_success());
    }
}
