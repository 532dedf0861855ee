//! Transport boundary: the component that actually performs the exchange.

use crate::models::{Headers, Method, RequestData};
use async_trait::async_trait;
use thiserror::Error;

/// Transport error codes, numbered as libcurl numbers them.
pub mod codes {
    pub const GENERIC: u32 = 0;
    pub const UNSUPPORTED_PROTOCOL: u32 = 1;
    pub const URL_MALFORMAT: u32 = 3;
    pub const COULDNT_RESOLVE_HOST: u32 = 6;
    pub const COULDNT_CONNECT: u32 = 7;
    pub const OPERATION_TIMEDOUT: u32 = 28;
    pub const TOO_MANY_REDIRECTS: u32 = 47;
    pub const SEND_ERROR: u32 = 55;
    pub const RECV_ERROR: u32 = 56;
}

/// Failure to complete an exchange at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (code {code})")]
pub struct TransportError {
    pub message: String,
    pub code: u32,
}

impl TransportError {
    pub fn new(message: impl Into<String>, code: u32) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }
}

/// Unparsed result of a completed exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Header lines in arrival order; names may repeat.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Sends requests over the wire.
///
/// Implementors own timeouts and connection handling. Basic authentication set
/// here applies to every later request until it is unset.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one exchange.
    async fn send(
        &self,
        method: Method,
        url: &str,
        data: &RequestData,
        headers: &Headers,
    ) -> Result<RawResponse, TransportError>;

    /// Attach basic authentication to all subsequent requests.
    fn set_basic_authentication(&self, username: &str, password: &str);

    /// Stop sending basic authentication.
    fn unset_basic_authentication(&self);

    async fn get(
        &self,
        url: &str,
        data: &RequestData,
        headers: &Headers,
    ) -> Result<RawResponse, TransportError> {
        self.send(Method::Get, url, data, headers).await
    }

    async fn post(
        &self,
        url: &str,
        data: &RequestData,
        headers: &Headers,
    ) -> Result<RawResponse, TransportError> {
        self.send(Method::Post, url, data, headers).await
    }

    async fn put(
        &self,
        url: &str,
        data: &RequestData,
        headers: &Headers,
    ) -> Result<RawResponse, TransportError> {
        self.send(Method::Put, url, data, headers).await
    }

    async fn patch(
        &self,
        url: &str,
        data: &RequestData,
        headers: &Headers,
    ) -> Result<RawResponse, TransportError> {
        self.send(Method::Patch, url, data, headers).await
    }

    async fn delete(
        &self,
        url: &str,
        data: &RequestData,
        headers: &Headers,
    ) -> Result<RawResponse, TransportError> {
        self.send(Method::Delete, url, data, headers).await
    }
}
