//! reqwest-backed transport.
//!
//! Provides a wrapper around reqwest with:
//! - Query-string or form-body encoding of request data per verb
//! - Persistent basic authentication
//! - Configurable timeouts and user-agent
//! - Mapping of reqwest failures onto transport error codes

use super::transport::{codes, RawResponse, Transport, TransportError};
use crate::config::NetworkConfig;
use crate::models::{to_param_pairs, BasicAuthCredentials, Headers, Method, RequestData};
use crate::{CourierError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use std::error::Error as StdError;
use std::sync::RwLock;
use std::time::Duration;
use tracing::{debug, info};

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// HTTP transport built on a shared reqwest client.
pub struct ReqwestTransport {
    client: Client,
    credentials: RwLock<Option<BasicAuthCredentials>>,
    /// Default timeout for requests.
    default_timeout: Duration,
}

impl ReqwestTransport {
    /// Create a transport with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_timeout(NetworkConfig::REQUEST_TIMEOUT)
    }

    /// Create a transport with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(NetworkConfig::CONNECT_TIMEOUT.min(timeout))
            .user_agent(NetworkConfig::USER_AGENT)
            .build()
            .map_err(|e| CourierError::Config {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            credentials: RwLock::new(None),
            default_timeout: timeout,
        })
    }

    /// Get a reference to the underlying reqwest client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    pub fn timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Credentials currently attached to outgoing requests.
    pub fn credentials(&self) -> Option<BasicAuthCredentials> {
        match self.credentials.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn build_request(
        &self,
        method: Method,
        url: &str,
        data: &RequestData,
        headers: &Headers,
    ) -> std::result::Result<RequestBuilder, TransportError> {
        let parsed = url::Url::parse(url).map_err(|e| {
            TransportError::new(format!("Malformed URL {}: {}", url, e), codes::URL_MALFORMAT)
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TransportError::new(
                format!("Protocol \"{}\" not supported", parsed.scheme()),
                codes::UNSUPPORTED_PROTOCOL,
            ));
        }

        let mut request = self.client.request(method.into(), parsed);

        if !data.is_empty() {
            let pairs = to_param_pairs(data);
            request = if method.sends_data_as_query() {
                request.query(&pairs)
            } else {
                request.form(&pairs)
            };
        }

        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        if let Some(creds) = self.credentials() {
            request = request.basic_auth(creds.username, Some(creds.password));
        }

        Ok(request)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        method: Method,
        url: &str,
        data: &RequestData,
        headers: &Headers,
    ) -> std::result::Result<RawResponse, TransportError> {
        let request = self.build_request(method, url, data, headers)?;

        debug!("{} {}", method, url);
        let response = request
            .send()
            .await
            .map_err(|e| classify_error(method, url, &e))?;

        let status = response.status().as_u16();
        let header_lines = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_error(method, url, &e))?;

        debug!("{} {} -> {} ({} bytes)", method, url, status, body.len());

        Ok(RawResponse {
            status,
            headers: header_lines,
            body: body.to_vec(),
        })
    }

    fn set_basic_authentication(&self, username: &str, password: &str) {
        let creds = BasicAuthCredentials::new(username, password);
        match self.credentials.write() {
            Ok(mut guard) => *guard = Some(creds),
            Err(poisoned) => *poisoned.into_inner() = Some(creds),
        }
        info!("Basic authentication set for user {}", username);
    }

    fn unset_basic_authentication(&self) {
        match self.credentials.write() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
        info!("Basic authentication removed");
    }
}

/// Map a reqwest failure onto a transport error code.
fn classify_error(method: Method, url: &str, err: &reqwest::Error) -> TransportError {
    let code = if err.is_timeout() {
        codes::OPERATION_TIMEDOUT
    } else if err.is_connect() {
        if source_chain_mentions(err, "dns") || source_chain_mentions(err, "lookup address") {
            codes::COULDNT_RESOLVE_HOST
        } else {
            codes::COULDNT_CONNECT
        }
    } else if err.is_redirect() {
        codes::TOO_MANY_REDIRECTS
    } else if err.is_builder() {
        codes::URL_MALFORMAT
    } else if err.is_body() || err.is_decode() {
        codes::RECV_ERROR
    } else if err.is_request() {
        codes::SEND_ERROR
    } else {
        codes::GENERIC
    };

    TransportError::new(format!("{} {} failed: {}", method, url, err), code)
}

fn source_chain_mentions(err: &reqwest::Error, needle: &str) -> bool {
    let mut source = err.source();
    while let Some(inner) = source {
        if inner.to_string().to_lowercase().contains(needle) {
            return true;
        }
        source = inner.source();
    }
    false
}
