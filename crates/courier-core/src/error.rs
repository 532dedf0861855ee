//! Error types for the courier.
//!
//! Two failure kinds come out of the request pipeline and are always
//! distinguishable: [`CourierError::Request`] when the exchange never completed,
//! and [`CourierError::HttpStatus`] when it completed with an error status.
//! The remaining variants cover the cache backends and construction.

use crate::models::Response;
use crate::network::TransportError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for courier operations.
#[derive(Debug, Error)]
pub enum CourierError {
    /// The transport could not complete the exchange (resolve, connect, timeout, ...).
    #[error("Request failed ({code}): {message}")]
    Request { message: String, code: u32 },

    /// The exchange completed but the server answered with a status >= 400.
    #[error("HTTP {code} {message}")]
    HttpStatus {
        response: Box<Response>,
        message: String,
        code: u16,
    },

    // Cache errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias for courier operations.
pub type Result<T> = std::result::Result<T, CourierError>;

impl From<TransportError> for CourierError {
    fn from(err: TransportError) -> Self {
        CourierError::Request {
            message: err.message,
            code: err.code,
        }
    }
}

impl From<std::io::Error> for CourierError {
    fn from(err: std::io::Error) -> Self {
        CourierError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for CourierError {
    fn from(err: serde_json::Error) -> Self {
        CourierError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for CourierError {
    fn from(err: rusqlite::Error) -> Self {
        CourierError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl CourierError {
    /// Build an HTTP status failure from a completed response.
    pub fn http_status(response: Response) -> Self {
        CourierError::HttpStatus {
            message: response.http_message().to_string(),
            code: response.http_code(),
            response: Box::new(response),
        }
    }

    /// Check if the exchange never completed.
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, CourierError::Request { .. })
    }

    /// Check if the exchange completed with an error status.
    pub fn is_http_status_failure(&self) -> bool {
        matches!(self, CourierError::HttpStatus { .. })
    }

    /// HTTP status code of a failed response, if any.
    pub fn http_code(&self) -> Option<u16> {
        match self {
            CourierError::HttpStatus { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// The failed response, if the server answered at all.
    pub fn response(&self) -> Option<&Response> {
        match self {
            CourierError::HttpStatus { response, .. } => Some(response),
            _ => None,
        }
    }

    /// Transport error code of a request failure.
    pub fn transport_code(&self) -> Option<u32> {
        match self {
            CourierError::Request { code, .. } => Some(*code),
            _ => None,
        }
    }
}
