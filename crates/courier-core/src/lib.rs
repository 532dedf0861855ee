//! Courier - HTTP requests with response caching, basic authentication and typed failures.
//!
//! Every verb goes through one pipeline: cache lookup, transport dispatch,
//! parsing, status classification and cache store. Failures come back as one of
//! two distinguishable kinds:
//! - [`CourierError::Request`]: the exchange never completed (carries message and code)
//! - [`CourierError::HttpStatus`]: the server answered with a status >= 400
//!   (carries the full [`Response`])
//!
//! # Example
//!
//! ```rust,ignore
//! use courier::{Courier, Headers, HttpCourier, MemoryCache, RequestData};
//!
//! #[tokio::main]
//! async fn main() -> courier::Result<()> {
//!     let courier = HttpCourier::builder().cache(MemoryCache::new()).build()?;
//!
//!     // Cached for five minutes
//!     let user = courier
//!         .get("https://api.example.com/users/1", &RequestData::new(), &Headers::new(), 5)
//!         .await?;
//!     println!("{} {}", user.http_code(), user.text());
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod courier;
pub mod error;
pub mod models;
pub mod network;

// Re-export commonly used types
pub use cache::{
    CacheEntry, CacheStats, Clock, Fingerprint, MemoryCache, ResponseCache, SqliteCache,
    SystemClock,
};
pub use courier::{Courier, CourierBuilder, HttpCourier};
pub use error::{CourierError, Result};
pub use models::{BasicAuthCredentials, DataValue, Headers, Method, RequestData, Response};
pub use network::{
    DefaultResponseParser, RawResponse, ReqwestTransport, ResponseParser, Transport,
    TransportError,
};
