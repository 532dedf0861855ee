//! Builder for configuring an [`HttpCourier`].

use super::http::HttpCourier;
use crate::cache::{ResponseCache, SqliteCache};
use crate::config::{CacheSettings, NetworkConfig};
use crate::error::{CourierError, Result};
use crate::network::{DefaultResponseParser, ReqwestTransport, ResponseParser, Transport};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Builder for configuring an [`HttpCourier`].
///
/// # Example
///
/// ```rust,ignore
/// use courier::{Courier, HttpCourier, MemoryCache};
///
/// let courier = HttpCourier::builder()
///     .timeout(Duration::from_secs(10))
///     .cache(MemoryCache::new())
///     .build()?;
///
/// let user = courier.get("https://api.example.com/users/1", &data, &headers, 5).await?;
/// ```
pub struct CourierBuilder {
    transport: Option<Arc<dyn Transport>>,
    parser: Option<Arc<dyn ResponseParser>>,
    cache: Option<Arc<dyn ResponseCache>>,
    cache_dir: Option<PathBuf>,
    cache_enabled: bool,
    timeout: Option<Duration>,
}

impl CourierBuilder {
    pub fn new() -> Self {
        Self {
            transport: None,
            parser: None,
            cache: None,
            cache_dir: None,
            cache_enabled: CacheSettings::ENABLED_BY_DEFAULT,
            timeout: None,
        }
    }

    /// Use a custom transport instead of the default reqwest one.
    pub fn transport(self, transport: impl Transport + 'static) -> Self {
        self.shared_transport(Arc::new(transport))
    }

    /// Use a transport that is also held elsewhere.
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a custom response parser.
    pub fn parser(mut self, parser: impl ResponseParser + 'static) -> Self {
        self.parser = Some(Arc::new(parser));
        self
    }

    /// Attach a cache backend.
    pub fn cache(self, cache: impl ResponseCache + 'static) -> Self {
        self.shared_cache(Arc::new(cache))
    }

    /// Attach a cache backend that is also held elsewhere.
    pub fn shared_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Attach a SQLite cache stored in `dir`, created on build.
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Initial state of the cache switch.
    ///
    /// Default: `true`
    pub fn cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Request timeout for the default transport.
    ///
    /// Default: [`NetworkConfig::REQUEST_TIMEOUT`]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the courier.
    pub fn build(self) -> Result<HttpCourier> {
        let transport: Arc<dyn Transport> = match (self.transport, self.timeout) {
            (Some(_), Some(_)) => {
                return Err(CourierError::Config {
                    message: "timeout only applies to the default transport".to_string(),
                })
            }
            (Some(transport), None) => transport,
            (None, timeout) => Arc::new(ReqwestTransport::with_timeout(
                timeout.unwrap_or(NetworkConfig::REQUEST_TIMEOUT),
            )?),
        };

        let cache: Option<Arc<dyn ResponseCache>> = match (self.cache, self.cache_dir) {
            (Some(_), Some(_)) => {
                return Err(CourierError::Config {
                    message: "set either a cache or a cache directory, not both".to_string(),
                })
            }
            (Some(cache), None) => Some(cache),
            (None, Some(dir)) => Some(Arc::new(SqliteCache::new(
                dir.join(CacheSettings::DATABASE_FILENAME),
            )?)),
            (None, None) => None,
        };

        let parser = self
            .parser
            .unwrap_or_else(|| Arc::new(DefaultResponseParser));

        Ok(HttpCourier::new(transport, parser, cache, self.cache_enabled))
    }
}

impl Default for CourierBuilder {
    fn default() -> Self {
        Self::new()
    }
}
