//! Centralized configuration for the courier.
//!
//! Constants for transport defaults and cache backends.

use std::time::Duration;

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    pub const USER_AGENT: &'static str = concat!("courier/", env!("CARGO_PKG_VERSION"));
}

/// Cache backend configuration.
pub struct CacheSettings;

impl CacheSettings {
    /// Upper bound on entries held by the in-memory cache.
    pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;
    pub const DATABASE_FILENAME: &'static str = "courier-cache.sqlite";
    /// Whether a freshly built courier has caching switched on.
    pub const ENABLED_BY_DEFAULT: bool = true;
}
