//! Response caching for the courier.
//!
//! Responses are keyed by a [`Fingerprint`] of the request attributes and kept
//! until their per-entry deadline passes. Two backends share the
//! [`ResponseCache`] trait:
//! - `MemoryCache`: bounded, in-process
//! - `SqliteCache`: durable across restarts

mod fingerprint;
mod memory;
mod sqlite;
mod traits;

pub use fingerprint::Fingerprint;
pub use memory::MemoryCache;
pub use sqlite::SqliteCache;
pub use traits::{latest_expiry, CacheEntry, CacheStats, Clock, ResponseCache, SystemClock};
