//! Response cache trait and types.

use super::fingerprint::Fingerprint;
use crate::error::Result;
use crate::models::{Headers, Method, RequestData, Response};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Source of the current time for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A stored response with its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub fingerprint: Fingerprint,
    pub response: Response,
    /// When the entry was cached.
    pub cached_at: DateTime<Utc>,
    /// When the entry expires.
    pub expires_at: DateTime<Utc>,
}

/// Latest expiry an entry can carry; longer durations are clamped to it.
///
/// Keeps stored deadlines within four-digit years so they stay parseable as
/// RFC 3339 and sort correctly as text.
pub fn latest_expiry() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

impl CacheEntry {
    /// Entry that lives for `minutes` from `now`, but never past [`latest_expiry`].
    pub fn new(
        fingerprint: Fingerprint,
        response: Response,
        now: DateTime<Utc>,
        minutes: u32,
    ) -> Self {
        let latest = latest_expiry();
        let expires_at = now
            .checked_add_signed(Duration::minutes(i64::from(minutes)))
            .map_or(latest, |at| at.min(latest));

        Self {
            fingerprint,
            response,
            cached_at: now,
            expires_at,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of stored entries, expired ones included until swept.
    pub total_entries: usize,
    /// Total size of cached bodies in bytes.
    pub total_body_bytes: u64,
}

/// Response cache backend.
///
/// Entries are keyed by [`Fingerprint`]. Expired entries are dropped lazily when
/// looked up. All operations are synchronous to match rusqlite's API.
pub trait ResponseCache: Send + Sync {
    /// Find a live response stored for these request attributes.
    fn find_response(
        &self,
        method: Method,
        url: &str,
        data: &RequestData,
        headers: &Headers,
    ) -> Result<Option<Response>>;

    /// Store a response for `minutes`. A zero duration stores nothing.
    ///
    /// Overwrites any existing entry with the same fingerprint.
    fn store_response(
        &self,
        response: &Response,
        method: Method,
        url: &str,
        data: &RequestData,
        headers: &Headers,
        minutes: u32,
    ) -> Result<()>;

    /// Remove every entry.
    fn forget(&self) -> Result<()>;

    /// Remove expired entries, returning how many were removed.
    fn cleanup_expired(&self) -> Result<usize>;

    /// Get overall cache statistics.
    fn stats(&self) -> Result<CacheStats>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_expiry() {
        let now = Utc::now();
        let fingerprint =
            Fingerprint::compute(Method::Get, "https://a.test/", &RequestData::new(), &Headers::new());
        let entry = CacheEntry::new(fingerprint, Response::new(Vec::new(), Headers::new(), 200), now, 5);

        assert_eq!(entry.expires_at - entry.cached_at, Duration::minutes(5));
        assert!(!entry.is_expired(now + Duration::minutes(4)));
        assert!(entry.is_expired(now + Duration::minutes(5)));
    }

    #[test]
    fn test_long_durations_clamped() {
        let now = Utc::now();
        let fingerprint =
            Fingerprint::compute(Method::Get, "https://a.test/", &RequestData::new(), &Headers::new());
        let entry = CacheEntry::new(
            fingerprint,
            Response::new(Vec::new(), Headers::new(), 200),
            now,
            u32::MAX,
        );

        assert_eq!(entry.expires_at, latest_expiry());
        assert!(!entry.is_expired(now));
    }
}
