//! In-process response cache.

use super::fingerprint::Fingerprint;
use super::traits::{CacheEntry, CacheStats, Clock, ResponseCache, SystemClock};
use crate::config::CacheSettings;
use crate::error::Result;
use crate::models::{Headers, Method, RequestData, Response};
use mini_moka::sync::Cache;
use std::sync::Arc;
use tracing::debug;

/// Bounded in-memory cache with per-entry expiry.
///
/// Each entry carries its own deadline since durations vary per request; the
/// deadline is checked on lookup.
pub struct MemoryCache {
    entries: Cache<Fingerprint, CacheEntry>,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    /// Create a cache holding up to [`CacheSettings::DEFAULT_MAX_ENTRIES`] entries.
    pub fn new() -> Self {
        Self::with_capacity(CacheSettings::DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(max_entries: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(max_entries).build(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source used for expiry.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Live entry for a fingerprint; an expired one is evicted and reported missing.
    pub fn get_entry(&self, fingerprint: &Fingerprint) -> Option<CacheEntry> {
        let entry = self.entries.get(fingerprint)?;
        if entry.is_expired(self.clock.now()) {
            debug!("Cache entry {} expired", fingerprint);
            self.entries.invalidate(fingerprint);
            return None;
        }
        Some(entry)
    }

    /// Insert a prepared entry.
    pub fn insert_entry(&self, entry: CacheEntry) {
        self.entries.insert(entry.fingerprint.clone(), entry);
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseCache for MemoryCache {
    fn find_response(
        &self,
        method: Method,
        url: &str,
        data: &RequestData,
        headers: &Headers,
    ) -> Result<Option<Response>> {
        let fingerprint = Fingerprint::compute(method, url, data, headers);
        Ok(self.get_entry(&fingerprint).map(|entry| entry.response))
    }

    fn store_response(
        &self,
        response: &Response,
        method: Method,
        url: &str,
        data: &RequestData,
        headers: &Headers,
        minutes: u32,
    ) -> Result<()> {
        if minutes == 0 {
            return Ok(());
        }

        let fingerprint = Fingerprint::compute(method, url, data, headers);
        let entry = CacheEntry::new(fingerprint, response.clone(), self.clock.now(), minutes);
        self.insert_entry(entry);
        Ok(())
    }

    fn forget(&self) -> Result<()> {
        self.entries.invalidate_all();
        debug!("Cleared in-memory response cache");
        Ok(())
    }

    fn cleanup_expired(&self) -> Result<usize> {
        let now = self.clock.now();
        let expired: Vec<Fingerprint> = self
            .entries
            .iter()
            .filter(|entry| entry.value().is_expired(now))
            .map(|entry| Fingerprint::clone(entry.key()))
            .collect();

        for fingerprint in &expired {
            self.entries.invalidate(fingerprint);
        }

        if !expired.is_empty() {
            debug!("Cleaned up {} expired cache entries", expired.len());
        }
        Ok(expired.len())
    }

    fn stats(&self) -> Result<CacheStats> {
        let mut stats = CacheStats::default();
        for entry in self.entries.iter() {
            stats.total_entries += 1;
            stats.total_body_bytes += entry.value().response.body().len() as u64;
        }
        Ok(stats)
    }
}
