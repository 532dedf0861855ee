//! SQLite-based durable response cache.

use super::fingerprint::Fingerprint;
use super::traits::{CacheEntry, CacheStats, Clock, ResponseCache, SystemClock};
use crate::error::{CourierError, Result};
use crate::models::{Headers, Method, RequestData, Response};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// SQLite-based response cache.
///
/// Survives process restarts. Thread-safe via internal mutex on the connection.
pub struct SqliteCache {
    /// Database connection (wrapped for thread safety).
    conn: Arc<Mutex<Connection>>,
    clock: Arc<dyn Clock>,
}

impl SqliteCache {
    /// Open (or create) a cache at the specified database path.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CourierError::Io {
                message: format!("Failed to create cache directory: {}", e),
                path: Some(parent.to_path_buf()),
                source: Some(e),
            })?;
        }

        let conn = Connection::open(db_path).map_err(|e| CourierError::Database {
            message: format!("Failed to open cache database: {}", e),
            source: Some(e),
        })?;

        // Enable WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(|e| CourierError::Database {
                message: format!("Failed to set pragmas: {}", e),
                source: Some(e),
            })?;

        Self::from_connection(conn)
    }

    /// Cache backed by a private in-memory database.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| CourierError::Database {
            message: format!("Failed to open in-memory database: {}", e),
            source: Some(e),
        })?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let cache = Self {
            conn: Arc::new(Mutex::new(conn)),
            clock: Arc::new(SystemClock),
        };
        cache.init_schema()?;
        Ok(cache)
    }

    /// Replace the time source used for expiry.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| CourierError::Cache {
            message: format!("Failed to lock database: {}", e),
        })
    }

    /// Initialize database schema.
    fn init_schema(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS response_cache (
                fingerprint TEXT PRIMARY KEY,
                method TEXT NOT NULL,
                url TEXT NOT NULL,
                http_code INTEGER NOT NULL,
                headers TEXT NOT NULL,
                body BLOB NOT NULL,
                cached_at TEXT NOT NULL,
                expires_at TEXT NOT NULL
            );

            -- Index for expiration sweeps
            CREATE INDEX IF NOT EXISTS idx_response_cache_expires
                ON response_cache(expires_at);
            "#,
        )
        .map_err(|e| CourierError::Database {
            message: format!("Failed to initialize cache schema: {}", e),
            source: Some(e),
        })?;

        Ok(())
    }

    /// Live entry for a fingerprint; an expired one is deleted and reported missing.
    pub fn get_entry(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>> {
        let conn = self.lock()?;

        let row: Option<(i64, String, Vec<u8>, String, String)> = conn
            .query_row(
                r#"
                SELECT http_code, headers, body, cached_at, expires_at
                FROM response_cache
                WHERE fingerprint = ?1
                "#,
                params![fingerprint.as_str()],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                    ))
                },
            )
            .optional()
            .map_err(|e| CourierError::Database {
                message: format!("Failed to query cache entry: {}", e),
                source: Some(e),
            })?;

        let (http_code, headers_json, body, cached_at_str, expires_at_str) = match row {
            Some(r) => r,
            None => return Ok(None),
        };

        let expires_at = parse_timestamp(&expires_at_str)?;
        if expires_at <= self.clock.now() {
            conn.execute(
                "DELETE FROM response_cache WHERE fingerprint = ?1",
                params![fingerprint.as_str()],
            )
            .map_err(|e| CourierError::Database {
                message: format!("Failed to delete expired entry: {}", e),
                source: Some(e),
            })?;
            debug!("Cache entry {} expired", fingerprint);
            return Ok(None);
        }

        let headers: Headers = serde_json::from_str(&headers_json)?;
        let http_code = u16::try_from(http_code).map_err(|_| CourierError::Cache {
            message: format!("Stored status code out of range: {}", http_code),
        })?;

        Ok(Some(CacheEntry {
            fingerprint: fingerprint.clone(),
            response: Response::new(body, headers, http_code),
            cached_at: parse_timestamp(&cached_at_str)?,
            expires_at,
        }))
    }

    /// Insert or replace a prepared entry.
    pub fn insert_entry(&self, entry: &CacheEntry, method: Method, url: &str) -> Result<()> {
        let headers_json = serde_json::to_string(entry.response.headers())?;
        let conn = self.lock()?;

        conn.execute(
            r#"
            INSERT OR REPLACE INTO response_cache
            (fingerprint, method, url, http_code, headers, body, cached_at, expires_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                entry.fingerprint.as_str(),
                method.as_str(),
                url,
                i64::from(entry.response.http_code()),
                headers_json,
                entry.response.body(),
                format_timestamp(entry.cached_at),
                format_timestamp(entry.expires_at),
            ],
        )
        .map_err(|e| CourierError::Database {
            message: format!("Failed to set cache entry: {}", e),
            source: Some(e),
        })?;

        Ok(())
    }
}

// Fixed-width (expiry is clamped to four-digit years) so expiry sweeps can
// compare the stored text directly.
fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CourierError::Cache {
            message: format!("Corrupt cache timestamp {:?}: {}", value, e),
        })
}

impl ResponseCache for SqliteCache {
    fn find_response(
        &self,
        method: Method,
        url: &str,
        data: &RequestData,
        headers: &Headers,
    ) -> Result<Option<Response>> {
        let fingerprint = Fingerprint::compute(method, url, data, headers);
        Ok(self.get_entry(&fingerprint)?.map(|entry| entry.response))
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
        self.insert_entry(&entry, method, url)
    }

    fn forget(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute("DELETE FROM response_cache", [])
            .map_err(|e| CourierError::Database {
                message: format!("Failed to clear cache entries: {}", e),
                source: Some(e),
            })?;

        debug!("Cleared all cached responses");

        Ok(())
    }

    fn cleanup_expired(&self) -> Result<usize> {
        let conn = self.lock()?;
        let now = format_timestamp(self.clock.now());

        let deleted = conn
            .execute(
                "DELETE FROM response_cache WHERE expires_at <= ?1",
                params![now],
            )
            .map_err(|e| CourierError::Database {
                message: format!("Failed to cleanup expired entries: {}", e),
                source: Some(e),
            })?;

        if deleted > 0 {
            debug!("Cleaned up {} expired cache entries", deleted);
        }

        Ok(deleted)
    }

    fn stats(&self) -> Result<CacheStats> {
        let conn = self.lock()?;

        let (total_entries, total_size): (i64, i64) = conn
            .query_row(
                "SELECT COUNT(*), COALESCE(SUM(LENGTH(body)), 0) FROM response_cache",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(|e| CourierError::Database {
                message: format!("Failed to query cache stats: {}", e),
                source: Some(e),
            })?;

        Ok(CacheStats {
            total_entries: total_entries as usize,
            total_body_bytes: total_size as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn create_test_cache() -> (TempDir, SqliteCache) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("cache").join("responses.sqlite");
        let cache = SqliteCache::new(&db_path).unwrap();
        (temp_dir, cache)
    }

    fn json_response() -> Response {
        let mut headers = Headers::new();
        headers.insert("content-type".into(), "application/json".into());
        Response::new(br#"{"id":1}"#.to_vec(), headers, 200)
    }

    #[test]
    fn test_store_and_find() {
        let (_temp, cache) = create_test_cache();
        let mut data = RequestData::new();
        data.insert("expand".into(), "profile".into());

        cache
            .store_response(&json_response(), Method::Get, "https://a.test/users/1", &data, &Headers::new(), 5)
            .unwrap();

        let found = cache
            .find_response(Method::Get, "https://a.test/users/1", &data, &Headers::new())
            .unwrap()
            .unwrap();
        assert_eq!(found, json_response());
        assert_eq!(found.http_message(), "OK");
    }

    #[test]
    fn test_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("responses.sqlite");
        let data = RequestData::new();
        let headers = Headers::new();

        {
            let cache = SqliteCache::new(&db_path).unwrap();
            cache
                .store_response(&json_response(), Method::Post, "https://a.test/q", &data, &headers, 10)
                .unwrap();
        }

        let reopened = SqliteCache::new(&db_path).unwrap();
        assert!(reopened
            .find_response(Method::Post, "https://a.test/q", &data, &headers)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_expired_entry_removed_on_lookup() {
        let (_temp, cache) = create_test_cache();
        let data = RequestData::new();
        let headers = Headers::new();

        cache
            .store_response(&json_response(), Method::Get, "https://a.test/x", &data, &headers, 1)
            .unwrap();

        let later = Utc::now() + Duration::minutes(2);
        let cache = cache.with_clock(Arc::new(FixedClock(later)));

        assert!(cache
            .find_response(Method::Get, "https://a.test/x", &data, &headers)
            .unwrap()
            .is_none());
        assert_eq!(cache.stats().unwrap().total_entries, 0);
    }

    #[test]
    fn test_zero_minutes_stores_nothing() {
        let cache = SqliteCache::in_memory().unwrap();
        cache
            .store_response(&json_response(), Method::Get, "https://a.test/x", &RequestData::new(), &Headers::new(), 0)
            .unwrap();
        assert_eq!(cache.stats().unwrap().total_entries, 0);
    }

    #[test]
    fn test_forget_and_stats() {
        let cache = SqliteCache::in_memory().unwrap();
        let data = RequestData::new();
        let headers = Headers::new();

        cache
            .store_response(&json_response(), Method::Get, "https://a.test/a", &data, &headers, 5)
            .unwrap();
        cache
            .store_response(&json_response(), Method::Get, "https://a.test/b", &data, &headers, 5)
            .unwrap();

        let stats = cache.stats().unwrap();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.total_body_bytes, 16);

        cache.forget().unwrap();
        assert_eq!(cache.stats().unwrap().total_entries, 0);
    }

    #[test]
    fn test_longest_duration_stays_readable() {
        let cache = SqliteCache::in_memory().unwrap();
        let data = RequestData::new();
        let headers = Headers::new();

        cache
            .store_response(&json_response(), Method::Get, "https://a.test/x", &data, &headers, u32::MAX)
            .unwrap();

        let found = cache
            .find_response(Method::Get, "https://a.test/x", &data, &headers)
            .unwrap();
        assert_eq!(found, Some(json_response()));
        assert_eq!(cache.cleanup_expired().unwrap(), 0);
        assert_eq!(cache.stats().unwrap().total_entries, 1);
    }

    #[test]
    fn test_cleanup_expired() {
        let cache = SqliteCache::in_memory().unwrap();
        let data = RequestData::new();
        let headers = Headers::new();

        cache
            .store_response(&json_response(), Method::Get, "https://a.test/old", &data, &headers, 1)
            .unwrap();
        cache
            .store_response(&json_response(), Method::Get, "https://a.test/new", &data, &headers, 60)
            .unwrap();

        let cache = cache.with_clock(Arc::new(FixedClock(Utc::now() + Duration::minutes(5))));
        assert_eq!(cache.cleanup_expired().unwrap(), 1);
        assert_eq!(cache.stats().unwrap().total_entries, 1);
    }
}
