//! Typed cache layer with lazily enforced per-entry TTL.
//!
//! Every value is wrapped in a [`CacheEntry`] carrying its insertion time and
//! TTL, serialized to JSON and handed to the underlying [`CacheService`]. The
//! entry's own timestamp is authoritative: an entry older than its TTL is a
//! miss even if the store has not purged it yet.
//!
//! Fault policy:
//!
//! - reads never fail; store faults and undecodable payloads become a miss
//! - writes and invalidations surface their errors to the caller

use super::service::{CacheError, CacheResult, CacheService};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tracing::{debug, warn};

/// A cached payload together with its insertion time and TTL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub value: T,
    pub stored_at: DateTime<Utc>,
    pub ttl_seconds: u64,
}

impl<T> CacheEntry<T> {
    /// Wraps `value` with the current time as insertion timestamp.
    pub fn new(value: T, ttl_seconds: u64) -> Self {
        Self {
            value,
            stored_at: Utc::now(),
            ttl_seconds,
        }
    }

    /// Whole seconds elapsed since insertion, measured at `now`.
    pub fn age_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.stored_at).num_seconds()
    }

    /// `true` iff `now - stored_at <= window_seconds`.
    pub fn is_fresh_within(&self, window_seconds: u64, now: DateTime<Utc>) -> bool {
        let age_ms = (now - self.stored_at).num_milliseconds();
        let window_ms = i64::try_from(window_seconds)
            .unwrap_or(i64::MAX)
            .saturating_mul(1000);
        age_ms <= window_ms
    }

    /// Validity against the entry's own TTL.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.is_fresh_within(self.ttl_seconds, now)
    }
}

/// Shared typed cache used for signing keys and list results.
///
/// Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct KeyCache {
    store: Arc<dyn CacheService>,
}

impl KeyCache {
    pub fn new(store: Arc<dyn CacheService>) -> Self {
        Self { store }
    }

    /// Underlying raw store, for health checks.
    pub fn store(&self) -> &Arc<dyn CacheService> {
        &self.store
    }

    /// Returns the value under `key` if present and within its TTL.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_entry(key).await.map(|entry| entry.value)
    }

    /// Returns the whole entry under `key` if present and within its TTL.
    ///
    /// Never fails: store faults and payloads that do not decode as `T` are
    /// logged and reported as a miss.
    pub async fn get_entry<T: DeserializeOwned>(&self, key: &str) -> Option<CacheEntry<T>> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("Cache MISS: {}", key);
                metrics::counter!("cache_requests_total", "result" => "miss").increment(1);
                return None;
            }
            Err(e) => {
                warn!("Cache read failed for {}, treating as miss: {}", key, e);
                metrics::counter!("cache_requests_total", "result" => "error").increment(1);
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Cache entry {} could not be decoded, treating as miss: {}", key, e);
                metrics::counter!("cache_requests_total", "result" => "error").increment(1);
                return None;
            }
        };

        if !entry.is_valid_at(Utc::now()) {
            debug!(
                "Cache EXPIRED: {} (age {}s > ttl {}s)",
                key,
                entry.age_seconds(Utc::now()),
                entry.ttl_seconds
            );
            metrics::counter!("cache_requests_total", "result" => "miss").increment(1);
            return None;
        }

        debug!("Cache HIT: {}", key);
        metrics::counter!("cache_requests_total", "result" => "hit").increment(1);
        Some(entry)
    }

    /// Stores `value` under `key` for `ttl_seconds`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::SerializationError`] if `value` cannot be encoded,
    /// or the store's error if the write fails.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl_seconds: u64) -> CacheResult<()> {
        let entry = CacheEntry::new(value, ttl_seconds);
        self.put_entry(key, &entry).await
    }

    /// Stores a pre-built entry, keeping its timestamp.
    pub async fn put_entry<T: Serialize>(&self, key: &str, entry: &CacheEntry<T>) -> CacheResult<()> {
        let raw = serde_json::to_string(entry)
            .map_err(|e| CacheError::SerializationError(e.to_string()))?;

        self.store.set(key, &raw, entry.ttl_seconds).await?;
        debug!("Cache SET: {} (TTL: {}s)", key, entry.ttl_seconds);
        Ok(())
    }

    /// Removes the entry under `key`.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the delete fails.
    pub async fn invalidate(&self, key: &str) -> CacheResult<()> {
        self.store.invalidate(key).await?;
        debug!("Cache INVALIDATE: {}", key);
        Ok(())
    }
}
