//! Cache-aside paginated reads.
//!
//! The complete, ordered result set is cached as one entry and every page is
//! sliced locally from it. Within the freshness window all pages of a list are
//! served from the same entry; the loader runs only on a miss or a stale entry.

use std::future::Future;

use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::domain::pagination::{PageRequest, PagedResult};
use crate::infrastructure::cache::KeyCache;

/// Serves pages of full result sets through a [`KeyCache`].
#[derive(Clone)]
pub struct CacheAsideReader {
    cache: KeyCache,
    max_cached_items: usize,
}

impl CacheAsideReader {
    /// `max_cached_items` caps the size of a set written back to the cache;
    /// larger sets are served but not cached.
    pub fn new(cache: KeyCache, max_cached_items: usize) -> Self {
        Self {
            cache,
            max_cached_items,
        }
    }

    /// Returns one page of the set stored under `cache_key`.
    ///
    /// A cached set younger than `freshness_seconds` is sliced directly.
    /// Otherwise `load` is called for the complete set, which is written back
    /// before slicing. A failed write is logged and does not fail the read.
    ///
    /// # Errors
    ///
    /// Returns the loader's error unchanged.
    pub async fn read_page<T, E, F, Fut>(
        &self,
        cache_key: &str,
        freshness_seconds: u64,
        request: PageRequest,
        load: F,
    ) -> Result<PagedResult<T>, E>
    where
        T: Serialize + DeserializeOwned + Clone,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
    {
        if let Some(entry) = self.cache.get_entry::<Vec<T>>(cache_key).await
            && entry.is_fresh_within(freshness_seconds, Utc::now())
        {
            return Ok(PagedResult::from_full_set(&entry.value, request));
        }

        let all = load().await?;
        debug!("Loaded {} items for {}", all.len(), cache_key);

        if all.len() > self.max_cached_items {
            warn!(
                "Result set for {} has {} items (cap {}), not caching",
                cache_key,
                all.len(),
                self.max_cached_items
            );
        } else if let Err(e) = self.cache.set(cache_key, &all, freshness_seconds).await {
            warn!("Failed to cache result set for {}: {}", cache_key, e);
        }

        Ok(PagedResult::from_full_set(&all, request))
    }

    /// Drops the cached set under `cache_key`.
    pub async fn invalidate(&self, cache_key: &str) {
        if let Err(e) = self.cache.invalidate(cache_key).await {
            warn!("Failed to invalidate {}: {}", cache_key, e);
        }
    }
}
