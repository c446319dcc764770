//! Redis-backed cache store.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use tracing::debug;

/// Namespace prepended to every key this service writes.
pub const DEFAULT_KEY_PREFIX: &str = "catalog:";

/// Redis cache store over a shared [`ConnectionManager`].
///
/// The manager is obtained from the supervised Redis connection and cloned per
/// command; clones share the underlying multiplexed connection.
pub struct RedisCache {
    client: ConnectionManager,
    key_prefix: String,
}

impl RedisCache {
    /// Wraps an established connection, namespacing every key with `key_prefix`.
    pub fn new(client: ConnectionManager, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    /// Constructs the full Redis key with namespace prefix.
    fn build_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let full_key = self.build_key(key);
        let mut conn = self.client.clone();

        conn.get::<_, Option<String>>(&full_key)
            .await
            .map_err(|e| CacheError::OperationError(format!("GET {}: {}", full_key, e)))
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> CacheResult<()> {
        let full_key = self.build_key(key);
        let mut conn = self.client.clone();

        // SET EX rejects a zero expiry
        let ttl = ttl_seconds.max(1);

        conn.set_ex::<_, _, ()>(&full_key, value, ttl)
            .await
            .map_err(|e| CacheError::OperationError(format!("SET {}: {}", full_key, e)))?;

        debug!("Redis SET: {} (TTL: {}s)", full_key, ttl);
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> CacheResult<()> {
        let full_key = self.build_key(key);
        let mut conn = self.client.clone();

        let deleted = conn
            .del::<_, i32>(&full_key)
            .await
            .map_err(|e| CacheError::OperationError(format!("DEL {}: {}", full_key, e)))?;

        if deleted > 0 {
            debug!("Redis DEL: {}", full_key);
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
