//! Redis connection connector.

use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::info;

use super::supervisor::{ConnectionError, Connector};

/// Opens a Redis [`ConnectionManager`] and validates it with a PING.
///
/// `rediss://` URLs connect over TLS.
pub struct RedisConnector {
    redis_url: String,
}

impl RedisConnector {
    pub fn new(redis_url: impl Into<String>) -> Self {
        Self {
            redis_url: redis_url.into(),
        }
    }
}

fn connect_error(reason: String) -> ConnectionError {
    ConnectionError::Connect {
        dependency: "redis",
        reason,
    }
}

#[async_trait]
impl Connector for RedisConnector {
    type Handle = ConnectionManager;

    fn dependency(&self) -> &'static str {
        "redis"
    }

    async fn connect(&self) -> Result<ConnectionManager, ConnectionError> {
        let client = Client::open(self.redis_url.as_str())
            .map_err(|e| connect_error(format!("Failed to create Redis client: {}", e)))?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| connect_error(format!("Failed to connect to Redis: {}", e)))?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| connect_error(format!("Redis PING failed: {}", e)))?;

        Ok(manager)
    }

    async fn disconnect(&self, manager: ConnectionManager) {
        // The multiplexed connection closes once the last clone is dropped
        drop(manager);
        info!("Redis connection released");
    }
}
