//! PostgreSQL pool connector.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tracing::info;

use super::supervisor::{ConnectionError, Connector};

/// Opens the primary-store pool with `sqlx`.
///
/// `PgPoolOptions::connect` establishes a first connection eagerly, so a
/// successful attempt means the database actually answered.
pub struct PgConnector {
    database_url: String,
    max_connections: u32,
    acquire_timeout: Duration,
}

impl PgConnector {
    pub fn new(database_url: impl Into<String>, max_connections: u32, acquire_timeout: Duration) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections,
            acquire_timeout,
        }
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Handle = PgPool;

    fn dependency(&self) -> &'static str {
        "postgres"
    }

    async fn connect(&self) -> Result<PgPool, ConnectionError> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .connect(&self.database_url)
            .await
            .map_err(|e| ConnectionError::Connect {
                dependency: "postgres",
                reason: e.to_string(),
            })
    }

    async fn disconnect(&self, pool: PgPool) {
        pool.close().await;
        info!("PostgreSQL pool closed");
    }
}
