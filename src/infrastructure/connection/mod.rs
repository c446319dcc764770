//! Supervised connections to stateful dependencies.
//!
//! - [`retry`] - Bounded flat-interval retry combinator
//! - [`ConnectionSupervisor`] - Per-dependency lifecycle and state
//! - [`PgConnector`] / [`RedisConnector`] - Concrete connectors

mod pg_connector;
mod redis_connector;
pub mod retry;
mod supervisor;

pub use pg_connector::PgConnector;
pub use redis_connector::RedisConnector;
pub use retry::RetryPolicy;
pub use supervisor::{
    ConnectionError, ConnectionState, ConnectionSupervisor, Connector, DependencyStatus,
};

/// Supervisor for the primary store.
pub type DatabaseSupervisor = ConnectionSupervisor<PgConnector>;

/// Supervisor for the Redis cache store.
pub type CacheSupervisor = ConnectionSupervisor<RedisConnector>;
