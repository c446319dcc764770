//! Caching layer shared by signing-key resolution and list reads.
//!
//! Provides a raw [`CacheService`] trait with three stores:
//! - [`RedisCache`] - Production Redis-backed store
//! - [`MemoryCache`] - In-process store when Redis is not configured
//! - [`NullCache`] - Stores nothing, for one-shot tools
//!
//! and the typed [`KeyCache`] on top, which owns TTL enforcement and the
//! fault policy.

mod key_cache;
mod memory_cache;
mod null_cache;
mod redis_cache;
mod service;

pub use key_cache::{CacheEntry, KeyCache};
pub use memory_cache::MemoryCache;
pub use null_cache::NullCache;
pub use redis_cache::{DEFAULT_KEY_PREFIX, RedisCache};
pub use service::{CacheError, CacheResult, CacheService};

#[cfg(test)]
pub(crate) use key_cache::tests::FailingCache;
