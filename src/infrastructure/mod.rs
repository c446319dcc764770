//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for caching, identity and persistence, plus the
//! supervision of the connections they run on.
//!
//! # Modules
//!
//! - [`cache`] - Cache stores and the typed [`cache::KeyCache`]
//! - [`connection`] - Bounded-retry connection supervision
//! - [`identity`] - Identity-provider key set retrieval
//! - [`persistence`] - PostgreSQL repository implementations

pub mod cache;
pub mod connection;
pub mod identity;
pub mod persistence;
