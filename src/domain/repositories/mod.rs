//! Repository trait definitions for the domain layer.
//!
//! Services depend on these narrow read-only capabilities rather than on each
//! other's concrete types, which keeps construction order acyclic.
//!
//! - Implementations live in `crate::infrastructure::persistence`
//! - Mock implementations are auto-generated via `mockall` for testing

pub mod catalog_reader;

pub use catalog_reader::CatalogReader;

#[cfg(test)]
pub use catalog_reader::MockCatalogReader;
