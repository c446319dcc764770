//! PostgreSQL repository implementations.
//!
//! - [`PgCatalogReader`] - Read-only catalog queries

pub mod pg_catalog_reader;

pub use pg_catalog_reader::PgCatalogReader;
