//! Core domain entities.
//!
//! - [`KeyRecord`] / [`KeySet`] - Identity-provider signing keys
//! - [`VerifiedClaims`] - Claims of an accepted bearer token
//! - [`ProductSummary`] - Catalog read model used by list endpoints

pub mod claims;
pub mod key_record;
pub mod product;

pub use claims::VerifiedClaims;
pub use key_record::{KeyMaterial, KeyRecord, KeySet};
pub use product::ProductSummary;
