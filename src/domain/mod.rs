//! Domain layer containing entities, paging rules and repository contracts.
//!
//! - [`entities`] - Signing keys, verified claims and catalog read models
//! - [`pagination`] - Page requests and paged results
//! - [`repositories`] - Read-only data access traits
//!
//! The domain layer has no dependencies on infrastructure or presentation layers.

pub mod entities;
pub mod pagination;
pub mod repositories;
