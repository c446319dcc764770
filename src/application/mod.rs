//! Application layer services.
//!
//! Services consume infrastructure handles and repository traits and expose a
//! narrow API to the HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::token_verifier::TokenVerifier`] - Bearer token verification against the rotating key set
//! - [`services::cache_aside::CacheAsideReader`] - Paginated reads over a cached full result set
//! - [`services::catalog_service::CatalogService`] - Product lists per company

pub mod services;
