//! Request-path services built on the infrastructure layer.

pub mod cache_aside;
pub mod catalog_service;
pub mod token_verifier;

pub use cache_aside::CacheAsideReader;
pub use catalog_service::CatalogService;
pub use token_verifier::{
    MAX_CLOCK_TOLERANCE_SECONDS, SIGNING_KEYS_CACHE_KEY, TokenVerifier, VerifierConfig, VerifyError,
};
