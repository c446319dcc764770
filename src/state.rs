//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{CatalogService, TokenVerifier};
use crate::infrastructure::cache::KeyCache;
use crate::infrastructure::connection::DependencyStatus;

/// Cloned per request; every field is a shared handle.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<TokenVerifier>,
    pub catalog_service: Arc<CatalogService>,
    pub cache: KeyCache,
    /// Supervised dependencies reported by `/health`.
    pub dependencies: Vec<Arc<dyn DependencyStatus>>,
}

impl AppState {
    pub fn new(
        verifier: Arc<TokenVerifier>,
        catalog_service: Arc<CatalogService>,
        cache: KeyCache,
        dependencies: Vec<Arc<dyn DependencyStatus>>,
    ) -> Self {
        Self {
            verifier,
            catalog_service,
            cache,
            dependencies,
        }
    }
}
