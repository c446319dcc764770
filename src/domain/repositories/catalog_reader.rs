//! Read-only access to the catalog store of record.

use crate::domain::entities::ProductSummary;
use crate::error::AppError;
use async_trait::async_trait;

/// Read capability over catalog data.
///
/// List methods return the complete, ordered, unpaginated result set; paging
/// is applied by the caller (see
/// [`crate::application::services::CacheAsideReader`]).
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgCatalogReader`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Returns every product of a company, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] or [`AppError::Unavailable`] on database errors.
    async fn list_products(&self, company_id: i64) -> Result<Vec<ProductSummary>, AppError>;

    /// Checks whether a company exists.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] or [`AppError::Unavailable`] on database errors.
    async fn company_exists(&self, company_id: i64) -> Result<bool, AppError>;
}
