//! Paginated catalog reads.

use std::sync::Arc;

use serde_json::json;

use super::cache_aside::CacheAsideReader;
use crate::domain::entities::ProductSummary;
use crate::domain::pagination::{PageRequest, PagedResult};
use crate::domain::repositories::CatalogReader;
use crate::error::AppError;

/// Serves product lists per company through the list cache.
pub struct CatalogService {
    reader: Arc<dyn CatalogReader>,
    lists: CacheAsideReader,
    list_ttl_seconds: u64,
}

impl CatalogService {
    pub fn new(reader: Arc<dyn CatalogReader>, lists: CacheAsideReader, list_ttl_seconds: u64) -> Self {
        Self {
            reader,
            lists,
            list_ttl_seconds,
        }
    }

    fn products_key(company_id: i64) -> String {
        format!("products:{}", company_id)
    }

    /// Returns one page of a company's products.
    ///
    /// The company check runs only when the list is loaded from the store,
    /// so a cached list is served without touching the database.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the company does not exist.
    /// Returns [`AppError::Internal`] or [`AppError::Unavailable`] on database errors.
    pub async fn list_products(
        &self,
        company_id: i64,
        request: PageRequest,
    ) -> Result<PagedResult<ProductSummary>, AppError> {
        let reader = self.reader.clone();

        self.lists
            .read_page(
                &Self::products_key(company_id),
                self.list_ttl_seconds,
                request,
                || async move {
                    if !reader.company_exists(company_id).await? {
                        return Err(AppError::not_found(
                            "Company not found",
                            json!({ "company_id": company_id }),
                        ));
                    }
                    reader.list_products(company_id).await
                },
            )
            .await
    }

    /// Drops the cached product list of a company so the next read reloads it.
    pub async fn invalidate_company(&self, company_id: i64) {
        self.lists.invalidate(&Self::products_key(company_id)).await;
    }
}
