//! PostgreSQL implementation of the catalog read capability.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::ProductSummary;
use crate::domain::repositories::CatalogReader;
use crate::error::AppError;

/// Read-only catalog queries over the supervised pool.
pub struct PgCatalogReader {
    pool: Arc<PgPool>,
}

impl PgCatalogReader {
    /// Creates a reader over a pool that has already reached `Ready`.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogReader for PgCatalogReader {
    async fn list_products(&self, company_id: i64) -> Result<Vec<ProductSummary>, AppError> {
        let products = sqlx::query_as::<_, ProductSummary>(
            r#"
            SELECT id, company_id, name, price_cents, created_at
            FROM products
            WHERE company_id = $1 AND deleted_at IS NULL
            ORDER BY id
            "#,
        )
        .bind(company_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(products)
    }

    async fn company_exists(&self, company_id: i64) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM companies WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(company_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }
}
