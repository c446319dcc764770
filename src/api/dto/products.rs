//! DTOs for product listing.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::ProductSummary;
use crate::domain::pagination::PagedResult;

/// Paginated list of products.
#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub pagination: PaginationMeta,
    pub items: Vec<ProductItem>,
}

/// A single product row.
#[derive(Debug, Serialize)]
pub struct ProductItem {
    pub id: i64,
    pub name: String,
    pub price_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// Pagination metadata for responses.
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub last_page: u32,
    pub prev_page: Option<u32>,
    pub next_page: Option<u32>,
}

impl From<PagedResult<ProductSummary>> for ProductListResponse {
    fn from(paged: PagedResult<ProductSummary>) -> Self {
        Self {
            pagination: PaginationMeta {
                page: paged.page,
                limit: paged.limit,
                total: paged.total,
                last_page: paged.last_page,
                prev_page: paged.prev_page,
                next_page: paged.next_page,
            },
            items: paged
                .items
                .into_iter()
                .map(|p| ProductItem {
                    id: p.id,
                    name: p.name,
                    price_cents: p.price_cents,
                    created_at: p.created_at,
                })
                .collect(),
        }
    }
}
