//! Handler for paginated product listing.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::api::dto::pagination::PaginationParams;
use crate::api::dto::products::ProductListResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Lists a company's products one page at a time.
///
/// # Endpoint
///
/// `GET /api/companies/{company_id}/products`
///
/// # Query Parameters
///
/// - `page` (optional): Page number (default: 1)
/// - `limit` (optional): Items per page (default: 10, max: 100)
///
/// # Caching
///
/// The full product list is cached for `LIST_CACHE_TTL_SECONDS`; every page
/// within that window is sliced from the same snapshot.
///
/// # Errors
///
/// - 400 Bad Request if pagination parameters are invalid
/// - 404 Not Found if the company does not exist
pub async fn product_list_handler(
    State(state): State<AppState>,
    Path(company_id): Path<i64>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ProductListResponse>, AppError> {
    let request = params.to_page_request()?;

    let paged = state
        .catalog_service
        .list_products(company_id, request)
        .await?;

    Ok(Json(paged.into()))
}
