//! Pagination query parameters.

use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};
use validator::Validate;

use crate::domain::pagination::PageRequest;
use crate::error::AppError;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// `?page=&limit=` query parameters.
///
/// Uses `serde_with` to parse numbers from query strings as integers.
#[serde_as]
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PaginationParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<u32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: Option<u32>,
}

impl PaginationParams {
    /// Validates the parameters and applies defaults (`page` 1, `limit` 10).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `page` is 0 or `limit` is outside 1..=100.
    pub fn to_page_request(&self) -> Result<PageRequest, AppError> {
        self.validate()?;

        let page = self.page.unwrap_or(DEFAULT_PAGE);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);

        Ok(PageRequest::new(page, limit)?)
    }
}
