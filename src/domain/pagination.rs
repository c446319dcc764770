//! Page requests and paged results for list reads.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected page request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("page must be greater than 0")]
    ZeroPage,
    #[error("limit must be greater than 0")]
    ZeroLimit,
}

/// One-based page number plus page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Result<Self, PaginationError> {
        if page == 0 {
            return Err(PaginationError::ZeroPage);
        }
        if limit == 0 {
            return Err(PaginationError::ZeroLimit);
        }
        Ok(Self { page, limit })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Index of the first item of this page in the full result set.
    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }
}

/// A single page cut from a complete, ordered result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub limit: u32,
    pub page: u32,
    pub last_page: u32,
    pub prev_page: Option<u32>,
    pub next_page: Option<u32>,
}

impl<T: Clone> PagedResult<T> {
    /// Slices `all` into the requested page.
    ///
    /// The offset is clamped to the set length, so a page past the end yields
    /// an empty `items` with the navigation fields still computed.
    pub fn from_full_set(all: &[T], request: PageRequest) -> Self {
        let total = all.len();
        let start = request.offset().min(total);
        let end = start.saturating_add(request.limit as usize).min(total);

        let last_page = total.div_ceil(request.limit as usize) as u32;
        let page = request.page;

        Self {
            items: all[start..end].to_vec(),
            total: total as u64,
            limit: request.limit,
            page,
            last_page,
            prev_page: (page > 1).then(|| page - 1),
            next_page: (page < last_page).then(|| page + 1),
        }
    }
}
