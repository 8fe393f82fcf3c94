//! Page/limit pagination for admin list endpoints.

use serde::{Deserialize, Serialize};

/// Default page size when the client does not send `limit`.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Hard upper bound on page size.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Query parameters shared by all paginated admin endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

impl PageParams {
    /// 1-based page number, floored at 1.
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Rows per page, clamped to `1..=MAX_PAGE_SIZE`.
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Row offset for the current page.
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }

    /// Search term trimmed of surrounding whitespace, `None` when absent or blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// A single page of results plus navigation metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, params: &PageParams) -> Self {
        let page = params.page();
        let limit = params.limit();
        let total_pages = if total == 0 {
            0
        } else {
            ((total as f64) / (limit as f64)).ceil() as i64
        };
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}
