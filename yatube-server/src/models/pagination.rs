//! Page-number pagination for post lists
//!
//! Page numbers arrive as raw query strings and are resolved against the
//! total row count: a missing or non-numeric page is page 1, a number
//! outside `1..=total_pages` is the last page, and an empty list still
//! has one (empty) page.

use serde::{Deserialize, Serialize};

/// Default items per page
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Resolved pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number (1-indexed)
    pub page: u32,
    /// Items per page
    pub per_page: u32,
}

impl Pagination {
    /// Resolve a requested page against the number of available rows.
    pub fn resolve(requested: Option<&str>, per_page: u32, total: i64) -> Self {
        let per_page = per_page.max(1);
        let last = total_pages(total, per_page);

        let page = match requested.and_then(|raw| raw.trim().parse::<i64>().ok()) {
            None => 1,
            Some(n) if n < 1 || n > i64::from(last) => last,
            Some(n) => n as u32,
        };

        Self { page, per_page }
    }

    /// Calculate SQL OFFSET value.
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }

    /// Get LIMIT value.
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }
}

/// Number of pages needed for `total` rows; never less than one.
fn total_pages(total: i64, per_page: u32) -> u32 {
    if total <= 0 {
        return 1;
    }
    let per_page = i64::from(per_page);
    ((total + per_page - 1) / per_page) as u32
}

/// One page of results, serialized as the `page_obj` of a list context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Items for current page
    pub items: Vec<T>,
    /// Total count across all pages
    pub total: i64,
    /// Current page number
    pub page: u32,
    /// Items per page
    pub per_page: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, pagination: Pagination) -> Self {
        let total_pages = total_pages(total, pagination.per_page);
        Self {
            items,
            total,
            page: pagination.page,
            per_page: pagination.per_page,
            total_pages,
            has_next: pagination.page < total_pages,
            has_prev: pagination.page > 1,
        }
    }

    /// Convert the items while keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_prev: self.has_prev,
        }
    }
}

/// Query parameters for pagination
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    /// Kept as a string so that junk values fall back to page 1
    pub page: Option<String>,
}

impl PageParams {
    pub fn requested(&self) -> Option<&str> {
        self.page.as_deref()
    }
}
