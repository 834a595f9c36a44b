//! Pagination types for list queries.

use serde::{Deserialize, Serialize};

/// Default page size.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// A zero-based page window.
///
/// Out-of-range input is corrected rather than rejected: a negative index
/// becomes 0 and a size below 1 becomes 1. Callers rely on this, so it is
/// kept even though it hides their mistakes; [`PageRequest::was_clamped`]
/// reports when a correction happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page index (0-based).
    pub page_index: u64,
    /// Number of items per page (at least 1).
    pub page_size: u64,
    #[serde(skip)]
    clamped: bool,
}

impl PageRequest {
    /// Create a new page request, clamping out-of-range values.
    pub fn new(page_index: i64, page_size: i64) -> Self {
        let index = page_index.max(0);
        let size = page_size.max(1);
        Self {
            page_index: index as u64,
            page_size: size as u64,
            clamped: index != page_index || size != page_size,
        }
    }

    /// Whether the constructor had to correct the caller's input.
    pub fn was_clamped(&self) -> bool {
        self.clamped
    }

    /// The number of rows to skip.
    pub fn offset(&self) -> u64 {
        self.page_index.saturating_mul(self.page_size)
    }

    /// The maximum number of rows to return.
    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
            clamped: false,
        }
    }
}

/// A bounded window of a larger result set plus pagination metadata.
///
/// `total_count` counts every row matching the query's filter regardless
/// of the window; `total_pages` is derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Page index (0-based).
    pub page_index: u64,
    /// Number of items per page.
    pub page_size: u64,
    /// Total number of matching items across all pages.
    pub total_count: u64,
    /// Total number of pages.
    pub total_pages: u64,
    /// Whether there is a previous page.
    pub has_previous_page: bool,
    /// Whether there is a next page.
    pub has_next_page: bool,
}

impl<T> Page<T> {
    /// Create a page from fetched items and the unwindowed match count.
    pub fn new(items: Vec<T>, request: &PageRequest, total_count: u64) -> Self {
        let total_pages = total_count.div_ceil(request.page_size);
        Self {
            items,
            page_index: request.page_index,
            page_size: request.page_size,
            total_count,
            total_pages,
            has_previous_page: request.page_index > 0,
            has_next_page: request.page_index + 1 < total_pages,
        }
    }

    /// Create an empty page for the given request.
    pub fn empty(request: &PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }

    /// Transform every item while keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page_index: self.page_index,
            page_size: self.page_size,
            total_count: self.total_count,
            total_pages: self.total_pages,
            has_previous_page: self.has_previous_page,
            has_next_page: self.has_next_page,
        }
    }

    /// Number of items on this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this page holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
