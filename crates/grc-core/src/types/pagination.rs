//! Pagination types for list requests and responses.

use serde::{Deserialize, Serialize};

/// Clamped page coordinates derived from a search request.
///
/// Out-of-range values are clamped rather than rejected so that a UI
/// holding a stale page number keeps working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-based).
    pub page: u64,
    /// Number of items per page.
    pub page_size: u64,
}

impl PageRequest {
    /// Create a page request, clamping `page >= 1` and
    /// `page_size` into `1..=max_page_size`.
    pub fn new(page: u64, page_size: u64, max_page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, max_page_size.max(1)),
        }
    }

    /// Calculate the `OFFSET` value.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Return the `LIMIT` value.
    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

/// One bounded slice of a larger result set.
///
/// Serialized with the keys list views bind to:
/// `data`, `total`, `page`, `pageSize`, `totalPages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// The records on this page, in plan order.
    pub data: Vec<T>,
    /// Exact number of matching records across all pages.
    pub total: u64,
    /// Current page number (1-based).
    pub page: u64,
    /// Number of records per page.
    pub page_size: u64,
    /// `ceil(total / page_size)`; zero exactly when `total` is zero.
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Build a page, truncating `data` to `page_size`.
    pub fn new(mut data: Vec<T>, request: PageRequest, total: u64) -> Self {
        let page_size = request.page_size.max(1);
        data.truncate(usize::try_from(page_size).unwrap_or(usize::MAX));
        Self {
            data,
            total,
            page: request.page,
            page_size,
            total_pages: total.div_ceil(page_size),
        }
    }

    /// An empty page for the given coordinates.
    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }

    /// Whether a page exists after this one.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Whether a page exists before this one.
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Transform the records while keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}
