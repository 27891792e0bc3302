//! The search request every list view sends to a repository.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::filter::FilterInput;
use super::sorting::SortDirection;

/// `{query, filters, sort_by, sort_order, page, page_size}` as sent by a
/// list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text search across the entity's text columns.
    #[serde(default)]
    pub query: Option<String>,
    /// Filter field name to raw value.
    #[serde(default)]
    pub filters: BTreeMap<String, FilterInput>,
    /// Sort column; `created_at` when absent.
    #[serde(default)]
    pub sort_by: Option<String>,
    /// Sort direction; descending when `sort_by` is absent, ascending otherwise.
    #[serde(default)]
    pub sort_order: Option<SortDirection>,
    /// Page number (1-based).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Records per page; the configured default when absent.
    #[serde(default)]
    pub page_size: Option<u64>,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            query: None,
            filters: BTreeMap::new(),
            sort_by: None,
            sort_order: None,
            page: default_page(),
            page_size: None,
        }
    }
}

impl SearchRequest {
    /// Start an unfiltered request for the first page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the free-text query.
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Add or replace a filter.
    pub fn filter(mut self, field: impl Into<String>, input: FilterInput) -> Self {
        self.filters.insert(field.into(), input);
        self
    }

    /// Set the sort column and direction.
    pub fn sort(mut self, field: impl Into<String>, order: SortDirection) -> Self {
        self.sort_by = Some(field.into());
        self.sort_order = Some(order);
        self
    }

    /// Set page coordinates.
    pub fn page(mut self, page: u64, page_size: u64) -> Self {
        self.page = page;
        self.page_size = Some(page_size);
        self
    }
}

fn default_page() -> u64 {
    1
}
