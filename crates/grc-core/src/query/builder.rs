//! Paginated query builder.
//!
//! Turns a [`SearchRequest`] plus an entity's [`FilterSpec`] into a
//! [`QueryPlan`]: an ordered predicate list, a total order and an
//! offset/limit window. The plan is independent of the backend that will
//! execute it.

use serde::Serialize;
use tracing::debug;

use super::predicate::Predicate;
use super::spec::{FilterSpec, Resolution};
use crate::config::{PAGE_SIZE_CEILING, QueryConfig};
use crate::error::AppError;
use crate::result::AppResult;
use crate::types::pagination::PageRequest;
use crate::types::search::SearchRequest;
use crate::types::sorting::{SortDirection, SortField};

/// Column every plan falls back to when no sort is requested.
pub const DEFAULT_SORT_COLUMN: &str = "created_at";

/// Unique column appended as the final sort key.
pub const TIE_BREAK_COLUMN: &str = "id";

/// A backend-independent description of one page query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPlan {
    /// Conjunction of predicates, free-text first then filters by name.
    pub predicates: Vec<Predicate>,
    /// Sort keys, always ending with `id ASC`.
    pub order: Vec<SortField>,
    /// Rows to skip.
    pub offset: u64,
    /// Maximum rows to return.
    pub limit: u64,
    /// The clamped page coordinates the window was computed from.
    #[serde(skip)]
    pub page: PageRequest,
}

/// Builds query plans under the configured page-size bounds.
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder {
    default_page_size: u64,
    max_page_size: u64,
}

impl QueryBuilder {
    /// Create a builder that clamps page sizes to `max_page_size`, itself
    /// held to [`PAGE_SIZE_CEILING`]. Requests without a page size get
    /// `default_page_size`, clamped the same way.
    pub fn new(default_page_size: u64, max_page_size: u64) -> Self {
        let max_page_size = max_page_size.clamp(1, PAGE_SIZE_CEILING);
        Self {
            default_page_size: default_page_size.clamp(1, max_page_size),
            max_page_size,
        }
    }

    /// Create a builder from the query configuration section.
    pub fn from_config(config: &QueryConfig) -> Self {
        Self::new(config.default_page_size, config.max_page_size)
    }

    /// The page-size bound in effect.
    pub fn max_page_size(&self) -> u64 {
        self.max_page_size
    }

    /// Page size used when a request leaves it out.
    pub fn default_page_size(&self) -> u64 {
        self.default_page_size
    }

    /// Resolve only the predicates of a request (search text and filters).
    ///
    /// Fails with a validation error on the first rejected filter; nothing
    /// partial is returned.
    pub fn predicates(&self, request: &SearchRequest, spec: &FilterSpec) -> AppResult<Vec<Predicate>> {
        let mut predicates = Vec::with_capacity(request.filters.len() + 1);

        if let Some(predicate) = request.query.as_deref().and_then(|q| spec.search(q)) {
            predicates.push(predicate);
        }

        for (name, raw) in &request.filters {
            match spec.resolve(name, raw) {
                Resolution::Predicate(predicate) => predicates.push(predicate),
                Resolution::Rejected(reason) => return Err(AppError::validation(reason)),
            }
        }

        Ok(predicates)
    }

    /// Build the full plan for a request.
    pub fn build(&self, request: &SearchRequest, spec: &FilterSpec) -> AppResult<QueryPlan> {
        let predicates = self.predicates(request, spec)?;
        let order = Self::order(request, spec)?;
        let page_size = request.page_size.unwrap_or(self.default_page_size);
        let page = PageRequest::new(request.page, page_size, self.max_page_size);

        let plan = QueryPlan {
            predicates,
            order,
            offset: page.offset(),
            limit: page.limit(),
            page,
        };
        debug!(
            entity = spec.entity,
            predicates = plan.predicates.len(),
            offset = plan.offset,
            limit = plan.limit,
            "Built query plan"
        );
        Ok(plan)
    }

    fn order(request: &SearchRequest, spec: &FilterSpec) -> AppResult<Vec<SortField>> {
        let primary = match request.sort_by.as_deref().map(str::trim) {
            None | Some("") => SortField::new(
                DEFAULT_SORT_COLUMN,
                request.sort_order.unwrap_or(SortDirection::Desc),
            ),
            Some(column) => {
                let column = spec.sort_column(column).ok_or_else(|| {
                    AppError::validation(format!(
                        "'{column}' is not a sortable field of {}",
                        spec.entity
                    ))
                })?;
                SortField::new(column, request.sort_order.unwrap_or(SortDirection::Asc))
            }
        };

        let mut order = Vec::with_capacity(2);
        let needs_tie_break = primary.field != TIE_BREAK_COLUMN;
        order.push(primary);
        if needs_tie_break {
            order.push(SortField::asc(TIE_BREAK_COLUMN));
        }
        Ok(order)
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::from_config(&QueryConfig::default())
    }
}
