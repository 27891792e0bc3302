//! The seam between repositories and whatever stores the rows.

use std::collections::BTreeMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::query::{Predicate, QueryPlan};
use crate::result::AppResult;

/// One table row as a JSON object keyed by column name.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Table-scoped access to a relational backend.
///
/// Repositories receive an implementation by injection and never build one
/// themselves, so tests can substitute an in-memory backend. Implementations
/// translate plans into their native query form and report failures as
/// [`ErrorKind::Repository`](crate::error::ErrorKind::Repository); they do
/// not retry.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    /// Short name of the implementation, for logs.
    fn name(&self) -> &'static str;

    /// Rows matching the plan's predicates, ordered and windowed.
    async fn select(&self, table: &'static str, plan: &QueryPlan) -> AppResult<Vec<Row>>;

    /// Exact number of rows matching all predicates.
    async fn count(&self, table: &'static str, predicates: &[Predicate]) -> AppResult<u64>;

    /// Row counts grouped by `column` over rows matching all predicates.
    /// Rows whose column is null are not counted.
    async fn count_by(
        &self,
        table: &'static str,
        predicates: &[Predicate],
        column: &'static str,
    ) -> AppResult<BTreeMap<String, u64>>;

    /// The row with the given id, if any.
    async fn fetch(&self, table: &'static str, id: Uuid) -> AppResult<Option<Row>>;

    /// Insert a complete row and return it as stored.
    async fn insert(&self, table: &'static str, row: Row) -> AppResult<Row>;

    /// Apply every column of `patch` to the row in a single write and
    /// return the updated row, or `None` when no row has that id.
    async fn update(&self, table: &'static str, id: Uuid, patch: Row) -> AppResult<Option<Row>>;

    /// Remove the row; `false` when no row had that id.
    async fn delete(&self, table: &'static str, id: Uuid) -> AppResult<bool>;
}
