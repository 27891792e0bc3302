//! Process-local backend.
//!
//! Tables live in a [`DashMap`] keyed by table name; each table is a map
//! from id to row. Every write to a row happens under that table's shard
//! lock, so a patch is applied all-or-nothing. Ordering follows PostgreSQL
//! defaults (`NULLS LAST` ascending, `NULLS FIRST` descending) so results
//! match the SQL backends.
//!
//! Latency and outage injection exist for tests of timeout and retry paths.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{self, AtomicBool, AtomicU64};
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use grc_core::error::AppError;
use grc_core::query::predicate::scalar_text;
use grc_core::query::{Predicate, QueryPlan};
use grc_core::result::AppResult;
use grc_core::traits::{Backend, Row};
use grc_core::types::{SortDirection, SortField};

/// In-memory [`Backend`] implementation.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: DashMap<&'static str, HashMap<Uuid, Row>>,
    latency_ms: AtomicU64,
    unavailable: AtomicBool,
    writes: AtomicU64,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every subsequent call by `latency`. A call reads the value when
    /// it starts, so changing it does not affect calls already in flight.
    pub fn set_latency(&self, latency: Duration) {
        let millis = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.latency_ms.store(millis, atomic::Ordering::SeqCst);
    }

    /// Make every subsequent call fail with a repository error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, atomic::Ordering::SeqCst);
    }

    /// Number of write calls (insert, update, delete) served so far.
    pub fn writes(&self) -> u64 {
        self.writes.load(atomic::Ordering::SeqCst)
    }

    /// Load rows directly, bypassing latency, outage and write counting.
    /// Every row must carry a UUID `id`.
    pub fn seed(&self, table: &'static str, rows: impl IntoIterator<Item = Row>) -> AppResult<()> {
        let mut entry = self.tables.entry(table).or_default();
        for row in rows {
            let id = row_id(&row)?;
            entry.insert(id, row);
        }
        Ok(())
    }

    /// Snapshot of every row of a table, in no particular order.
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .get(table)
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default()
    }

    async fn simulate(&self, operation: &'static str) -> AppResult<()> {
        let latency = self.latency_ms.load(atomic::Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.unavailable.load(atomic::Ordering::SeqCst) {
            return Err(AppError::repository(format!(
                "memory backend unavailable during {operation}"
            )));
        }
        Ok(())
    }

    fn matching(&self, table: &str, predicates: &[Predicate]) -> Vec<Row> {
        self.tables
            .get(table)
            .map(|t| {
                t.values()
                    .filter(|row| predicates.iter().all(|p| p.matches(row)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, atomic::Ordering::SeqCst);
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn select(&self, table: &'static str, plan: &QueryPlan) -> AppResult<Vec<Row>> {
        self.simulate("select").await?;
        let mut rows = self.matching(table, &plan.predicates);
        rows.sort_by(|a, b| compare_rows(a, b, &plan.order));
        let offset = usize::try_from(plan.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(plan.limit).unwrap_or(usize::MAX);
        debug!(table, matched = rows.len(), offset, limit, "Memory select");
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, table: &'static str, predicates: &[Predicate]) -> AppResult<u64> {
        self.simulate("count").await?;
        Ok(self.matching(table, predicates).len() as u64)
    }

    async fn count_by(
        &self,
        table: &'static str,
        predicates: &[Predicate],
        column: &'static str,
    ) -> AppResult<BTreeMap<String, u64>> {
        self.simulate("count_by").await?;
        let mut counts = BTreeMap::new();
        for row in self.matching(table, predicates) {
            if let Some(key) = row.get(column).and_then(scalar_text) {
                *counts.entry(key).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    async fn fetch(&self, table: &'static str, id: Uuid) -> AppResult<Option<Row>> {
        self.simulate("fetch").await?;
        Ok(self.tables.get(table).and_then(|t| t.get(&id).cloned()))
    }

    async fn insert(&self, table: &'static str, row: Row) -> AppResult<Row> {
        self.simulate("insert").await?;
        let id = row_id(&row)?;
        let mut entry = self.tables.entry(table).or_default();
        if entry.contains_key(&id) {
            return Err(AppError::repository(format!(
                "duplicate key value violates unique constraint on {table}.id"
            )));
        }
        entry.insert(id, row.clone());
        self.record_write();
        Ok(row)
    }

    async fn update(&self, table: &'static str, id: Uuid, patch: Row) -> AppResult<Option<Row>> {
        self.simulate("update").await?;
        let Some(mut entry) = self.tables.get_mut(table) else {
            return Ok(None);
        };
        let Some(row) = entry.get_mut(&id) else {
            return Ok(None);
        };
        row.extend(patch);
        let updated = row.clone();
        drop(entry);
        self.record_write();
        Ok(Some(updated))
    }

    async fn delete(&self, table: &'static str, id: Uuid) -> AppResult<bool> {
        self.simulate("delete").await?;
        let removed = self
            .tables
            .get_mut(table)
            .is_some_and(|mut t| t.remove(&id).is_some());
        if removed {
            self.record_write();
        }
        Ok(removed)
    }
}

fn row_id(row: &Row) -> AppResult<Uuid> {
    row.get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| AppError::internal("row is missing a UUID id"))
}

fn compare_rows(a: &Row, b: &Row, order: &[SortField]) -> Ordering {
    order
        .iter()
        .map(|key| compare_column(a.get(&key.field), b.get(&key.field), key.direction))
        .find(|o| *o != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

/// Nulls sort as the largest value, as in PostgreSQL.
fn compare_column(a: Option<&Value>, b: Option<&Value>, direction: SortDirection) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    let ordering = match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => compare_scalar(a, b),
    };
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

fn compare_scalar(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => {
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => scalar_text(a).cmp(&scalar_text(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grc_core::types::PageRequest;
    use serde_json::json;

    const TABLE: &str = "findings";

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    fn finding(title: &str, score: Option<f64>, created_at: &str) -> Row {
        row(json!({
            "id": Uuid::new_v4().to_string(),
            "title": title,
            "score": score,
            "created_at": created_at,
        }))
    }

    fn plan(order: Vec<SortField>, offset: u64, limit: u64) -> QueryPlan {
        QueryPlan {
            predicates: Vec::new(),
            order,
            offset,
            limit,
            page: PageRequest::new(1, limit, 200),
        }
    }

    fn seeded() -> MemoryBackend {
        let backend = MemoryBackend::new();
        backend
            .seed(
                TABLE,
                [
                    finding("b", Some(7.5), "2024-01-02T00:00:00Z"),
                    finding("a", None, "2024-01-03T00:00:00Z"),
                    finding("c", Some(10.0), "2024-01-01T00:00:00+00:00"),
                ],
            )
            .unwrap();
        backend
    }

    fn titles(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(|r| r["title"].as_str().unwrap()).collect()
    }

    #[tokio::test]
    async fn test_select_orders_nulls_like_postgres() {
        let backend = seeded();
        let asc = backend
            .select(TABLE, &plan(vec![SortField::asc("score")], 0, 10))
            .await
            .unwrap();
        assert_eq!(titles(&asc), vec!["b", "c", "a"]);

        let desc = backend
            .select(TABLE, &plan(vec![SortField::desc("score")], 0, 10))
            .await
            .unwrap();
        assert_eq!(titles(&desc), vec!["a", "c", "b"]);
    }

    #[tokio::test]
    async fn test_select_compares_timestamps_not_text() {
        let backend = seeded();
        let rows = backend
            .select(TABLE, &plan(vec![SortField::desc("created_at")], 0, 10))
            .await
            .unwrap();
        assert_eq!(titles(&rows), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_select_windows_after_sorting() {
        let backend = seeded();
        let rows = backend
            .select(TABLE, &plan(vec![SortField::asc("title")], 1, 1))
            .await
            .unwrap();
        assert_eq!(titles(&rows), vec!["b"]);
    }

    #[tokio::test]
    async fn test_count_by_skips_nulls() {
        let backend = MemoryBackend::new();
        backend
            .seed(
                TABLE,
                [
                    row(json!({"id": Uuid::new_v4().to_string(), "severity": "high"})),
                    row(json!({"id": Uuid::new_v4().to_string(), "severity": "high"})),
                    row(json!({"id": Uuid::new_v4().to_string(), "severity": "low"})),
                    row(json!({"id": Uuid::new_v4().to_string(), "severity": null})),
                ],
            )
            .unwrap();
        let counts = backend.count_by(TABLE, &[], "severity").await.unwrap();
        assert_eq!(counts.get("high"), Some(&2));
        assert_eq!(counts.get("low"), Some(&1));
        assert_eq!(counts.len(), 2);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_rows() {
        let backend = MemoryBackend::new();
        let id = Uuid::new_v4();
        assert!(backend.update(TABLE, id, Row::new()).await.unwrap().is_none());
        assert!(!backend.delete(TABLE, id).await.unwrap());
        assert_eq!(backend.writes(), 0);
    }

    #[tokio::test]
    async fn test_update_applies_whole_patch() {
        let backend = MemoryBackend::new();
        let id = Uuid::new_v4();
        backend
            .insert(TABLE, row(json!({"id": id.to_string(), "status": "open", "closed_at": null})))
            .await
            .unwrap();
        let updated = backend
            .update(
                TABLE,
                id,
                row(json!({"status": "closed", "closed_at": "2024-01-01T00:00:00Z"})),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated["status"], "closed");
        assert_eq!(updated["closed_at"], "2024-01-01T00:00:00Z");
        assert_eq!(backend.writes(), 2);
    }

    #[tokio::test]
    async fn test_unavailable_fails_every_call() {
        let backend = seeded();
        backend.set_unavailable(true);
        let err = backend.count(TABLE, &[]).await.unwrap_err();
        assert!(err.is_retryable());
        backend.set_unavailable(false);
        assert_eq!(backend.count(TABLE, &[]).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let backend = MemoryBackend::new();
        let r = row(json!({"id": Uuid::new_v4().to_string()}));
        backend.insert(TABLE, r.clone()).await.unwrap();
        assert!(backend.insert(TABLE, r).await.is_err());
    }
}
