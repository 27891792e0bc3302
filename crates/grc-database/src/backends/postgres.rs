//! PostgreSQL backend.
//!
//! Plans are rendered into parameterized SQL. Identifiers come from entity
//! declarations and are always double-quoted; every value is bound. Rows
//! travel as `jsonb` (`to_jsonb(t)` on the way out, `jsonb_populate_record`
//! on the way in) so one implementation serves every table.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgArguments;
use sqlx::{Arguments, Encode, PgPool, Postgres, Type};
use tracing::debug;
use uuid::Uuid;

use grc_core::error::{AppError, ErrorKind};
use grc_core::query::{Predicate, QueryPlan};
use grc_core::result::AppResult;
use grc_core::traits::{Backend, Row};

/// [`Backend`] over a sqlx PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    /// Create a backend using an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Positional parameters collected while rendering a statement.
#[derive(Default)]
struct Params {
    args: PgArguments,
    count: usize,
}

impl Params {
    /// Bind a value and return its placeholder.
    fn push<'q, T>(&mut self, value: T) -> AppResult<String>
    where
        T: 'q + Encode<'q, Postgres> + Type<Postgres>,
    {
        self.args
            .add(value)
            .map_err(|e| AppError::internal(format!("Failed to bind query parameter: {e}")))?;
        self.count += 1;
        Ok(format!("${}", self.count))
    }
}

/// `"name"`, with embedded quotes doubled.
fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Escape `LIKE` metacharacters so the needle matches literally.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Render predicates as a `WHERE` clause (empty when there are none).
fn where_clause(predicates: &[Predicate], params: &mut Params) -> AppResult<String> {
    let mut conditions = Vec::with_capacity(predicates.len());
    for predicate in predicates {
        let condition = match predicate {
            Predicate::In { column, values } => {
                let placeholder = params.push(values.clone())?;
                format!("t.{}::text = ANY({placeholder})", quote(column))
            }
            Predicate::Between { column, start, end } => {
                let start = params.push(*start)?;
                let end = params.push(*end)?;
                format!("t.{} BETWEEN {start} AND {end}", quote(column))
            }
            Predicate::AnyContains { columns, needle } => {
                let placeholder = params.push(like_pattern(needle))?;
                let alternatives: Vec<String> = columns
                    .iter()
                    .map(|c| format!("t.{} ILIKE {placeholder}", quote(c)))
                    .collect();
                format!("({})", alternatives.join(" OR "))
            }
        };
        conditions.push(condition);
    }

    if conditions.is_empty() {
        Ok(String::new())
    } else {
        Ok(format!(" WHERE {}", conditions.join(" AND ")))
    }
}

fn order_clause(plan: &QueryPlan) -> String {
    let keys: Vec<String> = plan
        .order
        .iter()
        .map(|key| format!("t.{} {}", quote(&key.field), key.direction.as_sql()))
        .collect();
    if keys.is_empty() {
        String::new()
    } else {
        format!(" ORDER BY {}", keys.join(", "))
    }
}

fn db_error(message: &str, e: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Repository, format!("{message}: {e}"), e)
}

fn into_row(value: Value) -> AppResult<Row> {
    match value {
        Value::Object(row) => Ok(row),
        other => Err(AppError::serialization(format!(
            "Expected a row object, got {other}"
        ))),
    }
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl Backend for PgBackend {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn select(&self, table: &'static str, plan: &QueryPlan) -> AppResult<Vec<Row>> {
        let mut params = Params::default();
        let filter = where_clause(&plan.predicates, &mut params)?;
        let limit = params.push(to_i64(plan.limit))?;
        let offset = params.push(to_i64(plan.offset))?;
        let sql = format!(
            "SELECT to_jsonb(t) FROM {} AS t{filter}{} LIMIT {limit} OFFSET {offset}",
            quote(table),
            order_clause(plan),
        );
        debug!(table, sql = %sql, "Executing select");

        let rows = sqlx::query_scalar_with::<_, Value, _>(&sql, params.args)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to select rows", e))?;
        rows.into_iter().map(into_row).collect()
    }

    async fn count(&self, table: &'static str, predicates: &[Predicate]) -> AppResult<u64> {
        let mut params = Params::default();
        let filter = where_clause(predicates, &mut params)?;
        let sql = format!("SELECT COUNT(*) FROM {} AS t{filter}", quote(table));

        let total: i64 = sqlx::query_scalar_with(&sql, params.args)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to count rows", e))?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn count_by(
        &self,
        table: &'static str,
        predicates: &[Predicate],
        column: &'static str,
    ) -> AppResult<BTreeMap<String, u64>> {
        let mut params = Params::default();
        let filter = where_clause(predicates, &mut params)?;
        let column = quote(column);
        let not_null = if filter.is_empty() {
            format!(" WHERE t.{column} IS NOT NULL")
        } else {
            format!("{filter} AND t.{column} IS NOT NULL")
        };
        let sql = format!(
            "SELECT t.{column}::text, COUNT(*) FROM {} AS t{not_null} GROUP BY 1",
            quote(table)
        );

        let groups: Vec<(String, i64)> = sqlx::query_as_with(&sql, params.args)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to group rows", e))?;
        Ok(groups
            .into_iter()
            .map(|(key, n)| (key, u64::try_from(n).unwrap_or(0)))
            .collect())
    }

    async fn fetch(&self, table: &'static str, id: Uuid) -> AppResult<Option<Row>> {
        let sql = format!("SELECT to_jsonb(t) FROM {} AS t WHERE t.\"id\" = $1", quote(table));
        let row: Option<Value> = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to fetch row", e))?;
        row.map(into_row).transpose()
    }

    async fn insert(&self, table: &'static str, row: Row) -> AppResult<Row> {
        let columns: Vec<String> = row.keys().map(|c| quote(c)).collect();
        let columns = columns.join(", ");
        let sql = format!(
            "INSERT INTO {table_q} AS t ({columns}) \
             SELECT {columns} FROM jsonb_populate_record(NULL::{table_q}, $1) \
             RETURNING to_jsonb(t)",
            table_q = quote(table),
        );

        let inserted: Value = sqlx::query_scalar(&sql)
            .bind(Value::Object(row))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to insert row", e))?;
        into_row(inserted)
    }

    async fn update(&self, table: &'static str, id: Uuid, patch: Row) -> AppResult<Option<Row>> {
        if patch.is_empty() {
            return self.fetch(table, id).await;
        }
        let assignments: Vec<String> = patch
            .keys()
            .map(|c| format!("{col} = r.{col}", col = quote(c)))
            .collect();
        let sql = format!(
            "UPDATE {table_q} AS t SET {} \
             FROM jsonb_populate_record(NULL::{table_q}, $2) AS r \
             WHERE t.\"id\" = $1 RETURNING to_jsonb(t)",
            assignments.join(", "),
            table_q = quote(table),
        );

        let updated: Option<Value> = sqlx::query_scalar(&sql)
            .bind(id)
            .bind(Value::Object(patch))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to update row", e))?;
        updated.map(into_row).transpose()
    }

    async fn delete(&self, table: &'static str, id: Uuid) -> AppResult<bool> {
        let sql = format!("DELETE FROM {} WHERE \"id\" = $1", quote(table));
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete row", e))?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grc_core::query::{RangeEdge, parse_timestamp};
    use grc_core::types::{PageRequest, SortField};

    #[test]
    fn test_quote_doubles_embedded_quotes() {
        assert_eq!(quote("status"), "\"status\"");
        assert_eq!(quote("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("sql"), "%sql%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_where_clause_numbers_parameters() {
        let predicates = vec![
            Predicate::AnyContains {
                columns: &["title", "description"],
                needle: "sql".into(),
            },
            Predicate::In {
                column: "severity",
                values: vec!["high".into(), "critical".into()],
            },
            Predicate::Between {
                column: "due_date",
                start: parse_timestamp("2024-01-01", RangeEdge::Start).unwrap(),
                end: parse_timestamp("2024-01-31", RangeEdge::End).unwrap(),
            },
        ];
        let mut params = Params::default();
        let clause = where_clause(&predicates, &mut params).unwrap();
        assert_eq!(
            clause,
            " WHERE (t.\"title\" ILIKE $1 OR t.\"description\" ILIKE $1) \
             AND t.\"severity\"::text = ANY($2) \
             AND t.\"due_date\" BETWEEN $3 AND $4"
        );
        assert_eq!(params.count, 4);
    }

    #[test]
    fn test_empty_predicates_have_no_where() {
        let mut params = Params::default();
        assert_eq!(where_clause(&[], &mut params).unwrap(), "");
    }

    #[test]
    fn test_order_clause_keeps_plan_order() {
        let plan = QueryPlan {
            predicates: Vec::new(),
            order: vec![SortField::desc("created_at"), SortField::asc("id")],
            offset: 0,
            limit: 25,
            page: PageRequest::new(1, 25, 200),
        };
        assert_eq!(order_clause(&plan), " ORDER BY t.\"created_at\" DESC, t.\"id\" ASC");
    }
}
