//! The generic entity repository.
//!
//! One [`EntityRepository`] per entity type is the only thing allowed to
//! talk to the backend for that type. It resolves filters through the
//! entity's declaration, owns the server-managed columns and applies status
//! side effects in the same write as the status.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use validator::Validate;

use grc_core::config::QueryConfig;
use grc_core::error::{AppError, ErrorKind};
use grc_core::query::QueryBuilder;
use grc_core::result::AppResult;
use grc_core::traits::{Backend, Row};
use grc_core::types::{Page, SearchRequest};
use grc_entity::entity::{
    Entity, STATUS_COLUMN, StatusTransition, is_server_managed, timestamp_value,
};

/// Typed access to one entity's table.
pub struct EntityRepository<E: Entity> {
    backend: Arc<dyn Backend>,
    builder: QueryBuilder,
    timeout: Duration,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for EntityRepository<E> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            builder: self.builder,
            timeout: self.timeout,
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> fmt::Debug for EntityRepository<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRepository")
            .field("entity", &E::NAME)
            .field("backend", &self.backend.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl<E: Entity> EntityRepository<E> {
    /// Create a repository over an injected backend.
    pub fn new(backend: Arc<dyn Backend>, config: &QueryConfig) -> Self {
        Self {
            backend,
            builder: QueryBuilder::from_config(config),
            timeout: config.request_timeout(),
            _entity: PhantomData,
        }
    }

    /// Override the per-call time bound.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The per-call time bound.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// One page of records matching the request, with an exact total.
    pub async fn list(&self, request: &SearchRequest) -> AppResult<Page<E>> {
        let plan = self
            .builder
            .build(request, E::filter_spec())
            .map_err(|e| e.in_operation("list", E::NAME))?;

        let (rows, total) = self
            .bounded("list", async {
                tokio::try_join!(
                    self.backend.select(E::TABLE, &plan),
                    self.backend.count(E::TABLE, &plan.predicates),
                )
            })
            .await?;

        let data = rows
            .into_iter()
            .map(decode::<E>)
            .collect::<AppResult<Vec<_>>>()
            .map_err(|e| e.in_operation("list", E::NAME))?;
        Ok(Page::new(data, plan.page, total))
    }

    /// Every record matching the request's filters, fetched page by page.
    pub async fn list_all(&self, request: &SearchRequest) -> AppResult<Vec<E>> {
        let page_size = self.builder.max_page_size();
        let mut records = Vec::new();
        let mut page = 1;
        loop {
            let batch = self
                .list(&request.clone().page(page, page_size))
                .await?;
            let last = !batch.has_next();
            records.extend(batch.data);
            if last {
                return Ok(records);
            }
            page += 1;
        }
    }

    /// The record with the given id.
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<E> {
        let row = self
            .bounded("get_by_id", self.backend.fetch(E::TABLE, id))
            .await?
            .ok_or_else(|| not_found::<E>(id).in_operation("get_by_id", E::NAME))?;
        decode::<E>(row).map_err(|e| e.in_operation("get_by_id", E::NAME))
    }

    /// Insert a new record. The repository assigns `id`, `created_at`,
    /// `updated_at`, generated codes and the stamps of the initial status.
    pub async fn create(&self, input: &E::Create) -> AppResult<E> {
        input
            .validate()
            .map_err(|e| AppError::from(e).in_operation("create", E::NAME))?;

        let mut row = to_row(input).map_err(|e| e.in_operation("create", E::NAME))?;
        check_writable::<E>(&row, true).map_err(|e| e.in_operation("create", E::NAME))?;

        let now = Utc::now();
        let id = Uuid::new_v4();
        row.insert("id".to_string(), Value::String(id.to_string()));
        row.insert("created_at".to_string(), timestamp_value(now));
        row.insert("updated_at".to_string(), timestamp_value(now));
        row.extend(E::generate(now));

        let initial = row
            .get(STATUS_COLUMN)
            .and_then(Value::as_str)
            .map(str::to_string);
        if let Some(label) = initial {
            let status: E::Status = label
                .parse()
                .map_err(|e: AppError| e.in_operation("create", E::NAME))?;
            let transition = StatusTransition::plan::<E>(id, status, &row, now);
            for (column, at) in transition.side_effects {
                row.insert(column.to_string(), timestamp_value(at));
            }
        }

        let stored = self
            .bounded("create", self.backend.insert(E::TABLE, row))
            .await?;
        info!(entity = E::NAME, id = %id, "Created record");
        decode::<E>(stored).map_err(|e| e.in_operation("create", E::NAME))
    }

    /// Apply a typed partial update. Absent fields are left untouched.
    pub async fn update(&self, id: Uuid, changes: &E::Update) -> AppResult<E> {
        changes
            .validate()
            .map_err(|e| AppError::from(e).in_operation("update", E::NAME))?;
        let fields = to_row(changes).map_err(|e| e.in_operation("update", E::NAME))?;
        self.update_fields(id, fields).await
    }

    /// Apply a raw partial update. Server-managed, stamped, status and
    /// undeclared columns are rejected; `updated_at` is refreshed. Values
    /// must satisfy the entity's update rules and leave a record that still
    /// decodes, otherwise nothing is written.
    pub async fn update_fields(&self, id: Uuid, fields: Row) -> AppResult<E> {
        const OP: &str = "update";

        if fields.is_empty() {
            return Err(AppError::validation("No fields to update").in_operation(OP, E::NAME));
        }
        check_writable::<E>(&fields, false).map_err(|e| e.in_operation(OP, E::NAME))?;
        check_update_rules::<E>(&fields).map_err(|e| e.in_operation(OP, E::NAME))?;

        let current = self
            .bounded(OP, self.backend.fetch(E::TABLE, id))
            .await?
            .ok_or_else(|| not_found::<E>(id).in_operation(OP, E::NAME))?;

        let mut patch = fields;
        patch.insert("updated_at".to_string(), timestamp_value(Utc::now()));
        check_merged::<E>(&current, &patch).map_err(|e| e.in_operation(OP, E::NAME))?;
        let columns: Vec<String> = patch.keys().cloned().collect();

        let row = self
            .bounded(OP, self.backend.update(E::TABLE, id, patch))
            .await?
            .ok_or_else(|| not_found::<E>(id).in_operation(OP, E::NAME))?;
        info!(entity = E::NAME, id = %id, columns = ?columns, "Updated record");
        decode::<E>(row).map_err(|e| e.in_operation(OP, E::NAME))
    }

    /// Move a record to `status`, stamping the status's timestamp columns
    /// that are still null. Status, stamps, `updated_at` and any `extra`
    /// fields go to the backend as one write.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: E::Status,
        extra: Option<Row>,
    ) -> AppResult<E> {
        const OP: &str = "update_status";

        if let Some(extra) = &extra {
            check_writable::<E>(extra, false).map_err(|e| e.in_operation(OP, E::NAME))?;
            check_update_rules::<E>(extra).map_err(|e| e.in_operation(OP, E::NAME))?;
        }

        let current = self
            .bounded(OP, self.backend.fetch(E::TABLE, id))
            .await?
            .ok_or_else(|| not_found::<E>(id).in_operation(OP, E::NAME))?;

        let now = Utc::now();
        let transition = StatusTransition::plan::<E>(id, status, &current, now);
        let stamped: Vec<&'static str> = transition.side_effects.keys().copied().collect();

        let mut patch = extra.unwrap_or_default();
        patch.extend(transition.into_patch());
        patch.insert("updated_at".to_string(), timestamp_value(now));
        check_merged::<E>(&current, &patch).map_err(|e| e.in_operation(OP, E::NAME))?;

        let row = self
            .bounded(OP, self.backend.update(E::TABLE, id, patch))
            .await?
            .ok_or_else(|| not_found::<E>(id).in_operation(OP, E::NAME))?;
        info!(
            entity = E::NAME,
            id = %id,
            status = %status,
            stamped = ?stamped,
            "Changed record status"
        );
        decode::<E>(row).map_err(|e| e.in_operation(OP, E::NAME))
    }

    /// Hard-delete a record. Missing ids fail with `NotFound` every time.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let removed = self
            .bounded("delete", self.backend.delete(E::TABLE, id))
            .await?;
        if !removed {
            return Err(not_found::<E>(id).in_operation("delete", E::NAME));
        }
        info!(entity = E::NAME, id = %id, "Deleted record");
        Ok(())
    }

    /// Record counts grouped by `field` over records matching the request's
    /// filters, computed by the backend. `field` must be a declared filter
    /// or sort field.
    pub async fn count_by(
        &self,
        field: &str,
        request: &SearchRequest,
    ) -> AppResult<BTreeMap<String, u64>> {
        let spec = E::filter_spec();
        let column = spec
            .field(field)
            .map(|f| f.column)
            .or_else(|| spec.sort_column(field))
            .ok_or_else(|| {
                AppError::validation(format!("'{field}' cannot be grouped for {}", E::NAME))
                    .in_operation("count_by", E::NAME)
            })?;
        let predicates = self
            .builder
            .predicates(request, spec)
            .map_err(|e| e.in_operation("count_by", E::NAME))?;

        self.bounded(
            "count_by",
            self.backend.count_by(E::TABLE, &predicates, column),
        )
        .await
    }

    /// Run one backend call under the time bound, attaching context to
    /// any failure.
    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        debug!(entity = E::NAME, operation, backend = self.backend.name(), "Backend call");
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                let e = match e.kind {
                    ErrorKind::Repository | ErrorKind::Timeout => e,
                    _ => AppError::with_source(
                        ErrorKind::Repository,
                        format!("Backend {} failed: {}", self.backend.name(), e.message),
                        e,
                    ),
                };
                error!(entity = E::NAME, operation, error = %e, "Backend call failed");
                Err(e.in_operation(operation, E::NAME))
            }
            Err(_) => {
                warn!(
                    entity = E::NAME,
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Backend call timed out"
                );
                Err(AppError::timeout(format!(
                    "{} {operation} exceeded {} ms",
                    E::NAME,
                    self.timeout.as_millis()
                ))
                .in_operation(operation, E::NAME))
            }
        }
    }
}

fn not_found<E: Entity>(id: Uuid) -> AppError {
    AppError::not_found(format!("{} {id} not found", E::NAME))
}

fn to_row<T: serde::Serialize>(value: &T) -> AppResult<Row> {
    match serde_json::to_value(value)? {
        Value::Object(row) => Ok(row),
        other => Err(AppError::serialization(format!(
            "Expected an object payload, got {other}"
        ))),
    }
}

fn decode<E: Entity>(row: Row) -> AppResult<E> {
    serde_json::from_value(Value::Object(row)).map_err(|e| {
        AppError::with_source(
            ErrorKind::Serialization,
            format!("Malformed {} row: {e}", E::NAME),
            e,
        )
    })
}

/// Run a raw patch through the entity's typed update payload so its
/// validation rules apply to the same fields as a typed update.
fn check_update_rules<E: Entity>(fields: &Row) -> AppResult<()> {
    let changes: E::Update = serde_json::from_value(Value::Object(fields.clone()))
        .map_err(|e| AppError::validation(format!("Invalid {} fields: {e}", E::NAME)))?;
    changes.validate()?;
    Ok(())
}

/// The stored row after `patch` must still decode as `E`.
fn check_merged<E: Entity>(current: &Row, patch: &Row) -> AppResult<()> {
    let mut merged = current.clone();
    merged.extend(patch.iter().map(|(k, v)| (k.clone(), v.clone())));
    serde_json::from_value::<E>(Value::Object(merged))
        .map(drop)
        .map_err(|e| AppError::validation(format!("Invalid {} fields: {e}", E::NAME)))
}

/// Reject columns the caller may not write. `status` is writable on create
/// only; later changes go through `update_status`.
fn check_writable<E: Entity>(row: &Row, allow_status: bool) -> AppResult<()> {
    for column in row.keys() {
        if is_server_managed::<E>(column) {
            return Err(AppError::validation(format!(
                "'{column}' is managed by the server and cannot be written"
            )));
        }
        if column == STATUS_COLUMN && !allow_status {
            return Err(AppError::validation(
                "'status' changes must go through update_status",
            ));
        }
        if !E::WRITABLE.contains(&column.as_str()) {
            return Err(AppError::validation(format!(
                "'{column}' is not a field of {}",
                E::NAME
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use grc_database::MemoryBackend;
    use grc_entity::incident::{CreateIncident, IncidentCategory, IncidentStatus};
    use grc_entity::severity::Severity;
    use serde_json::json;

    fn setup() -> (Arc<MemoryBackend>, EntityRepository<grc_entity::Incident>) {
        let backend = Arc::new(MemoryBackend::new());
        let repo = EntityRepository::new(backend.clone(), &QueryConfig::default());
        (backend, repo)
    }

    fn incident(title: &str, status: IncidentStatus) -> CreateIncident {
        CreateIncident {
            title: title.to_string(),
            description: None,
            severity: Severity::High,
            status,
            category: IncidentCategory::Phishing,
            reported_by: Some("soc".to_string()),
            assigned_to: None,
            affected_systems: vec!["mail-gw-01".to_string()],
            detected_at: None,
        }
    }

    fn fields(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_create_assigns_server_fields() {
        let (_, repo) = setup();
        let created = repo.create(&incident("Credential phish", IncidentStatus::Open)).await.unwrap();
        assert_eq!(created.created_at, created.updated_at);
        assert!(created.incident_number.starts_with("INC-"));
        assert!(created.resolved_at.is_none());
    }

    #[tokio::test]
    async fn test_create_in_stamped_status_stamps_once() {
        let (_, repo) = setup();
        let created = repo
            .create(&incident("Backfilled", IncidentStatus::Resolved))
            .await
            .unwrap();
        assert_eq!(created.resolved_at, Some(created.created_at));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_payload() {
        let (backend, repo) = setup();
        let err = repo.create(&incident("", IncidentStatus::Open)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.operation, Some("create"));
        assert_eq!(backend.writes(), 0);
    }

    #[tokio::test]
    async fn test_update_fields_rejects_protected_columns() {
        let (backend, repo) = setup();
        let created = repo.create(&incident("Phish", IncidentStatus::Open)).await.unwrap();

        for patch in [
            json!({"id": Uuid::new_v4().to_string()}),
            json!({"created_at": "2020-01-01T00:00:00Z"}),
            json!({"incident_number": "INC-1"}),
            json!({"resolved_at": "2020-01-01T00:00:00Z"}),
            json!({"status": "closed"}),
            json!({"password": "x"}),
            json!({}),
        ] {
            let err = repo.update_fields(created.id, fields(patch.clone())).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation, "{patch}");
        }
        assert_eq!(backend.writes(), 1);
    }

    #[tokio::test]
    async fn test_rejected_values_are_never_written() {
        let (backend, repo) = setup();
        let created = repo.create(&incident("Phish", IncidentStatus::Open)).await.unwrap();
        let writes = backend.writes();

        for patch in [
            json!({"severity": "urgent"}),
            json!({"title": ""}),
            json!({"affected_systems": "mail-gw-01"}),
            json!({"detected_at": "yesterday"}),
        ] {
            let err = repo.update_fields(created.id, fields(patch.clone())).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation, "{patch}");
            assert_eq!(err.operation, Some("update"));
        }
        let err = repo
            .update_status(
                created.id,
                IncidentStatus::Closed,
                Some(fields(json!({"category": "alien"}))),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        assert_eq!(backend.writes(), writes);
        let page = repo.list(&SearchRequest::new()).await.unwrap();
        assert_eq!(page.data, vec![created]);
    }

    #[tokio::test]
    async fn test_update_refreshes_updated_at_only() {
        let (_, repo) = setup();
        let created = repo.create(&incident("Phish", IncidentStatus::Open)).await.unwrap();
        let updated = repo
            .update_fields(created.id, fields(json!({"assigned_to": "alice"})))
            .await
            .unwrap();
        assert_eq!(updated.assigned_to.as_deref(), Some("alice"));
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_status_keeps_existing_stamp() {
        let (_, repo) = setup();
        let created = repo.create(&incident("Phish", IncidentStatus::Open)).await.unwrap();
        let resolved = repo
            .update_status(created.id, IncidentStatus::Resolved, None)
            .await
            .unwrap();
        let first_stamp = resolved.resolved_at.unwrap();

        repo.update_status(created.id, IncidentStatus::Investigating, None)
            .await
            .unwrap();
        let again = repo
            .update_status(created.id, IncidentStatus::Resolved, None)
            .await
            .unwrap();
        assert_eq!(again.resolved_at, Some(first_stamp));
    }

    #[tokio::test]
    async fn test_update_status_with_extra_fields() {
        let (backend, repo) = setup();
        let created = repo.create(&incident("Phish", IncidentStatus::Open)).await.unwrap();
        let writes = backend.writes();
        let closed = repo
            .update_status(
                created.id,
                IncidentStatus::Closed,
                Some(fields(json!({"assigned_to": "bob"}))),
            )
            .await
            .unwrap();
        assert_eq!(closed.status, IncidentStatus::Closed);
        assert_eq!(closed.assigned_to.as_deref(), Some("bob"));
        assert!(closed.closed_at.is_some());
        assert_eq!(backend.writes(), writes + 1);

        let err = repo
            .update_status(
                created.id,
                IncidentStatus::Open,
                Some(fields(json!({"closed_at": null}))),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_missing_ids_are_not_found() {
        let (_, repo) = setup();
        let id = Uuid::new_v4();
        assert_eq!(repo.get_by_id(id).await.unwrap_err().kind, ErrorKind::NotFound);
        assert_eq!(
            repo.update_status(id, IncidentStatus::Closed, None)
                .await
                .unwrap_err()
                .kind,
            ErrorKind::NotFound
        );
        assert_eq!(
            repo.update_fields(id, fields(json!({"title": "x"})))
                .await
                .unwrap_err()
                .kind,
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_backend_failure_carries_context() {
        let (backend, repo) = setup();
        backend.set_unavailable(true);
        let err = repo.list(&SearchRequest::new()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Repository);
        assert_eq!(err.operation, Some("list"));
        assert_eq!(err.entity, Some("incident"));
        assert!(err.is_retryable());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_backend_times_out() {
        let (backend, repo) = setup();
        let repo = repo.with_timeout(Duration::from_millis(200));
        backend.set_latency(Duration::from_secs(5));
        let err = repo.get_by_id(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Timeout);
        assert_eq!(err.operation, Some("get_by_id"));
    }

    #[tokio::test]
    async fn test_count_by_pushes_grouping_to_backend() {
        let (_, repo) = setup();
        repo.create(&incident("a", IncidentStatus::Open)).await.unwrap();
        repo.create(&incident("b", IncidentStatus::Open)).await.unwrap();
        repo.create(&incident("c", IncidentStatus::Closed)).await.unwrap();

        let counts = repo.count_by("status", &SearchRequest::new()).await.unwrap();
        assert_eq!(counts.get("open"), Some(&2));
        assert_eq!(counts.get("closed"), Some(&1));

        let err = repo.count_by("reported_by", &SearchRequest::new()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_list_all_walks_every_page() {
        let backend = Arc::new(MemoryBackend::new());
        let config = QueryConfig {
            max_page_size: 2,
            default_page_size: 2,
            ..QueryConfig::default()
        };
        let repo: EntityRepository<grc_entity::Incident> = EntityRepository::new(backend, &config);
        for n in 0..5 {
            repo.create(&incident(&format!("i{n}"), IncidentStatus::Open)).await.unwrap();
        }
        assert_eq!(repo.list_all(&SearchRequest::new()).await.unwrap().len(), 5);
    }
}
