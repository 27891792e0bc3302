//! The contract binding a domain type to the generic repository.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::Validate;

use grc_core::AppError;
use grc_core::query::FilterSpec;
use grc_core::traits::Row;

/// Columns every entity has and only the repository writes.
pub const SERVER_MANAGED: &[&str] = &["id", "created_at", "updated_at"];

/// Column holding an entity's status.
pub const STATUS_COLUMN: &str = "status";

/// A fixed string label for an enum value.
pub trait Label:
    Copy + Eq + fmt::Debug + fmt::Display + FromStr<Err = AppError> + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// The serialized label.
    fn label(&self) -> &'static str;

    /// All labels of the type, in declaration order.
    fn labels() -> &'static [&'static str];
}

/// A domain record type served by the generic repository.
///
/// Implementations are purely declarative: table name, writable columns,
/// the filter specification and the status side-effect table. Rows travel
/// as JSON objects, so the entity's serde representation *is* its column
/// layout.
pub trait Entity: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Backing table.
    const TABLE: &'static str;
    /// Singular name used in logs and error context.
    const NAME: &'static str;
    /// Columns callers may set through create/update.
    const WRITABLE: &'static [&'static str];
    /// Columns list views show, in display order.
    const LIST_COLUMNS: &'static [&'static str];
    /// Server-generated columns beyond [`SERVER_MANAGED`].
    const GENERATED: &'static [&'static str] = &[];
    /// Every timestamp column any status transition stamps.
    const STAMPED: &'static [&'static str] = &[];

    /// Payload accepted by `create`.
    type Create: Serialize + DeserializeOwned + Validate + Send + Sync;
    /// Partial payload accepted by `update`; absent fields are untouched.
    type Update: Serialize + DeserializeOwned + Validate + Send + Sync;
    /// Lifecycle status enum.
    type Status: Label;

    /// The entity's filter declaration.
    fn filter_spec() -> &'static FilterSpec;

    /// Record identifier.
    fn id(&self) -> Uuid;

    /// Current lifecycle status.
    fn status(&self) -> Self::Status;

    /// Timestamp columns stamped when a record enters `status`.
    fn status_stamps(_status: Self::Status) -> &'static [&'static str] {
        &[]
    }

    /// Values for [`GENERATED`](Self::GENERATED) columns of a new record.
    fn generate(_now: DateTime<Utc>) -> Row {
        Row::new()
    }
}

/// Whether the repository (never the caller) owns `column` for `E`.
pub fn is_server_managed<E: Entity>(column: &str) -> bool {
    SERVER_MANAGED.contains(&column) || E::GENERATED.contains(&column) || E::STAMPED.contains(&column)
}

/// Human-readable record number, e.g. `INC-20240105-3FA9C1`.
pub fn reference_code(prefix: &str, now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{prefix}-{}-{}",
        now.format("%Y%m%d"),
        suffix[..6].to_ascii_uppercase()
    )
}

/// A status change together with the timestamps it stamps.
///
/// Stamps are only planned for columns that are still null on the current
/// row, so each is written exactly once over a record's life.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTransition<S> {
    /// Record being transitioned.
    pub entity_id: Uuid,
    /// Status being entered.
    pub new_status: S,
    /// Derived timestamp column to the value it receives.
    pub side_effects: BTreeMap<&'static str, DateTime<Utc>>,
}

impl<S: Label> StatusTransition<S> {
    /// Plan the transition of `current` into `new_status` at `now`.
    pub fn plan<E>(entity_id: Uuid, new_status: S, current: &Row, now: DateTime<Utc>) -> Self
    where
        E: Entity<Status = S>,
    {
        let side_effects = E::status_stamps(new_status)
            .iter()
            .filter(|column| current.get(**column).is_none_or(serde_json::Value::is_null))
            .map(|column| (*column, now))
            .collect();
        Self {
            entity_id,
            new_status,
            side_effects,
        }
    }

    /// Columns the transition writes: status plus every planned stamp.
    pub fn into_patch(self) -> Row {
        let mut patch = Row::new();
        patch.insert(
            STATUS_COLUMN.to_string(),
            serde_json::Value::String(self.new_status.label().to_string()),
        );
        for (column, at) in self.side_effects {
            patch.insert(column.to_string(), timestamp_value(at));
        }
        patch
    }
}

/// JSON form of a timestamp, matching how entities serialize them.
pub fn timestamp_value(at: DateTime<Utc>) -> serde_json::Value {
    serde_json::Value::String(at.to_rfc3339_opts(chrono::SecondsFormat::Micros, true))
}
