//! Security incident domain entities.

pub mod model;
pub mod status;

pub use model::{CreateIncident, Incident, UpdateIncident};
pub use status::{IncidentCategory, IncidentStatus};

use chrono::{DateTime, Utc};
use grc_core::query::{FilterField, FilterSpec};
use grc_core::traits::Row;
use uuid::Uuid;

use crate::entity::{Entity, reference_code};
use crate::severity::Severity;

static FILTERS: FilterSpec = FilterSpec {
    entity: "incident",
    fields: &[
        FilterField::multi("status", IncidentStatus::VALUES),
        FilterField::multi("severity", Severity::VALUES),
        FilterField::multi("category", IncidentCategory::VALUES),
        FilterField::date_range("detected_at"),
        FilterField::date_range("created_at"),
    ],
    search_columns: &["title", "description", "incident_number"],
    sortable: &[
        "updated_at",
        "title",
        "severity",
        "status",
        "category",
        "detected_at",
        "incident_number",
    ],
};

impl Entity for Incident {
    const TABLE: &'static str = "incidents";
    const NAME: &'static str = "incident";
    const WRITABLE: &'static [&'static str] = &[
        "title",
        "description",
        "severity",
        "status",
        "category",
        "reported_by",
        "assigned_to",
        "affected_systems",
        "detected_at",
    ];
    const LIST_COLUMNS: &'static [&'static str] = &[
        "incident_number",
        "title",
        "severity",
        "status",
        "category",
        "created_at",
    ];
    const GENERATED: &'static [&'static str] = &["incident_number"];
    const STAMPED: &'static [&'static str] = &["resolved_at", "closed_at"];

    type Create = CreateIncident;
    type Update = UpdateIncident;
    type Status = IncidentStatus;

    fn filter_spec() -> &'static FilterSpec {
        &FILTERS
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn status(&self) -> IncidentStatus {
        self.status
    }

    fn status_stamps(status: IncidentStatus) -> &'static [&'static str] {
        match status {
            IncidentStatus::Resolved => &["resolved_at"],
            IncidentStatus::Closed => &["closed_at"],
            _ => &[],
        }
    }

    fn generate(now: DateTime<Utc>) -> Row {
        let mut row = Row::new();
        row.insert(
            "incident_number".to_string(),
            reference_code("INC", now).into(),
        );
        row
    }
}
