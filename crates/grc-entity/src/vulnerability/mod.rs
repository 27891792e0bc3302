//! Vulnerability domain entities.

pub mod model;
pub mod status;

pub use model::{CreateVulnerability, UpdateVulnerability, Vulnerability};
pub use status::VulnerabilityStatus;

use chrono::{DateTime, Utc};
use grc_core::query::{FilterField, FilterSpec};
use grc_core::traits::Row;
use uuid::Uuid;

use crate::entity::{Entity, reference_code};
use crate::severity::Severity;

static FILTERS: FilterSpec = FilterSpec {
    entity: "vulnerability",
    fields: &[
        FilterField::multi("status", VulnerabilityStatus::VALUES),
        FilterField::multi("severity", Severity::VALUES),
        FilterField::date_range("discovered_date"),
        FilterField::date_range("due_date"),
        FilterField::date_range("created_at"),
    ],
    search_columns: &["title", "description", "cve_id", "vuln_number"],
    sortable: &[
        "updated_at",
        "title",
        "severity",
        "status",
        "cvss_score",
        "discovered_date",
        "due_date",
        "vuln_number",
    ],
};

impl Entity for Vulnerability {
    const TABLE: &'static str = "vulnerabilities";
    const NAME: &'static str = "vulnerability";
    const WRITABLE: &'static [&'static str] = &[
        "title",
        "description",
        "severity",
        "status",
        "cve_id",
        "cvss_score",
        "affected_asset",
        "discovered_date",
        "due_date",
    ];
    const LIST_COLUMNS: &'static [&'static str] = &[
        "vuln_number",
        "title",
        "severity",
        "status",
        "cvss_score",
        "due_date",
    ];
    const GENERATED: &'static [&'static str] = &["vuln_number"];
    const STAMPED: &'static [&'static str] = &["patched_date", "verified_at"];

    type Create = CreateVulnerability;
    type Update = UpdateVulnerability;
    type Status = VulnerabilityStatus;

    fn filter_spec() -> &'static FilterSpec {
        &FILTERS
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn status(&self) -> VulnerabilityStatus {
        self.status
    }

    fn status_stamps(status: VulnerabilityStatus) -> &'static [&'static str] {
        match status {
            VulnerabilityStatus::Patched => &["patched_date"],
            VulnerabilityStatus::Verified => &["verified_at"],
            _ => &[],
        }
    }

    fn generate(now: DateTime<Utc>) -> Row {
        let mut row = Row::new();
        row.insert("vuln_number".to_string(), reference_code("VULN", now).into());
        row
    }
}
