//! Compliance framework domain entities.

pub mod model;
pub mod status;

pub use model::{ComplianceFramework, CreateFramework, UpdateFramework};
pub use status::{FrameworkStatus, FrameworkType};

use grc_core::query::{FilterField, FilterSpec};
use uuid::Uuid;

use crate::entity::Entity;

static FILTERS: FilterSpec = FilterSpec {
    entity: "compliance_framework",
    fields: &[
        FilterField::multi("status", FrameworkStatus::VALUES),
        FilterField::multi("framework_type", FrameworkType::VALUES),
        FilterField::date_range("target_date"),
    ],
    search_columns: &["code", "name", "description"],
    sortable: &[
        "updated_at",
        "code",
        "name",
        "status",
        "framework_type",
        "compliance_score",
        "target_date",
    ],
};

impl Entity for ComplianceFramework {
    const TABLE: &'static str = "compliance_frameworks";
    const NAME: &'static str = "compliance_framework";
    const WRITABLE: &'static [&'static str] = &[
        "code",
        "name",
        "version",
        "description",
        "framework_type",
        "status",
        "compliance_score",
        "certification_level",
        "target_date",
    ];
    const LIST_COLUMNS: &'static [&'static str] = &[
        "code",
        "name",
        "framework_type",
        "status",
        "compliance_score",
        "target_date",
    ];
    const STAMPED: &'static [&'static str] = &["activated_at", "retired_at"];

    type Create = CreateFramework;
    type Update = UpdateFramework;
    type Status = FrameworkStatus;

    fn filter_spec() -> &'static FilterSpec {
        &FILTERS
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn status(&self) -> FrameworkStatus {
        self.status
    }

    fn status_stamps(status: FrameworkStatus) -> &'static [&'static str] {
        match status {
            FrameworkStatus::Active => &["activated_at"],
            FrameworkStatus::Retired => &["retired_at"],
            FrameworkStatus::Draft => &[],
        }
    }
}
