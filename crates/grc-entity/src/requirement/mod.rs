//! Compliance requirement domain entities.

pub mod model;
pub mod status;

pub use model::{CreateRequirement, Requirement, UpdateRequirement};
pub use status::{Priority, RequirementStatus};

use grc_core::query::{FilterField, FilterSpec};
use uuid::Uuid;

use crate::entity::Entity;

static FILTERS: FilterSpec = FilterSpec {
    entity: "requirement",
    fields: &[
        FilterField::reference("framework_id"),
        FilterField::multi("status", RequirementStatus::VALUES),
        FilterField::multi("priority", Priority::VALUES),
    ],
    search_columns: &["requirement_code", "title", "description", "section"],
    sortable: &["updated_at", "requirement_code", "title", "status", "priority"],
};

impl Entity for Requirement {
    const TABLE: &'static str = "requirements";
    const NAME: &'static str = "requirement";
    const WRITABLE: &'static [&'static str] = &[
        "framework_id",
        "requirement_code",
        "title",
        "description",
        "section",
        "priority",
        "status",
    ];
    const LIST_COLUMNS: &'static [&'static str] =
        &["requirement_code", "title", "priority", "status", "assessed_at"];
    const STAMPED: &'static [&'static str] = &["assessed_at"];

    type Create = CreateRequirement;
    type Update = UpdateRequirement;
    type Status = RequirementStatus;

    fn filter_spec() -> &'static FilterSpec {
        &FILTERS
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn status(&self) -> RequirementStatus {
        self.status
    }

    fn status_stamps(status: RequirementStatus) -> &'static [&'static str] {
        if status.is_assessed() {
            &["assessed_at"]
        } else {
            &[]
        }
    }
}
