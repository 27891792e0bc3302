//! Requirement-to-control mapping entities.

pub mod model;
pub mod status;

pub use model::{ControlMapping, CreateMapping, UpdateMapping};
pub use status::{MappingStatus, MappingStrength};

use grc_core::query::{FilterField, FilterSpec};
use uuid::Uuid;

use crate::entity::Entity;

static FILTERS: FilterSpec = FilterSpec {
    entity: "control_mapping",
    fields: &[
        FilterField::reference("requirement_id"),
        FilterField::reference("control_id"),
        FilterField::multi("strength", MappingStrength::VALUES),
        FilterField::multi("status", MappingStatus::VALUES),
    ],
    search_columns: &["notes"],
    sortable: &["updated_at", "strength", "status"],
};

impl Entity for ControlMapping {
    const TABLE: &'static str = "control_mappings";
    const NAME: &'static str = "control_mapping";
    const WRITABLE: &'static [&'static str] =
        &["requirement_id", "control_id", "strength", "status", "notes"];
    const LIST_COLUMNS: &'static [&'static str] =
        &["requirement_id", "control_id", "strength", "status", "approved_at"];
    const STAMPED: &'static [&'static str] = &["approved_at"];

    type Create = CreateMapping;
    type Update = UpdateMapping;
    type Status = MappingStatus;

    fn filter_spec() -> &'static FilterSpec {
        &FILTERS
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn status(&self) -> MappingStatus {
        self.status
    }

    fn status_stamps(status: MappingStatus) -> &'static [&'static str] {
        match status {
            MappingStatus::Approved => &["approved_at"],
            MappingStatus::Proposed | MappingStatus::Retired => &[],
        }
    }
}
