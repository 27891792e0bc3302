//! Control domain entities.

pub mod model;
pub mod status;

pub use model::{Control, CreateControl, UpdateControl};
pub use status::{ControlStatus, ControlType};

use grc_core::query::{FilterField, FilterSpec};
use uuid::Uuid;

use crate::entity::Entity;

static FILTERS: FilterSpec = FilterSpec {
    entity: "control",
    fields: &[
        FilterField::multi("status", ControlStatus::VALUES),
        FilterField::multi("control_type", ControlType::VALUES),
        FilterField::date_range("last_tested_at"),
    ],
    search_columns: &["control_code", "title", "description"],
    sortable: &[
        "updated_at",
        "control_code",
        "title",
        "status",
        "control_type",
        "effectiveness_score",
        "last_tested_at",
    ],
};

impl Entity for Control {
    const TABLE: &'static str = "controls";
    const NAME: &'static str = "control";
    const WRITABLE: &'static [&'static str] = &[
        "control_code",
        "title",
        "description",
        "control_type",
        "status",
        "owner",
        "effectiveness_score",
        "last_tested_at",
    ];
    const LIST_COLUMNS: &'static [&'static str] = &[
        "control_code",
        "title",
        "control_type",
        "status",
        "effectiveness_score",
    ];
    const STAMPED: &'static [&'static str] = &["implemented_at"];

    type Create = CreateControl;
    type Update = UpdateControl;
    type Status = ControlStatus;

    fn filter_spec() -> &'static FilterSpec {
        &FILTERS
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn status(&self) -> ControlStatus {
        self.status
    }

    fn status_stamps(status: ControlStatus) -> &'static [&'static str] {
        match status {
            ControlStatus::Implemented => &["implemented_at"],
            _ => &[],
        }
    }
}
