//! Compliance assessment entities.

pub mod model;
pub mod status;

pub use model::{Assessment, CreateAssessment, UpdateAssessment};
pub use status::{AssessmentStatus, AssessmentType};

use grc_core::query::{FilterField, FilterSpec};
use uuid::Uuid;

use crate::entity::Entity;

static FILTERS: FilterSpec = FilterSpec {
    entity: "assessment",
    fields: &[
        FilterField::multi("status", AssessmentStatus::VALUES),
        FilterField::multi("assessment_type", AssessmentType::VALUES),
        FilterField::reference("framework_id"),
        FilterField::date_range("scheduled_date"),
    ],
    search_columns: &["title", "assessor", "summary"],
    sortable: &[
        "updated_at",
        "title",
        "status",
        "assessment_type",
        "scheduled_date",
        "score",
    ],
};

impl Entity for Assessment {
    const TABLE: &'static str = "assessments";
    const NAME: &'static str = "assessment";
    const WRITABLE: &'static [&'static str] = &[
        "title",
        "framework_id",
        "assessment_type",
        "status",
        "assessor",
        "scheduled_date",
        "score",
        "summary",
    ];
    const LIST_COLUMNS: &'static [&'static str] = &[
        "title",
        "assessment_type",
        "status",
        "assessor",
        "scheduled_date",
        "score",
    ];
    const STAMPED: &'static [&'static str] = &["started_at", "completed_at"];

    type Create = CreateAssessment;
    type Update = UpdateAssessment;
    type Status = AssessmentStatus;

    fn filter_spec() -> &'static FilterSpec {
        &FILTERS
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn status(&self) -> AssessmentStatus {
        self.status
    }

    fn status_stamps(status: AssessmentStatus) -> &'static [&'static str] {
        match status {
            AssessmentStatus::InProgress => &["started_at"],
            AssessmentStatus::Completed => &["completed_at"],
            AssessmentStatus::Planned | AssessmentStatus::Cancelled => &[],
        }
    }
}
