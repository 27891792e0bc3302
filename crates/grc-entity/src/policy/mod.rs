//! Policy domain entities.

pub mod model;
pub mod status;

pub use model::{CreatePolicy, Policy, UpdatePolicy};
pub use status::{PolicyCategory, PolicyStatus};

use grc_core::query::{FilterField, FilterSpec};
use uuid::Uuid;

use crate::entity::Entity;

static FILTERS: FilterSpec = FilterSpec {
    entity: "policy",
    fields: &[
        FilterField::multi("status", PolicyStatus::VALUES),
        FilterField::multi("category", PolicyCategory::VALUES),
        FilterField::date_range("effective_date"),
        FilterField::date_range("review_date"),
    ],
    search_columns: &["title", "description", "policy_code"],
    sortable: &[
        "updated_at",
        "title",
        "policy_code",
        "status",
        "category",
        "effective_date",
        "review_date",
    ],
};

impl Entity for Policy {
    const TABLE: &'static str = "policies";
    const NAME: &'static str = "policy";
    const WRITABLE: &'static [&'static str] = &[
        "policy_code",
        "title",
        "description",
        "category",
        "status",
        "version",
        "owner",
        "effective_date",
        "review_date",
    ];
    const LIST_COLUMNS: &'static [&'static str] =
        &["policy_code", "title", "category", "status", "version", "review_date"];
    const STAMPED: &'static [&'static str] = &["approved_at", "published_at"];

    type Create = CreatePolicy;
    type Update = UpdatePolicy;
    type Status = PolicyStatus;

    fn filter_spec() -> &'static FilterSpec {
        &FILTERS
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn status(&self) -> PolicyStatus {
        self.status
    }

    fn status_stamps(status: PolicyStatus) -> &'static [&'static str] {
        match status {
            PolicyStatus::Approved => &["approved_at"],
            PolicyStatus::Published => &["published_at"],
            _ => &[],
        }
    }
}
