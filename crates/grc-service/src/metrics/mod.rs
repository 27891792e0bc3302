//! Aggregation for dashboard cards.

pub mod dashboard;
pub mod reducer;

pub use dashboard::{
    AssessmentSummary, ComplianceSummary, ControlSummary, Dashboard, IncidentSummary,
    PolicySummary, VulnerabilitySummary,
};
pub use reducer::{average, count_by, mean, percentage};
