//! Assessment entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::status::{AssessmentStatus, AssessmentType};

/// A compliance assessment or audit engagement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    /// Unique assessment identifier.
    pub id: Uuid,
    /// Engagement title.
    pub title: String,
    /// Framework assessed, when scoped to one.
    pub framework_id: Option<Uuid>,
    /// Engagement kind.
    pub assessment_type: AssessmentType,
    /// Lifecycle status.
    pub status: AssessmentStatus,
    /// Lead assessor.
    pub assessor: Option<String>,
    /// Planned start date.
    pub scheduled_date: Option<NaiveDate>,
    /// Result score (0 to 100).
    pub score: Option<f64>,
    /// Findings summary.
    pub summary: Option<String>,
    /// Stamped on the first transition to `in_progress`.
    pub started_at: Option<DateTime<Utc>>,
    /// Stamped on the first transition to `completed`.
    pub completed_at: Option<DateTime<Utc>>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to schedule an assessment.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAssessment {
    /// Engagement title.
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    /// Framework assessed.
    pub framework_id: Option<Uuid>,
    /// Engagement kind.
    pub assessment_type: AssessmentType,
    /// Initial status; `planned` when omitted.
    #[serde(default)]
    pub status: AssessmentStatus,
    /// Lead assessor.
    pub assessor: Option<String>,
    /// Planned start date.
    pub scheduled_date: Option<NaiveDate>,
}

/// Partial assessment update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateAssessment {
    /// New title.
    #[validate(length(min = 1, max = 255))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New lead assessor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessor: Option<String>,
    /// Rescheduled date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<NaiveDate>,
    /// Result score.
    #[validate(range(min = 0.0, max = 100.0))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Findings summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}
