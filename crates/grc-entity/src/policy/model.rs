//! Policy entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::status::{PolicyCategory, PolicyStatus};

/// A governance policy document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// Unique policy identifier.
    pub id: Uuid,
    /// Organization-assigned code, e.g. `POL-ISMS-001`.
    pub policy_code: String,
    /// Policy title.
    pub title: String,
    /// Summary of scope and intent.
    pub description: Option<String>,
    /// Subject area.
    pub category: PolicyCategory,
    /// Publication status.
    pub status: PolicyStatus,
    /// Document version label.
    pub version: String,
    /// Accountable owner.
    pub owner: Option<String>,
    /// Date the policy takes effect.
    pub effective_date: Option<NaiveDate>,
    /// Next scheduled review.
    pub review_date: Option<NaiveDate>,
    /// Stamped on the first transition to `approved`.
    pub approved_at: Option<DateTime<Utc>>,
    /// Stamped on the first transition to `published`.
    pub published_at: Option<DateTime<Utc>>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Policy {
    /// Whether the scheduled review date has passed.
    pub fn review_due(&self, today: NaiveDate) -> bool {
        self.review_date.is_some_and(|date| date <= today)
    }
}

/// Data required to draft a new policy.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePolicy {
    /// Organization-assigned code.
    #[validate(length(min = 1, max = 64))]
    pub policy_code: String,
    /// Policy title.
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    /// Summary of scope and intent.
    pub description: Option<String>,
    /// Subject area.
    pub category: PolicyCategory,
    /// Initial status; `draft` when omitted.
    #[serde(default)]
    pub status: PolicyStatus,
    /// Document version label.
    #[validate(length(min = 1, max = 32))]
    #[serde(default = "default_version")]
    pub version: String,
    /// Accountable owner.
    pub owner: Option<String>,
    /// Date the policy takes effect.
    pub effective_date: Option<NaiveDate>,
    /// Next scheduled review.
    pub review_date: Option<NaiveDate>,
}

/// Partial policy update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdatePolicy {
    /// New title.
    #[validate(length(min = 1, max = 255))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New subject area.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<PolicyCategory>,
    /// New version label.
    #[validate(length(min = 1, max = 32))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// New owner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// New effective date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<NaiveDate>,
    /// New review date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_date: Option<NaiveDate>,
}

fn default_version() -> String {
    "1.0".to_string()
}
