//! Requirement entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::status::{Priority, RequirementStatus};

/// One requirement of a compliance framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    /// Unique requirement identifier.
    pub id: Uuid,
    /// Owning framework.
    pub framework_id: Uuid,
    /// Requirement number within the framework, e.g. `8.3.6`.
    pub requirement_code: String,
    /// Requirement title.
    pub title: String,
    /// Requirement text.
    pub description: Option<String>,
    /// Section or domain heading.
    pub section: Option<String>,
    /// Remediation priority.
    pub priority: Priority,
    /// Assessed status.
    pub status: RequirementStatus,
    /// Stamped on the first assessment result.
    pub assessed_at: Option<DateTime<Utc>>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to add a requirement.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRequirement {
    /// Owning framework.
    pub framework_id: Uuid,
    /// Requirement number.
    #[validate(length(min = 1, max = 64))]
    pub requirement_code: String,
    /// Requirement title.
    #[validate(length(min = 1, max = 500))]
    pub title: String,
    /// Requirement text.
    pub description: Option<String>,
    /// Section heading.
    pub section: Option<String>,
    /// Priority; `medium` when omitted.
    #[serde(default)]
    pub priority: Priority,
    /// Initial status; `not_assessed` when omitted.
    #[serde(default)]
    pub status: RequirementStatus,
}

/// Partial requirement update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateRequirement {
    /// New title.
    #[validate(length(min = 1, max = 500))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New section.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// New priority.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}
