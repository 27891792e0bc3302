//! Compliance framework entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::status::{FrameworkStatus, FrameworkType};

/// A compliance framework or certification program being tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceFramework {
    /// Unique framework identifier.
    pub id: Uuid,
    /// Short code, e.g. `PCI-DSS-4.0`.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Published version of the standard.
    pub version: Option<String>,
    /// Scope notes.
    pub description: Option<String>,
    /// Standard being tracked.
    pub framework_type: FrameworkType,
    /// Adoption status.
    pub status: FrameworkStatus,
    /// Current compliance score (0 to 100), maintained by assessments.
    pub compliance_score: Option<f64>,
    /// Targeted certification level, e.g. `Level 2` for CMMC.
    pub certification_level: Option<String>,
    /// Target certification date.
    pub target_date: Option<NaiveDate>,
    /// Stamped on the first transition to `active`.
    pub activated_at: Option<DateTime<Utc>>,
    /// Stamped on the first transition to `retired`.
    pub retired_at: Option<DateTime<Utc>>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to add a framework.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFramework {
    /// Short code.
    #[validate(length(min = 1, max = 64))]
    pub code: String,
    /// Display name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Published version.
    pub version: Option<String>,
    /// Scope notes.
    pub description: Option<String>,
    /// Standard being tracked.
    pub framework_type: FrameworkType,
    /// Initial status; `draft` when omitted.
    #[serde(default)]
    pub status: FrameworkStatus,
    /// Initial compliance score.
    #[validate(range(min = 0.0, max = 100.0))]
    pub compliance_score: Option<f64>,
    /// Targeted certification level.
    pub certification_level: Option<String>,
    /// Target certification date.
    pub target_date: Option<NaiveDate>,
}

/// Partial framework update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateFramework {
    /// New display name.
    #[validate(length(min = 1, max = 255))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// New scope notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New compliance score.
    #[validate(range(min = 0.0, max = 100.0))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compliance_score: Option<f64>,
    /// New certification level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certification_level: Option<String>,
    /// New target date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
}
