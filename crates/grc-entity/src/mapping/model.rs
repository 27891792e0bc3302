//! Control mapping entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::status::{MappingStatus, MappingStrength};

/// Links a framework requirement to a control that satisfies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlMapping {
    /// Unique mapping identifier.
    pub id: Uuid,
    /// Requirement being satisfied.
    pub requirement_id: Uuid,
    /// Control providing coverage.
    pub control_id: Uuid,
    /// Coverage strength.
    pub strength: MappingStrength,
    /// Review status.
    pub status: MappingStatus,
    /// Reviewer notes.
    pub notes: Option<String>,
    /// Stamped on the first transition to `approved`.
    pub approved_at: Option<DateTime<Utc>>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to propose a mapping.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateMapping {
    /// Requirement being satisfied.
    pub requirement_id: Uuid,
    /// Control providing coverage.
    pub control_id: Uuid,
    /// Coverage strength; `full` when omitted.
    #[serde(default)]
    pub strength: MappingStrength,
    /// Initial status; `proposed` when omitted.
    #[serde(default)]
    pub status: MappingStatus,
    /// Reviewer notes.
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Partial mapping update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateMapping {
    /// New coverage strength.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<MappingStrength>,
    /// New notes.
    #[validate(length(max = 2000))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
