//! Control entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::status::{ControlStatus, ControlType};

/// A security or compliance control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Control {
    /// Unique control identifier.
    pub id: Uuid,
    /// Catalogue code, e.g. `AC-2` or `A.9.2.1`.
    pub control_code: String,
    /// Control title.
    pub title: String,
    /// What the control does.
    pub description: Option<String>,
    /// Function the control serves.
    pub control_type: ControlType,
    /// Implementation status.
    pub status: ControlStatus,
    /// Accountable owner.
    pub owner: Option<String>,
    /// Latest measured effectiveness (0 to 100).
    pub effectiveness_score: Option<f64>,
    /// When the control was last tested.
    pub last_tested_at: Option<DateTime<Utc>>,
    /// Stamped on the first transition to `implemented`.
    pub implemented_at: Option<DateTime<Utc>>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to register a control.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateControl {
    /// Catalogue code.
    #[validate(length(min = 1, max = 64))]
    pub control_code: String,
    /// Control title.
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    /// What the control does.
    pub description: Option<String>,
    /// Function the control serves.
    pub control_type: ControlType,
    /// Initial status; `not_implemented` when omitted.
    #[serde(default)]
    pub status: ControlStatus,
    /// Accountable owner.
    pub owner: Option<String>,
    /// Measured effectiveness.
    #[validate(range(min = 0.0, max = 100.0))]
    pub effectiveness_score: Option<f64>,
    /// When the control was last tested.
    pub last_tested_at: Option<DateTime<Utc>>,
}

/// Partial control update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateControl {
    /// New title.
    #[validate(length(min = 1, max = 255))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New control type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_type: Option<ControlType>,
    /// New owner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// New effectiveness measurement.
    #[validate(range(min = 0.0, max = 100.0))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effectiveness_score: Option<f64>,
    /// New test time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_tested_at: Option<DateTime<Utc>>,
}
