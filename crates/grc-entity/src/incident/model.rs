//! Incident entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::status::{IncidentCategory, IncidentStatus};
use crate::severity::Severity;

/// An IT-security incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// Unique incident identifier.
    pub id: Uuid,
    /// Generated human-readable number (`INC-YYYYMMDD-XXXXXX`).
    pub incident_number: String,
    /// Short summary.
    pub title: String,
    /// Full description.
    pub description: Option<String>,
    /// Impact rating.
    pub severity: Severity,
    /// Lifecycle status.
    pub status: IncidentStatus,
    /// Incident kind.
    pub category: IncidentCategory,
    /// Who reported it.
    pub reported_by: Option<String>,
    /// Current handler.
    pub assigned_to: Option<String>,
    /// Hosts or services involved.
    #[serde(default)]
    pub affected_systems: Vec<String>,
    /// When the incident was detected.
    pub detected_at: Option<DateTime<Utc>>,
    /// Stamped on the first transition to `resolved`.
    pub resolved_at: Option<DateTime<Utc>>,
    /// Stamped on the first transition to `closed`.
    pub closed_at: Option<DateTime<Utc>>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Incident {
    /// Hours from detection (or creation) to resolution, once resolved.
    pub fn hours_to_resolve(&self) -> Option<f64> {
        let resolved = self.resolved_at?;
        let start = self.detected_at.unwrap_or(self.created_at);
        let minutes = (resolved - start).num_minutes();
        (minutes >= 0).then(|| minutes as f64 / 60.0)
    }
}

/// Data required to report a new incident.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateIncident {
    /// Short summary.
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    /// Full description.
    pub description: Option<String>,
    /// Impact rating.
    pub severity: Severity,
    /// Initial status; `open` when omitted.
    #[serde(default)]
    pub status: IncidentStatus,
    /// Incident kind.
    pub category: IncidentCategory,
    /// Who reported it.
    pub reported_by: Option<String>,
    /// Current handler.
    pub assigned_to: Option<String>,
    /// Hosts or services involved.
    #[serde(default)]
    pub affected_systems: Vec<String>,
    /// When the incident was detected.
    pub detected_at: Option<DateTime<Utc>>,
}

/// Partial incident update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateIncident {
    /// New summary.
    #[validate(length(min = 1, max = 255))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New impact rating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// New kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<IncidentCategory>,
    /// New handler.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    /// Replacement list of affected systems.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected_systems: Option<Vec<String>>,
    /// Corrected detection time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_at: Option<DateTime<Utc>>,
}
