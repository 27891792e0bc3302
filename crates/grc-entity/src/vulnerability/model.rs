//! Vulnerability entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::status::VulnerabilityStatus;
use crate::severity::Severity;

/// A tracked vulnerability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    /// Unique vulnerability identifier.
    pub id: Uuid,
    /// Generated human-readable number (`VULN-YYYYMMDD-XXXXXX`).
    pub vuln_number: String,
    /// Short summary.
    pub title: String,
    /// Full description.
    pub description: Option<String>,
    /// Impact rating.
    pub severity: Severity,
    /// Remediation status.
    pub status: VulnerabilityStatus,
    /// CVE identifier, when one exists.
    pub cve_id: Option<String>,
    /// CVSS base score (0.0 to 10.0).
    pub cvss_score: Option<f64>,
    /// Affected host, application or component.
    pub affected_asset: Option<String>,
    /// Date the vulnerability was discovered.
    pub discovered_date: Option<NaiveDate>,
    /// Remediation deadline.
    pub due_date: Option<NaiveDate>,
    /// Stamped on the first transition to `patched`.
    pub patched_date: Option<DateTime<Utc>>,
    /// Stamped on the first transition to `verified`.
    pub verified_at: Option<DateTime<Utc>>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Vulnerability {
    /// Whether the remediation deadline has passed while still open.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status.is_open() && self.due_date.is_some_and(|due| due < today)
    }
}

/// Data required to record a new vulnerability.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateVulnerability {
    /// Short summary.
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    /// Full description.
    pub description: Option<String>,
    /// Impact rating.
    pub severity: Severity,
    /// Initial status; `open` when omitted.
    #[serde(default)]
    pub status: VulnerabilityStatus,
    /// CVE identifier.
    #[validate(length(min = 5, max = 32))]
    pub cve_id: Option<String>,
    /// CVSS base score.
    #[validate(range(min = 0.0, max = 10.0))]
    pub cvss_score: Option<f64>,
    /// Affected host, application or component.
    pub affected_asset: Option<String>,
    /// Date the vulnerability was discovered.
    pub discovered_date: Option<NaiveDate>,
    /// Remediation deadline.
    pub due_date: Option<NaiveDate>,
}

/// Partial vulnerability update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateVulnerability {
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
    /// New CVE identifier.
    #[validate(length(min = 5, max = 32))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cve_id: Option<String>,
    /// New CVSS base score.
    #[validate(range(min = 0.0, max = 10.0))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cvss_score: Option<f64>,
    /// New affected asset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected_asset: Option<String>,
    /// New remediation deadline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}
