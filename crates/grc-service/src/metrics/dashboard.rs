//! Dashboard card summaries.
//!
//! Each summary is a pure fold over records (see [`reducer`](super::reducer));
//! [`Dashboard`] loads the records through the repositories.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use grc_core::result::AppResult;
use grc_core::types::SearchRequest;
use grc_entity::assessment::AssessmentStatus;
use grc_entity::control::ControlStatus;
use grc_entity::framework::FrameworkStatus;
use grc_entity::policy::PolicyStatus;
use grc_entity::requirement::RequirementStatus;
use grc_entity::{
    Assessment, ComplianceFramework, Control, Incident, Policy, Requirement, Vulnerability,
};

use super::reducer::{average, count_by, mean, percentage, sum_of};
use crate::registry::Repositories;

/// Vulnerability management card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VulnerabilitySummary {
    /// All vulnerabilities.
    pub total: u64,
    /// Count per severity label.
    pub by_severity: BTreeMap<String, u64>,
    /// Count per status label.
    pub by_status: BTreeMap<String, u64>,
    /// Open or in progress.
    pub open: u64,
    /// Open with critical or high severity.
    pub urgent_open: u64,
    /// Open past their due date.
    pub overdue: u64,
    /// Share patched or verified, in percent.
    pub remediation_rate: f64,
    /// Mean CVSS score of open vulnerabilities.
    pub average_open_cvss: Option<f64>,
}

impl VulnerabilitySummary {
    /// Fold vulnerabilities as of `today`.
    pub fn from_records(records: &[Vulnerability], today: NaiveDate) -> Self {
        let total = records.len() as u64;
        let open = records.iter().filter(|v| v.status.is_open()).count() as u64;
        let remediated = records.iter().filter(|v| v.status.is_remediated()).count() as u64;
        Self {
            total,
            by_severity: count_by(records, "severity"),
            by_status: count_by(records, "status"),
            open,
            urgent_open: records
                .iter()
                .filter(|v| v.status.is_open() && v.severity.is_urgent())
                .count() as u64,
            overdue: records.iter().filter(|v| v.is_overdue(today)).count() as u64,
            remediation_rate: percentage(remediated, total),
            average_open_cvss: average(records, "cvss_score", |v| v.status.is_open()),
        }
    }
}

/// Incident response card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncidentSummary {
    /// All incidents.
    pub total: u64,
    /// Count per status label.
    pub by_status: BTreeMap<String, u64>,
    /// Count per severity label.
    pub by_severity: BTreeMap<String, u64>,
    /// Count per category label.
    pub by_category: BTreeMap<String, u64>,
    /// Open, investigating or contained.
    pub active: u64,
    /// Active with critical or high severity.
    pub urgent_active: u64,
    /// Mean hours from detection to resolution.
    pub mean_hours_to_resolve: Option<f64>,
}

impl IncidentSummary {
    /// Fold incidents.
    pub fn from_records(records: &[Incident]) -> Self {
        Self {
            total: records.len() as u64,
            by_status: count_by(records, "status"),
            by_severity: count_by(records, "severity"),
            by_category: count_by(records, "category"),
            active: records.iter().filter(|i| i.status.is_active()).count() as u64,
            urgent_active: records
                .iter()
                .filter(|i| i.status.is_active() && i.severity.is_urgent())
                .count() as u64,
            mean_hours_to_resolve: mean(records.iter().filter_map(Incident::hours_to_resolve)),
        }
    }
}

/// Compliance posture card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceSummary {
    /// All frameworks.
    pub frameworks: u64,
    /// Frameworks in use.
    pub active_frameworks: u64,
    /// Mean compliance score of active frameworks.
    pub average_score: Option<f64>,
    /// Requirement count per status label.
    pub requirements_by_status: BTreeMap<String, u64>,
    /// Requirements with an assessment result.
    pub assessed_requirements: u64,
    /// Compliant share of in-scope requirements, in percent.
    pub compliant_percentage: f64,
}

impl ComplianceSummary {
    /// Fold frameworks and their requirements.
    pub fn from_records(frameworks: &[ComplianceFramework], requirements: &[Requirement]) -> Self {
        let requirements_by_status = count_by(requirements, "status");
        let compliant = sum_of(&requirements_by_status, &[RequirementStatus::Compliant.as_str()]);
        let out_of_scope =
            sum_of(&requirements_by_status, &[RequirementStatus::NotApplicable.as_str()]);
        let in_scope = (requirements.len() as u64).saturating_sub(out_of_scope);
        Self {
            frameworks: frameworks.len() as u64,
            active_frameworks: frameworks
                .iter()
                .filter(|f| f.status == FrameworkStatus::Active)
                .count() as u64,
            average_score: average(frameworks, "compliance_score", |f| {
                f.status == FrameworkStatus::Active
            }),
            assessed_requirements: requirements
                .iter()
                .filter(|r| r.status.is_assessed())
                .count() as u64,
            compliant_percentage: percentage(compliant, in_scope),
            requirements_by_status,
        }
    }
}

/// Policy library card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicySummary {
    /// All policies.
    pub total: u64,
    /// Count per status label.
    pub by_status: BTreeMap<String, u64>,
    /// Count per category label.
    pub by_category: BTreeMap<String, u64>,
    /// Published policies.
    pub published: u64,
    /// Policies whose review date has passed.
    pub review_overdue: u64,
}

impl PolicySummary {
    /// Fold policies as of `today`.
    pub fn from_records(records: &[Policy], today: NaiveDate) -> Self {
        Self {
            total: records.len() as u64,
            by_status: count_by(records, "status"),
            by_category: count_by(records, "category"),
            published: records
                .iter()
                .filter(|p| p.status == PolicyStatus::Published)
                .count() as u64,
            review_overdue: records
                .iter()
                .filter(|p| p.status != PolicyStatus::Archived && p.review_due(today))
                .count() as u64,
        }
    }
}

/// Control library card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlSummary {
    /// All controls.
    pub total: u64,
    /// Count per status label.
    pub by_status: BTreeMap<String, u64>,
    /// Count per control type label.
    pub by_type: BTreeMap<String, u64>,
    /// Implemented share of applicable controls, in percent.
    pub implementation_rate: f64,
    /// Mean effectiveness score of implemented controls.
    pub average_effectiveness: Option<f64>,
}

impl ControlSummary {
    /// Fold controls.
    pub fn from_records(records: &[Control]) -> Self {
        let by_status = count_by(records, "status");
        let implemented = sum_of(&by_status, &[ControlStatus::Implemented.as_str()]);
        let applicable = (records.len() as u64)
            .saturating_sub(sum_of(&by_status, &[ControlStatus::NotApplicable.as_str()]));
        Self {
            total: records.len() as u64,
            by_type: count_by(records, "control_type"),
            implementation_rate: percentage(implemented, applicable),
            average_effectiveness: average(records, "effectiveness_score", |c| {
                c.status == ControlStatus::Implemented
            }),
            by_status,
        }
    }
}

/// Assessment programme card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentSummary {
    /// All assessments.
    pub total: u64,
    /// Count per status label.
    pub by_status: BTreeMap<String, u64>,
    /// Count per assessment type label.
    pub by_type: BTreeMap<String, u64>,
    /// Completed assessments.
    pub completed: u64,
    /// Planned assessments scheduled today or later.
    pub upcoming: u64,
    /// Mean score of completed assessments.
    pub average_score: Option<f64>,
}

impl AssessmentSummary {
    /// Fold assessments as of `today`.
    pub fn from_records(records: &[Assessment], today: NaiveDate) -> Self {
        Self {
            total: records.len() as u64,
            by_status: count_by(records, "status"),
            by_type: count_by(records, "assessment_type"),
            completed: records
                .iter()
                .filter(|a| a.status == AssessmentStatus::Completed)
                .count() as u64,
            upcoming: records
                .iter()
                .filter(|a| {
                    a.status == AssessmentStatus::Planned
                        && a.scheduled_date.is_some_and(|d| d >= today)
                })
                .count() as u64,
            average_score: average(records, "score", |a| a.status == AssessmentStatus::Completed),
        }
    }
}

/// Loads records through the repositories and folds them into summaries.
#[derive(Debug, Clone)]
pub struct Dashboard {
    repositories: Repositories,
}

impl Dashboard {
    /// Create a dashboard over the repository registry.
    pub fn new(repositories: Repositories) -> Self {
        Self { repositories }
    }

    /// Vulnerability card.
    pub async fn vulnerabilities(&self) -> AppResult<VulnerabilitySummary> {
        let records = self.repositories.vulnerabilities.list_all(&SearchRequest::new()).await?;
        Ok(VulnerabilitySummary::from_records(&records, today()))
    }

    /// Incident card.
    pub async fn incidents(&self) -> AppResult<IncidentSummary> {
        let records = self.repositories.incidents.list_all(&SearchRequest::new()).await?;
        Ok(IncidentSummary::from_records(&records))
    }

    /// Compliance card.
    pub async fn compliance(&self) -> AppResult<ComplianceSummary> {
        let all = SearchRequest::new();
        let (frameworks, requirements) = tokio::try_join!(
            self.repositories.frameworks.list_all(&all),
            self.repositories.requirements.list_all(&all),
        )?;
        Ok(ComplianceSummary::from_records(&frameworks, &requirements))
    }

    /// Policy card.
    pub async fn policies(&self) -> AppResult<PolicySummary> {
        let records = self.repositories.policies.list_all(&SearchRequest::new()).await?;
        Ok(PolicySummary::from_records(&records, today()))
    }

    /// Control card.
    pub async fn controls(&self) -> AppResult<ControlSummary> {
        let records = self.repositories.controls.list_all(&SearchRequest::new()).await?;
        Ok(ControlSummary::from_records(&records))
    }

    /// Assessment card.
    pub async fn assessments(&self) -> AppResult<AssessmentSummary> {
        let records = self.repositories.assessments.list_all(&SearchRequest::new()).await?;
        Ok(AssessmentSummary::from_records(&records, today()))
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
