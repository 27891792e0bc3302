//! Integration tests for status transitions and their timestamp stamps.

mod helpers;

use grc_core::error::ErrorKind;
use grc_core::traits::Row;
use grc_entity::assessment::{AssessmentStatus, AssessmentType, CreateAssessment};
use grc_entity::framework::FrameworkStatus;
use grc_entity::requirement::RequirementStatus;
use grc_entity::severity::Severity;
use grc_entity::vulnerability::VulnerabilityStatus;
use serde_json::json;

#[tokio::test]
async fn test_patching_stamps_patched_date_in_one_write() {
    let app = helpers::TestApp::new();
    let vuln = app
        .create_vulnerability("Log4Shell on reporting host", Severity::Critical, VulnerabilityStatus::Open)
        .await;
    let writes = app.backend.writes();

    let patched = app
        .repos
        .vulnerabilities
        .update_status(vuln.id, VulnerabilityStatus::Patched, None)
        .await
        .unwrap();

    assert_eq!(app.backend.writes(), writes + 1);
    assert_eq!(patched.status, VulnerabilityStatus::Patched);
    let stamp = patched.patched_date.expect("patched_date stamped");
    assert_eq!(stamp, patched.updated_at);
    assert!(patched.verified_at.is_none());

    let stored = app.repos.vulnerabilities.get_by_id(vuln.id).await.unwrap();
    assert_eq!(stored.patched_date, Some(stamp));
}

#[tokio::test]
async fn test_stamp_survives_later_transitions() {
    let app = helpers::TestApp::new();
    let vuln = app
        .create_vulnerability("Weak SSH kex", Severity::Medium, VulnerabilityStatus::Open)
        .await;
    let repo = &app.repos.vulnerabilities;

    let first = repo
        .update_status(vuln.id, VulnerabilityStatus::Patched, None)
        .await
        .unwrap()
        .patched_date;
    repo.update_status(vuln.id, VulnerabilityStatus::InProgress, None)
        .await
        .unwrap();
    let again = repo
        .update_status(vuln.id, VulnerabilityStatus::Patched, None)
        .await
        .unwrap();
    assert_eq!(again.patched_date, first);

    let verified = repo
        .update_status(vuln.id, VulnerabilityStatus::Verified, None)
        .await
        .unwrap();
    assert!(verified.verified_at.is_some());
    assert_eq!(verified.patched_date, first);
}

#[tokio::test]
async fn test_status_without_side_effect_writes_status_only() {
    let app = helpers::TestApp::new();
    let vuln = app
        .create_vulnerability("Clickjacking", Severity::Low, VulnerabilityStatus::Open)
        .await;

    let accepted = app
        .repos
        .vulnerabilities
        .update_status(vuln.id, VulnerabilityStatus::RiskAccepted, None)
        .await
        .unwrap();
    assert_eq!(accepted.status, VulnerabilityStatus::RiskAccepted);
    assert!(accepted.patched_date.is_none());
    assert!(accepted.verified_at.is_none());
}

#[tokio::test]
async fn test_framework_activation_and_requirement_assessment() {
    let app = helpers::TestApp::new();
    let framework = app.create_framework("SOC2", FrameworkStatus::Draft, None).await;
    assert!(framework.activated_at.is_none());

    let active = app
        .repos
        .frameworks
        .update_status(framework.id, FrameworkStatus::Active, None)
        .await
        .unwrap();
    assert!(active.activated_at.is_some());

    app.create_requirement(&framework, "CC6.1", RequirementStatus::NotAssessed)
        .await;
    let requirement = app
        .repos
        .requirements
        .list_all(&Default::default())
        .await
        .unwrap()
        .remove(0);
    assert!(requirement.assessed_at.is_none());

    let partial = app
        .repos
        .requirements
        .update_status(requirement.id, RequirementStatus::PartiallyCompliant, None)
        .await
        .unwrap();
    let assessed = partial.assessed_at.expect("assessed_at stamped");

    let compliant = app
        .repos
        .requirements
        .update_status(requirement.id, RequirementStatus::Compliant, None)
        .await
        .unwrap();
    assert_eq!(compliant.assessed_at, Some(assessed));
}

#[tokio::test]
async fn test_assessment_completion_with_summary() {
    let app = helpers::TestApp::new();
    let assessment = app
        .repos
        .assessments
        .create(&CreateAssessment {
            title: "Q3 access review".to_string(),
            framework_id: None,
            assessment_type: AssessmentType::Internal,
            status: AssessmentStatus::default(),
            assessor: Some("internal audit".to_string()),
            scheduled_date: None,
        })
        .await
        .unwrap();
    assert_eq!(assessment.status, AssessmentStatus::Planned);

    let extra: Row = json!({"summary": "No exceptions found"})
        .as_object()
        .cloned()
        .unwrap();
    let done = app
        .repos
        .assessments
        .update_status(assessment.id, AssessmentStatus::Completed, Some(extra))
        .await
        .unwrap();
    assert_eq!(done.status, AssessmentStatus::Completed);
    assert!(done.completed_at.is_some());
    assert_eq!(done.summary.as_deref(), Some("No exceptions found"));
}

#[tokio::test]
async fn test_unknown_status_label_is_rejected() {
    let err = "fixed".parse::<VulnerabilityStatus>().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(err.message.contains("patched"));
}
