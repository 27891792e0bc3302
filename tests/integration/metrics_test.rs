//! Integration tests for aggregation and dashboard summaries.

mod helpers;

use std::collections::BTreeMap;

use grc_core::types::{FilterInput, SearchRequest};
use grc_entity::framework::FrameworkStatus;
use grc_entity::requirement::RequirementStatus;
use grc_entity::severity::Severity;
use grc_entity::vulnerability::VulnerabilityStatus;
use grc_entity::Vulnerability;
use grc_service::Dashboard;
use grc_service::metrics::{count_by, percentage};

#[test]
fn test_empty_inputs_degrade_gracefully() {
    let none: Vec<Vulnerability> = Vec::new();
    assert!(count_by(&none, "severity").is_empty());
    assert_eq!(percentage(3, 0), 0.0);
    assert_eq!(percentage(1, 4), 25.0);
}

#[tokio::test]
async fn test_vulnerability_card() {
    let app = helpers::TestApp::new();
    app.seed_triage_backlog().await;
    let patched = app
        .create_vulnerability("Patched already", Severity::High, VulnerabilityStatus::Open)
        .await;
    app.repos
        .vulnerabilities
        .update_status(patched.id, VulnerabilityStatus::Patched, None)
        .await
        .unwrap();

    let card = Dashboard::new(app.repos.clone()).vulnerabilities().await.unwrap();
    assert_eq!(card.total, 26);
    assert_eq!(card.open, 25);
    assert_eq!(card.urgent_open, 12);
    assert_eq!(card.by_severity.get("critical"), Some(&5));
    assert_eq!(card.by_severity.get("high"), Some(&8));
    assert_eq!(card.by_status.get("patched"), Some(&1));
    assert_eq!(card.remediation_rate, percentage(1, 26));
    assert_eq!(card.average_open_cvss, None);
}

#[tokio::test]
async fn test_repository_count_by_matches_fold() {
    let app = helpers::TestApp::new();
    app.seed_triage_backlog().await;

    let request = SearchRequest::new().filter("status", FilterInput::values(["open"]));
    let pushed_down = app
        .repos
        .vulnerabilities
        .count_by("severity", &request)
        .await
        .unwrap();
    let records = app.repos.vulnerabilities.list_all(&request).await.unwrap();
    assert_eq!(pushed_down, count_by(&records, "severity"));

    let expected: BTreeMap<String, u64> = [
        ("critical".to_string(), 5),
        ("high".to_string(), 7),
        ("low".to_string(), 1),
        ("medium".to_string(), 1),
    ]
    .into_iter()
    .collect();
    assert_eq!(pushed_down, expected);
}

#[tokio::test]
async fn test_compliance_card() {
    let app = helpers::TestApp::new();
    let soc2 = app
        .create_framework("SOC2", FrameworkStatus::Active, Some(80.0))
        .await;
    app.create_framework("ISO", FrameworkStatus::Active, Some(60.0))
        .await;
    app.create_framework("OLD", FrameworkStatus::Retired, Some(10.0))
        .await;

    for (code, status) in [
        ("CC1.1", RequirementStatus::Compliant),
        ("CC1.2", RequirementStatus::Compliant),
        ("CC2.1", RequirementStatus::PartiallyCompliant),
        ("CC3.1", RequirementStatus::NonCompliant),
        ("CC4.1", RequirementStatus::NotApplicable),
        ("CC5.1", RequirementStatus::NotAssessed),
    ] {
        app.create_requirement(&soc2, code, status).await;
    }

    let card = Dashboard::new(app.repos.clone()).compliance().await.unwrap();
    assert_eq!(card.frameworks, 3);
    assert_eq!(card.active_frameworks, 2);
    assert_eq!(card.average_score, Some(70.0));
    assert_eq!(card.assessed_requirements, 4);
    assert_eq!(card.compliant_percentage, 40.0);
    assert_eq!(card.requirements_by_status.get("compliant"), Some(&2));
}

#[tokio::test]
async fn test_empty_dashboard() {
    let app = helpers::TestApp::new();
    let dashboard = Dashboard::new(app.repos.clone());

    let vulns = dashboard.vulnerabilities().await.unwrap();
    assert_eq!(vulns.total, 0);
    assert!(vulns.by_severity.is_empty());
    assert_eq!(vulns.remediation_rate, 0.0);

    let compliance = dashboard.compliance().await.unwrap();
    assert_eq!(compliance.average_score, None);
    assert_eq!(compliance.compliant_percentage, 0.0);
}
