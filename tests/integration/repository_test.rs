//! Integration tests for record create, read, update and delete.

mod helpers;

use grc_core::error::ErrorKind;
use grc_core::traits::Row;
use grc_core::types::SearchRequest;
use grc_entity::severity::Severity;
use grc_entity::vulnerability::{UpdateVulnerability, VulnerabilityStatus};
use serde_json::json;
use uuid::Uuid;

fn fields(value: serde_json::Value) -> Row {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn test_create_then_get_round_trip() {
    let app = helpers::TestApp::new();
    let created = app
        .create_vulnerability("Exposed .git directory", Severity::Medium, VulnerabilityStatus::Open)
        .await;

    assert_eq!(created.created_at, created.updated_at);
    assert!(created.vuln_number.starts_with("VULN-"));
    assert!(created.patched_date.is_none());

    let fetched = app.repos.vulnerabilities.get_by_id(created.id).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_update_changes_only_given_fields() {
    let app = helpers::TestApp::new();
    let created = app
        .create_vulnerability("Weak TLS ciphers", Severity::Low, VulnerabilityStatus::Open)
        .await;

    let updated = app
        .repos
        .vulnerabilities
        .update(
            created.id,
            &UpdateVulnerability {
                severity: Some(Severity::Medium),
                cvss_score: Some(5.3),
                ..UpdateVulnerability::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.severity, Severity::Medium);
    assert_eq!(updated.cvss_score, Some(5.3));
    assert_eq!(updated.title, created.title);
    assert_eq!(updated.vuln_number, created.vuln_number);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
}

#[tokio::test]
async fn test_update_rejects_invalid_values() {
    let app = helpers::TestApp::new();
    let created = app
        .create_vulnerability("Weak TLS ciphers", Severity::Low, VulnerabilityStatus::Open)
        .await;
    let writes = app.backend.writes();

    let err = app
        .repos
        .vulnerabilities
        .update(
            created.id,
            &UpdateVulnerability {
                cvss_score: Some(11.0),
                ..UpdateVulnerability::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(app.backend.writes(), writes);
}

#[tokio::test]
async fn test_raw_patch_with_bad_values_leaves_table_readable() {
    let app = helpers::TestApp::new();
    let created = app
        .create_vulnerability("Outdated OpenSSL", Severity::High, VulnerabilityStatus::Open)
        .await;
    let writes = app.backend.writes();

    for patch in [
        json!({"severity": "urgent"}),
        json!({"title": ""}),
        json!({"cvss_score": 42.0}),
        json!({"discovered_date": "last week"}),
    ] {
        let err = app
            .repos
            .vulnerabilities
            .update_fields(created.id, fields(patch.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation, "{patch}");
    }
    assert_eq!(app.backend.writes(), writes);

    let page = app
        .repos
        .vulnerabilities
        .list(&SearchRequest::new())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].severity, Severity::High);
}

#[tokio::test]
async fn test_server_managed_fields_are_rejected() {
    let app = helpers::TestApp::new();
    let created = app
        .create_vulnerability("Open redirect", Severity::Low, VulnerabilityStatus::Open)
        .await;

    for patch in [
        json!({"id": Uuid::new_v4().to_string()}),
        json!({"created_at": "2020-01-01T00:00:00Z"}),
        json!({"updated_at": "2020-01-01T00:00:00Z"}),
        json!({"vuln_number": "VULN-1"}),
        json!({"patched_date": "2020-01-01T00:00:00Z"}),
        json!({"status": "patched"}),
    ] {
        let err = app
            .repos
            .vulnerabilities
            .update_fields(created.id, fields(patch.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation, "{patch}");
        assert_eq!(err.operation, Some("update"));
    }

    let unchanged = app.repos.vulnerabilities.get_by_id(created.id).await.unwrap();
    assert_eq!(unchanged, created);
}

#[tokio::test]
async fn test_delete_twice_is_not_found() {
    let app = helpers::TestApp::new();
    let created = app
        .create_vulnerability("Default SNMP community", Severity::Medium, VulnerabilityStatus::Open)
        .await;

    app.repos.vulnerabilities.delete(created.id).await.unwrap();

    let err = app.repos.vulnerabilities.delete(created.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    let err = app.repos.vulnerabilities.delete(created.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = app.repos.vulnerabilities.get_by_id(created.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_unavailable_backend_is_retryable() {
    let app = helpers::TestApp::new();
    app.backend.set_unavailable(true);

    let err = app
        .repos
        .vulnerabilities
        .create(&helpers::vulnerability("x", Severity::Low, VulnerabilityStatus::Open))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Repository);
    assert_eq!(err.entity, Some("vulnerability"));
    assert_eq!(err.operation, Some("create"));
    assert!(err.is_retryable());
}
