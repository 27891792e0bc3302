//! Integration tests for filtered, paginated search.

mod helpers;

use grc_core::config::QueryConfig;
use grc_core::error::ErrorKind;
use grc_core::types::{FilterInput, SearchRequest, SortDirection};
use grc_entity::severity::Severity;

fn urgent_sql() -> SearchRequest {
    SearchRequest::new()
        .query("SQL")
        .filter("severity", FilterInput::values(["high", "critical"]))
}

#[tokio::test]
async fn test_triage_search_finds_urgent_sql_findings() {
    let app = helpers::TestApp::new();
    app.seed_triage_backlog().await;

    let page = app
        .repos
        .vulnerabilities
        .list(&urgent_sql().page(1, 10))
        .await
        .unwrap();

    assert_eq!(page.total, 3);
    assert_eq!(page.data.len(), 3);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.page, 1);
    for v in &page.data {
        assert!(matches!(v.severity, Severity::High | Severity::Critical));
        assert!(v.title.to_lowercase().contains("sql"));
    }
}

#[tokio::test]
async fn test_page_json_shape() {
    let app = helpers::TestApp::new();
    app.seed_triage_backlog().await;

    let page = app
        .repos
        .vulnerabilities
        .list(&urgent_sql().page(1, 10))
        .await
        .unwrap();
    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(json["total"], 3);
    assert_eq!(json["pageSize"], 10);
    assert_eq!(json["totalPages"], 1);
    assert_eq!(json["data"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn test_pages_partition_the_result_set() {
    let app = helpers::TestApp::new();
    app.seed_triage_backlog().await;

    let mut seen = Vec::new();
    let mut page_no = 1;
    loop {
        let page = app
            .repos
            .vulnerabilities
            .list(&SearchRequest::new().page(page_no, 7))
            .await
            .unwrap();
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 4);
        assert!(page.data.len() <= 7);
        seen.extend(page.data.iter().map(|v| v.id));
        if !page.has_next() {
            break;
        }
        page_no += 1;
    }
    assert_eq!(page_no, 4);
    let mut unique = seen.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 25);
    assert_eq!(seen.len(), 25);
}

#[tokio::test]
async fn test_page_past_the_end_is_empty() {
    let app = helpers::TestApp::new();
    app.seed_triage_backlog().await;

    let page = app
        .repos
        .vulnerabilities
        .list(&urgent_sql().page(5, 10))
        .await
        .unwrap();
    assert!(page.data.is_empty());
    assert_eq!(page.total, 3);
    assert_eq!(page.total_pages, 1);
}

#[tokio::test]
async fn test_no_match_has_zero_pages() {
    let app = helpers::TestApp::new();
    app.seed_triage_backlog().await;

    let page = app
        .repos
        .vulnerabilities
        .list(&SearchRequest::new().query("kerberoasting"))
        .await
        .unwrap();
    assert_eq!(page.total, 0);
    assert_eq!(page.total_pages, 0);
}

#[tokio::test]
async fn test_page_size_is_clamped() {
    let app = helpers::TestApp::new();
    app.seed_triage_backlog().await;

    let page = app
        .repos
        .vulnerabilities
        .list(&SearchRequest::new().page(0, 10_000))
        .await
        .unwrap();
    assert_eq!(page.page, 1);
    assert_eq!(page.page_size, app.config.max_page_size);
    assert_eq!(page.data.len(), 25);
}

#[tokio::test]
async fn test_configured_default_page_size_applies() {
    let app = helpers::TestApp::with_config(QueryConfig {
        default_page_size: 10,
        ..QueryConfig::default()
    });
    app.seed_triage_backlog().await;

    let page = app
        .repos
        .vulnerabilities
        .list(&SearchRequest::new())
        .await
        .unwrap();
    assert_eq!(page.page_size, 10);
    assert_eq!(page.data.len(), 10);
    assert_eq!(page.total_pages, 3);
}

#[tokio::test]
async fn test_sort_by_title_ascending() {
    let app = helpers::TestApp::new();
    app.seed_triage_backlog().await;

    let page = app
        .repos
        .vulnerabilities
        .list(&urgent_sql().sort("title", SortDirection::Asc))
        .await
        .unwrap();
    let titles: Vec<&str> = page.data.iter().map(|v| v.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Blind SQL injection in reports API",
            "SQL injection in login form",
            "Second-order sql injection in search",
        ]
    );
}

#[tokio::test]
async fn test_rejected_filter_fails_without_backend_call() {
    let app = helpers::TestApp::new();
    app.seed_triage_backlog().await;
    app.backend.set_unavailable(true);

    for request in [
        SearchRequest::new().filter("severity", FilterInput::values(["urgent"])),
        SearchRequest::new().filter("owner", FilterInput::values(["alice"])),
        SearchRequest::new().filter("due_date", FilterInput::range("2024-03-01", "2024-01-01")),
        SearchRequest::new().sort("password_hash", SortDirection::Asc),
    ] {
        let err = app.repos.vulnerabilities.list(&request).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation, "{request:?}");
        assert_eq!(err.operation, Some("list"));
    }
}
