//! Integration tests for list-view request sequencing.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use grc_core::error::ErrorKind;
use grc_core::types::{FilterInput, SearchRequest};
use grc_entity::Vulnerability;
use grc_service::SearchSession;

async fn session_over_backlog() -> (helpers::TestApp, Arc<SearchSession<Vulnerability>>) {
    let app = helpers::TestApp::new();
    app.seed_triage_backlog().await;
    let session = Arc::new(SearchSession::new(app.repos.vulnerabilities.clone()));
    (app, session)
}

#[tokio::test(start_paused = true)]
async fn test_stale_search_never_replaces_newer_page() {
    let (app, session) = session_over_backlog().await;

    app.backend.set_latency(Duration::from_millis(500));
    let stale = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.search(SearchRequest::new().query("SQL")).await }
    });
    tokio::task::yield_now().await;
    assert!(session.is_loading());

    app.backend.set_latency(Duration::from_millis(10));
    let fresh = session
        .search(
            SearchRequest::new().filter("severity", FilterInput::values(["high", "critical"])),
        )
        .await
        .unwrap();
    assert_eq!(fresh.total, 12);

    let err = stale.await.unwrap().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Cancelled);

    let shown = session.current_page().expect("page on screen");
    assert_eq!(shown.total, 12);
    assert!(!session.is_loading());
}

#[tokio::test(start_paused = true)]
async fn test_slow_search_times_out() {
    let app = helpers::TestApp::new();
    app.seed_triage_backlog().await;
    let repo = app
        .repos
        .vulnerabilities
        .clone()
        .with_timeout(Duration::from_millis(100));
    let session = SearchSession::new(repo);

    app.backend.set_latency(Duration::from_secs(5));
    let err = session.search(SearchRequest::new()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Timeout);
    assert!(err.is_retryable());
    assert!(session.current_page().is_none());
    assert!(!session.is_loading());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_keeps_previous_page() {
    let (app, session) = session_over_backlog().await;
    let first = session.search(SearchRequest::new()).await.unwrap();
    assert_eq!(first.total, 25);

    app.backend.set_latency(Duration::from_secs(1));
    let pending = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.search(SearchRequest::new().query("SQL")).await }
    });
    tokio::task::yield_now().await;
    session.cancel();

    let err = pending.await.unwrap().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Cancelled);
    assert_eq!(session.current_page().map(|p| p.total), Some(25));
}

#[tokio::test(start_paused = true)]
async fn test_detail_loads_are_sequenced_separately() {
    let (app, session) = session_over_backlog().await;
    let records = app
        .repos
        .vulnerabilities
        .list(&SearchRequest::new().page(1, 2))
        .await
        .unwrap()
        .data;
    let (first, second) = (records[0].id, records[1].id);

    app.backend.set_latency(Duration::from_millis(300));
    let stale = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.open(first).await }
    });
    tokio::task::yield_now().await;

    let listing = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.search(SearchRequest::new()).await }
    });
    tokio::task::yield_now().await;

    app.backend.set_latency(Duration::from_millis(10));
    let opened = session.open(second).await.unwrap();
    assert_eq!(opened.id, second);

    assert_eq!(stale.await.unwrap().unwrap_err().kind, ErrorKind::Cancelled);
    assert_eq!(listing.await.unwrap().unwrap().total, 25);
}
