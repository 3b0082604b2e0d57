//! Full relay flow: push an alert, pull the normalized results.

use crate::helpers::config::TestConfigBuilder;
use crate::helpers::http::RunningServer;
use crate::helpers::payloads::{catchpoint_alert, decode_egress};

#[tokio::test]
async fn e2e_pushed_alert_is_drained_once() {
    // Given: a server with the default Catchpoint routes
    let server = RunningServer::start(TestConfigBuilder::new().build()).await;
    let alert = catchpoint_alert(
        "Checkout",
        "Critical",
        &[("London", "timeout after 30s"), ("Paris", "HTTP 503")],
    );

    // When: the alert is pushed and the egress route is polled
    let pushed = server
        .request("POST", "/catchpoint/alerts", alert.as_bytes())
        .await;
    let drained = server.request("GET", "/sensu/results", b"").await;

    // Then: one result per failure, in document order, and nothing left behind
    assert_eq!(pushed.status, 200);
    assert_eq!(drained.status, 200);
    assert_eq!(
        drained.header("content-type"),
        Some("text/plain; charset=utf-8")
    );
    let results = decode_egress(&drained.body);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["name"], "Checkout");
    assert_eq!(results[0]["status"], 2);
    assert_eq!(results[0]["output"], "London: timeout after 30s");
    assert_eq!(results[1]["output"], "Paris: HTTP 503");

    let again = server.request("GET", "/sensu/results", b"").await;
    assert_eq!(again.status, 200);
    assert!(again.body.is_empty());

    server.stop().await.unwrap();
}

#[tokio::test]
async fn e2e_head_on_egress_keeps_results() {
    // Given: two buffered results
    let server = RunningServer::start(TestConfigBuilder::new().build()).await;
    let alert = catchpoint_alert(
        "Checkout",
        "Critical",
        &[("London", "timeout after 30s"), ("Paris", "HTTP 503")],
    );
    server
        .request("POST", "/catchpoint/alerts", alert.as_bytes())
        .await;

    // When: the egress route is hit with HEAD and POST
    let head = server.request("HEAD", "/sensu/results", b"").await;
    let post = server.request("POST", "/sensu/results", b"drain").await;

    // Then: both are refused and a later GET still gets everything
    assert_eq!(head.status, 405);
    assert_eq!(head.header("allow"), Some("GET"));
    assert_eq!(post.status, 405);
    assert_eq!(server.cache.len().await, 2);

    let drained = server.request("GET", "/sensu/results", b"").await;
    assert_eq!(decode_egress(&drained.body).len(), 2);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn e2e_improved_alert_without_failures_reports_ok() {
    // Given: a running server
    let server = RunningServer::start(TestConfigBuilder::new().build()).await;

    // When: an "Improved" notification with no failures arrives
    let alert = catchpoint_alert("Homepage", "Improved", &[]);
    server
        .request("POST", "/catchpoint/alerts", alert.as_bytes())
        .await;
    let drained = server.request("GET", "/sensu/results", b"").await;

    // Then: a single OK result summarizes the level
    let results = decode_egress(&drained.body);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["status"], 0);
    assert_eq!(results[0]["output"], "Homepage is Improved");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn e2e_rejected_requests_leave_cache_untouched() {
    // Given: a running server
    let server = RunningServer::start(TestConfigBuilder::new().build()).await;

    // When: an empty POST, a malformed payload, and an unrouted path arrive
    let empty = server.request("POST", "/catchpoint/alerts", b"").await;
    let malformed = server
        .request("POST", "/catchpoint/alerts", b"<Alert><oops")
        .await;
    let unrouted = server.request("GET", "/nowhere", b"").await;

    // Then: 400, 400, 404, and nothing was cached
    assert_eq!(empty.status, 400);
    assert_eq!(malformed.status, 400);
    assert_eq!(unrouted.status, 404);
    assert!(unrouted.body.is_empty());
    assert!(server.cache.is_empty().await);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn e2e_custom_routes_replace_defaults() {
    // Given: routes configured under a different prefix
    let config = TestConfigBuilder::new()
        .without_routes()
        .ingestion("/push/cp", "catchpoint_alerts")
        .egress("/pull")
        .build();
    let server = RunningServer::start(config).await;

    // When: the default path and the configured path are both used
    let alert = catchpoint_alert("Search", "Warning", &[("NYC", "slow")]);
    let old = server
        .request("POST", "/catchpoint/alerts", alert.as_bytes())
        .await;
    let new = server.request("POST", "/push/cp", alert.as_bytes()).await;
    let drained = server.request("GET", "/pull", b"").await;

    // Then: only the configured routes exist
    assert_eq!(old.status, 404);
    assert_eq!(new.status, 200);
    let results = decode_egress(&drained.body);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["status"], 1);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn e2e_request_bodies_are_dumped() {
    // Given: a dump directory
    let dir = tempfile::tempdir().unwrap();
    let config = TestConfigBuilder::new()
        .dump_requests_dir(dir.path().to_str().unwrap())
        .build();
    let server = RunningServer::start(config).await;

    // When: an alert is pushed
    let alert = catchpoint_alert("Login", "Critical", &[("Tokyo", "DNS failure")]);
    let response = server
        .request("POST", "/catchpoint/alerts", alert.as_bytes())
        .await;

    // Then: the raw body is written to exactly one new file
    assert_eq!(response.status, 200);
    let files: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(files.len(), 1);
    assert_eq!(std::fs::read_to_string(&files[0]).unwrap(), alert);

    server.stop().await.unwrap();
}
