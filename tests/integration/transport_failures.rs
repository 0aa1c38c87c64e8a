//! Per-call deadlines and network failures.

use crate::integration::mock_server::{closed_port_url, stalled_server, MockServerFixture};
use imagegen_client::{ErrorKind, GenerationRequest, ImageClient, JobHandle, RecordingObserver};
use serde_json::json;
use std::time::{Duration, Instant};

#[tokio::test]
async fn test_stalled_call_times_out_with_configured_duration() {
    let (url, server) = stalled_server().await;
    let client = ImageClient::builder()
        .base_url(url)
        .request_timeout(Duration::from_millis(300))
        .build()
        .unwrap();

    let started = Instant::now();
    let err = client.list_styles().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_eq!(err.to_string(), "Request timed out after 300 ms");
    assert!(started.elapsed() < Duration::from_secs(3));
    server.abort();
}

#[tokio::test]
async fn test_unreachable_service_is_a_network_error() {
    let client = ImageClient::builder()
        .base_url(closed_port_url())
        .build()
        .unwrap();

    let err = client.queue_status().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_health_never_errors() {
    let unreachable = ImageClient::builder()
        .base_url(closed_port_url())
        .build()
        .unwrap();
    assert!(!unreachable.health().await);

    let (url, server) = stalled_server().await;
    let stalled = ImageClient::builder()
        .base_url(url)
        .health_timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    assert!(!stalled.health().await);
    server.abort();
}

#[tokio::test]
async fn test_stalled_status_query_fails_the_job_wait() {
    let (url, server) = stalled_server().await;
    let client = ImageClient::builder()
        .base_url(url)
        .request_timeout(Duration::from_millis(200))
        .poll_interval(Duration::from_millis(10))
        .poll_budget(Duration::from_secs(5))
        .build()
        .unwrap();

    let observer = RecordingObserver::new();
    let err = client
        .wait_for_job(&JobHandle::new("job-x"), &observer)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_eq!(err.to_string(), "Request timed out after 200 ms");
    assert!(observer.is_empty());
    server.abort();
}

#[tokio::test]
async fn test_submission_timeout_is_reported() {
    let (url, server) = stalled_server().await;
    let client = ImageClient::builder()
        .base_url(url)
        .request_timeout(Duration::from_secs(1))
        .build()
        .unwrap();

    let err = client
        .generate(&GenerationRequest::new("a red fox"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Request timed out after 1 second");
    server.abort();
}

#[tokio::test]
async fn test_invalid_configuration_is_rejected() {
    let err = ImageClient::builder().base_url("not a url").build().err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let fixture = MockServerFixture::new().await;
    let err = fixture
        .builder()
        .poll_interval(Duration::from_secs(10))
        .poll_budget(Duration::from_secs(1))
        .build()
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    // Trailing slash on the base URL still reaches the right paths.
    let _m = fixture.mock_json("GET", "/api/v1/styles", 200, json!({"styles": ["x"]})).await;
    let client = ImageClient::builder()
        .base_url(format!("{}/", fixture.base_url))
        .build()
        .unwrap();
    assert_eq!(client.list_styles().await.unwrap(), vec!["x"]);
}

#[tokio::test]
async fn test_poll_budget_bounds_an_in_flight_status_query() {
    let (url, server) = stalled_server().await;
    let client = ImageClient::builder()
        .base_url(url)
        .request_timeout(Duration::from_secs(2))
        .poll_interval(Duration::from_millis(10))
        .poll_budget(Duration::from_millis(200))
        .build()
        .unwrap();

    let started = Instant::now();
    let err = client
        .wait_for_job(&JobHandle::new("job-slow"), &RecordingObserver::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_eq!(err.to_string(), "Generation timed out - please try again");
    assert!(started.elapsed() < Duration::from_secs(1));
    server.abort();
}
