//! Alignment client tests against a mock alignment service

mod helpers;

use helpers::{spawn_mock_aligner, MockResponse};
use mushaf_align::config::AlignmentConfig;
use mushaf_align::error::AlignmentServiceError;
use mushaf_align::services::{AlignmentClient, AlignmentService};
use serde_json::json;
use std::time::Duration;

const AUDIO_URL: &str = "https://cdn.example.org/audio/001.mp3";

#[tokio::test]
async fn test_align_decodes_events() {
    let server = spawn_mock_aligner(MockResponse::Json(json!([
        {"text": "بِسْمِ", "start": 0.0, "end": 0.42},
        {"text": "ٱللَّهِ", "start": 0.42, "end": 0.9},
        {"text": "ٱلرَّحْمَٰنِ", "start": 0.9}
    ])))
    .await;
    let client = AlignmentClient::new(&AlignmentConfig::new(server.base_url())).unwrap();

    let events = client.align(AUDIO_URL, "بِسْمِ ٱللَّهِ ٱلرَّحْمَٰنِ").await.unwrap();

    assert_eq!(events.len(), 3);
    assert_eq!(events[0].text, "بِسْمِ");
    assert_eq!(events[1].start, 0.42);
    assert_eq!(events[1].end, Some(0.9));
    assert_eq!(events[2].end, None);
}

#[tokio::test]
async fn test_request_body_shape() {
    let server = spawn_mock_aligner(MockResponse::Json(json!([]))).await;
    let client = AlignmentClient::new(&AlignmentConfig::new(server.base_url())).unwrap();

    client.align(AUDIO_URL, "a b c").await.unwrap();

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].body,
        json!({"mp3_url": AUDIO_URL, "text": "a b c", "language": "ar"})
    );
}

#[tokio::test]
async fn test_secret_key_sent_as_authorization() {
    let server = spawn_mock_aligner(MockResponse::Json(json!([]))).await;
    let config = AlignmentConfig::new(server.base_url())
        .with_secret_key(Some("s3cr3t-token".to_string()));
    let client = AlignmentClient::new(&config).unwrap();

    client.align(AUDIO_URL, "a").await.unwrap();

    assert_eq!(
        server.requests()[0].authorization.as_deref(),
        Some("s3cr3t-token")
    );
}

#[tokio::test]
async fn test_no_authorization_without_secret_key() {
    let server = spawn_mock_aligner(MockResponse::Json(json!([]))).await;
    let config = AlignmentConfig::new(server.base_url()).with_secret_key(Some("  ".to_string()));
    let client = AlignmentClient::new(&config).unwrap();

    client.align(AUDIO_URL, "a").await.unwrap();

    assert_eq!(server.requests()[0].authorization, None);
}

#[tokio::test]
async fn test_http_500_is_status_error() {
    let server = spawn_mock_aligner(MockResponse::Status(
        500,
        "model not loaded".to_string(),
    ))
    .await;
    let client = AlignmentClient::new(&AlignmentConfig::new(server.base_url())).unwrap();

    let err = client.align(AUDIO_URL, "a").await.unwrap_err();

    match &err {
        AlignmentServiceError::Status { status, body } => {
            assert_eq!(*status, 500);
            assert_eq!(body, "model not loaded");
        }
        other => panic!("expected status error, got {:?}", other),
    }
    assert!(err.to_string().contains("model not loaded"));
}

#[tokio::test]
async fn test_unparseable_body_is_malformed() {
    let server = spawn_mock_aligner(MockResponse::Raw("<html>oops</html>".to_string())).await;
    let client = AlignmentClient::new(&AlignmentConfig::new(server.base_url())).unwrap();

    let err = client.align(AUDIO_URL, "a").await.unwrap_err();

    assert!(matches!(err, AlignmentServiceError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_negative_offset_is_malformed() {
    let server = spawn_mock_aligner(MockResponse::Json(json!([
        {"text": "a", "start": -1.0, "end": 0.5}
    ])))
    .await;
    let client = AlignmentClient::new(&AlignmentConfig::new(server.base_url())).unwrap();

    let err = client.align(AUDIO_URL, "a").await.unwrap_err();

    assert!(matches!(err, AlignmentServiceError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let server = spawn_mock_aligner(MockResponse::Delay(Duration::from_secs(5))).await;
    let config =
        AlignmentConfig::new(server.base_url()).with_timeout(Duration::from_millis(200));
    let client = AlignmentClient::new(&config).unwrap();

    let err = client.align(AUDIO_URL, "a").await.unwrap_err();

    match err {
        AlignmentServiceError::Timeout(limit) => assert_eq!(limit, Duration::from_millis(200)),
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() {
    // Bind then drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client =
        AlignmentClient::new(&AlignmentConfig::new(format!("http://{}", addr))).unwrap();

    let err = client.align(AUDIO_URL, "a").await.unwrap_err();

    assert!(matches!(err, AlignmentServiceError::Network(_)));
}

#[test]
fn test_endpoint_appends_align() {
    let client = AlignmentClient::new(&AlignmentConfig::new("http://aligner.local/")).unwrap();
    assert_eq!(client.endpoint(), "http://aligner.local/align");
}
