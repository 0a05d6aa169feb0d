//! Tests for the remote data fetcher and auxiliary side files.

mod common;

use std::sync::Arc;

use common::{MockServer, Reply};
use drivechat::catalog::AuxiliaryKind;
use drivechat::fetch::Fetcher;
use drivechat::notify::RecordingNotifier;
use drivechat::stats::FrameSummary;
use drivechat::{AppStore, Config, DriveChatError};
use serde_json::json;

fn fetcher(notifier: &RecordingNotifier) -> Fetcher {
    Fetcher::new(reqwest::Client::new(), Arc::new(notifier.clone()))
}

#[tokio::test]
async fn test_get_json_parses_typed_body() {
    let server = MockServer::start(vec![(
        "GET /frames.json",
        Reply::json(json!([{
            "class_percentages": {"vegetation": 22.5},
            "ego_motion": {"acceleration": 0, "direction": "left", "speed": 8},
            "semantic_data": null,
            "instance_data": null
        }])),
    )])
    .await;
    let notifier = RecordingNotifier::new();
    let frames: Vec<FrameSummary> = fetcher(&notifier).get_json(&server.url("/frames.json")).await.unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].ego_motion.direction, "left");
    assert!(notifier.notifications().is_empty());
}

#[tokio::test]
async fn test_get_text_sends_text_accept() {
    let server = MockServer::start(vec![("GET /calib.txt", Reply::raw(200, "text/plain", "P0: 1 0 0\n"))]).await;
    let notifier = RecordingNotifier::new();
    let text = fetcher(&notifier).get_text(&server.url("/calib.txt")).await.unwrap();
    assert_eq!(text, "P0: 1 0 0\n");
    let reqs = server.requests_to("/calib.txt");
    assert_eq!(reqs[0].header("accept"), Some("text/plain"));
}

#[tokio::test]
async fn test_status_failure_is_reported_and_returned() {
    let server = MockServer::start(vec![("GET /gone.json", Reply::raw(503, "text/plain", "down"))]).await;
    let notifier = RecordingNotifier::new();
    let url = server.url("/gone.json");
    let err = fetcher(&notifier).get_json::<serde_json::Value>(&url).await.unwrap_err();
    match err {
        DriveChatError::FetchStatus { url: u, status } => {
            assert_eq!(u, url);
            assert_eq!(status, 503);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(notifier.errors(), vec!["Failed to load gone.json (503)".to_string()]);
}

#[tokio::test]
async fn test_transport_failure_is_reported() {
    let notifier = RecordingNotifier::new();
    let err = fetcher(&notifier).get_text("http://127.0.0.1:1/x.txt").await.unwrap_err();
    assert!(matches!(err, DriveChatError::Transport { .. }));
    assert_eq!(notifier.errors().len(), 1);
}

#[tokio::test]
async fn test_no_retries() {
    let server = MockServer::start(vec![]).await;
    let notifier = RecordingNotifier::new();
    let _ = fetcher(&notifier).get_json::<serde_json::Value>(&server.url("/missing.json")).await;
    assert_eq!(server.requests_to("/missing.json").len(), 1);
}

#[tokio::test]
async fn test_optional_text_is_silent_on_failure() {
    let server = MockServer::start(vec![]).await;
    let notifier = RecordingNotifier::new();
    let text = fetcher(&notifier).get_text_optional(&server.url("/times.txt")).await;
    assert!(text.is_none());
    assert!(notifier.notifications().is_empty());
}

#[tokio::test]
async fn test_store_caches_auxiliary_files() {
    let server = MockServer::start(vec![(
        "GET /scene_02/poses.txt",
        Reply::raw(200, "text/plain", "1 0 0 0 0 1 0 0 0 0 1 0\n"),
    )])
    .await;
    let config = Config { asset_base_url: server.base.clone(), ..Config::default() };
    let mut store = AppStore::new(&config, Arc::new(RecordingNotifier::new())).unwrap();
    let seq = store.catalog().get("02").cloned().unwrap();

    let first = store.fetch_auxiliary(&seq, AuxiliaryKind::Poses).await;
    let second = store.fetch_auxiliary(&seq, AuxiliaryKind::Poses).await;
    assert_eq!(first.as_deref(), Some("1 0 0 0 0 1 0 0 0 0 1 0\n"));
    assert_eq!(first, second);
    assert_eq!(server.requests_to("/scene_02/poses.txt").len(), 1);

    assert!(store.fetch_auxiliary(&seq, AuxiliaryKind::Times).await.is_none());
}
