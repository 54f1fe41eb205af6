//! End-to-end tests against a real server on an ephemeral port
//!
//! Sources are served by wiremock and concatenation is done in-process, so
//! these tests need neither network access nor ffmpeg.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{ByteConcatHandler, TestServer, test_config};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn source_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"intro".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"-outro".to_vec()))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn merge_then_download_then_expire() {
    let temp = TempDir::new().unwrap();
    let mut config = test_config(&temp);
    config.retention.expiry_delay = Duration::from_millis(300);
    let server = TestServer::start(config, Arc::new(ByteConcatHandler)).await;
    let sources = source_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/merge"))
        .json(&json!({
            "url1": format!("{}/a.mp4", sources.uri()),
            "url2": format!("{}/b.mp4", sources.uri()),
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    let url = body["url"].as_str().unwrap().to_string();
    assert!(
        url.starts_with(&format!("http://{}/files/", server.address)),
        "url derived from Host header: {url}"
    );
    assert_eq!(body["size_bytes"], 11);

    let merged = client.get(&url).send().await.unwrap();
    assert_eq!(merged.status(), 200);
    assert_eq!(merged.bytes().await.unwrap().as_ref(), b"intro-outro");

    tokio::time::sleep(Duration::from_millis(800)).await;
    let gone = client.get(&url).send().await.unwrap();
    assert_eq!(gone.status(), 404);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn configured_public_base_url_is_returned() {
    let temp = TempDir::new().unwrap();
    let mut config = test_config(&temp);
    config.storage.public_base_url = Some("https://media.example.com".to_string());
    let server = TestServer::start(config, Arc::new(ByteConcatHandler)).await;
    let sources = source_server().await;

    let body: Value = reqwest::Client::new()
        .post(server.url("/merge"))
        .json(&json!({
            "url1": format!("{}/a.mp4", sources.uri()),
            "url2": format!("{}/b.mp4", sources.uri()),
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(
        body["url"]
            .as_str()
            .unwrap()
            .starts_with("https://media.example.com/files/")
    );

    server.stop().await.unwrap();
}

#[tokio::test]
async fn upstream_failure_maps_to_bad_request() {
    let temp = TempDir::new().unwrap();
    let server = TestServer::start(test_config(&temp), Arc::new(ByteConcatHandler)).await;
    let sources = source_server().await;

    let response = reqwest::Client::new()
        .post(server.url("/merge"))
        .json(&json!({
            "url1": format!("{}/a.mp4", sources.uri()),
            "url2": format!("{}/nope.mp4", sources.uri()),
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "download_failed");
    assert_eq!(body["error"]["details"]["input"], 2);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn stop_cancels_pending_deletions_and_keeps_files() {
    let temp = TempDir::new().unwrap();
    let server = TestServer::start(test_config(&temp), Arc::new(ByteConcatHandler)).await;
    let sources = source_server().await;

    let response = reqwest::Client::new()
        .post(server.url("/merge"))
        .json(&json!({
            "url1": format!("{}/a.mp4", sources.uri()),
            "url2": format!("{}/b.mp4", sources.uri()),
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let service = server.service.clone();
    assert_eq!(service.expiry().pending_count().await, 1);

    server.stop().await.unwrap();

    assert_eq!(service.expiry().pending_count().await, 0);
    let files = std::fs::read_dir(temp.path().join("output")).unwrap().count();
    assert_eq!(files, 1, "the next start's sweep reclaims it");
}

#[tokio::test]
async fn startup_sweep_removes_stale_outputs() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("output");
    std::fs::create_dir_all(&output).unwrap();

    let stale = output.join("0123456789abcdef0123456789abcdef.mp4");
    std::fs::write(&stale, b"old").unwrap();
    let long_ago = std::time::SystemTime::now() - Duration::from_secs(3600);
    std::fs::File::options()
        .write(true)
        .open(&stale)
        .unwrap()
        .set_modified(long_ago)
        .unwrap();

    let fresh = output.join("fedcba9876543210fedcba9876543210.mp4");
    std::fs::write(&fresh, b"new").unwrap();

    let server = TestServer::start(test_config(&temp), Arc::new(ByteConcatHandler)).await;

    assert!(!stale.exists());
    assert!(fresh.exists());

    server.stop().await.unwrap();
}
