use super::*;
use crate::media::ConcatHandler;
use crate::test_helpers::{ByteConcatHandler, test_config};
use axum::body::Body;
use axum::http::Request;
use axum::http::StatusCode;
use axum::response::Response;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;


/// Helper to create a test MergeService backed by `handler`, rooted in a temp dir
async fn create_test_service_with(
    handler: Arc<dyn ConcatHandler>,
    configure: impl FnOnce(&mut Config),
) -> (Arc<MergeService>, Arc<Config>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let mut config = test_config(&temp_dir);
    configure(&mut config);

    let service = MergeService::with_handler(config, handler).await.unwrap();
    let config = service.config.clone();
    (Arc::new(service), config, temp_dir)
}

/// Helper to create a test MergeService that joins inputs byte-wise
async fn create_test_service() -> (Arc<MergeService>, Arc<Config>, TempDir) {
    create_test_service_with(Arc::new(ByteConcatHandler), |_| {}).await
}

async fn body_json(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn test_api_server_spawns_and_stops() {
    let (service, config, _temp_dir) = create_test_service().await;

    // Port 0 = OS assigns a free port
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

    let api_handle = tokio::spawn(serve(listener, service, config, async move {
        stop_rx.await.ok();
    }));

    // The listener is already bound, so connecting succeeds right away
    let stream = tokio::net::TcpStream::connect(address).await;
    assert!(stream.is_ok());
    drop(stream);

    stop_tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), api_handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cors_enabled() {
    let (service, config, _temp_dir) = create_test_service().await;

    let app = create_router(service, config);

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_specific_origin() {
    let (service, config, _temp_dir) =
        create_test_service_with(Arc::new(ByteConcatHandler), |config| {
            config.api.cors_origins = vec!["https://app.example.com".to_string()];
        })
        .await;

    let app = create_router(service, config);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "https://app.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "https://app.example.com"
    );
}

#[tokio::test]
async fn test_cors_unlisted_origin_is_not_allowed() {
    let (service, config, _temp_dir) =
        create_test_service_with(Arc::new(ByteConcatHandler), |config| {
            config.api.cors_origins = vec!["https://app.example.com".to_string()];
        })
        .await;

    let app = create_router(service, config);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "https://other.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let (service, config, _temp_dir) =
        create_test_service_with(Arc::new(ByteConcatHandler), |config| {
            config.api.cors_enabled = false;
        })
        .await;

    let app = create_router(service, config);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn test_swagger_ui_can_be_disabled() {
    let (service, config, _temp_dir) =
        create_test_service_with(Arc::new(ByteConcatHandler), |config| {
            config.api.swagger_ui = false;
        })
        .await;

    let app = create_router(service, config);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/swagger-ui/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
