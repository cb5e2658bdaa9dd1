use super::*;
use crate::convert::{FormatConverter, HostPlatform, StagingArea};
use crate::fetch::{MetadataFetcher, PayloadFetcher};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;
use url::Url;
use wiremock::MockServer;


/// Service wired to a mock record-lookup server, with the in-process decoder only
fn create_test_service(server: &MockServer) -> (Arc<ConversionService>, TempDir) {
    let scratch = tempfile::tempdir().unwrap();
    let client = reqwest::Client::new();
    let base = Url::parse(&format!("{}/shortcuts/api/records", server.uri())).unwrap();
    let converter = FormatConverter::new(
        None,
        StagingArea::new(scratch.path()).unwrap(),
        HostPlatform::Other,
    );
    let service = ConversionService::new(
        MetadataFetcher::new(client.clone(), base),
        PayloadFetcher::new(client),
        converter,
    );
    (Arc::new(service), scratch)
}

/// Router over [`create_test_service`] with the given config
async fn create_test_app(config: Config) -> (Router, MockServer, TempDir) {
    let server = MockServer::start().await;
    let (service, scratch) = create_test_service(&server);
    let app = create_router(service, Arc::new(config));
    (app, server, scratch)
}

async fn get(app: Router, uri: &str) -> axum::response::Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_api_server_spawns() {
    let server = MockServer::start().await;
    let (service, _scratch) = create_test_service(&server);

    let mut config = Config::default();
    config.api.bind_address = "127.0.0.1:0".parse().unwrap(); // Port 0 = OS assigns a free port
    let config = Arc::new(config);

    let api_handle = tokio::spawn(async move { start_api_server(service, config).await });

    // Give it a moment to start
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!api_handle.is_finished(), "server should still be running");

    api_handle.abort();
}

#[tokio::test]
async fn test_cors_enabled() {
    let (app, _server, _scratch) = create_test_app(Config::default()).await;

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*",
        "wildcard origin should be allowed by default"
    );
}

#[tokio::test]
async fn test_cors_preflight_lists_configured_methods() {
    let (app, _server, _scratch) = create_test_app(Config::default()).await;

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/")
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "GET")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(response.status().is_success());
    let methods = response.headers()["access-control-allow-methods"]
        .to_str()
        .unwrap()
        .to_string();
    for method in ["GET", "POST", "OPTIONS"] {
        assert!(methods.contains(method), "{method} missing from {methods}");
    }
}

#[tokio::test]
async fn test_cors_specific_origins() {
    let mut config = Config::default();
    config.api.cors_origins = vec!["http://allowed.example".to_string()];
    let (app, _server, _scratch) = create_test_app(config).await;

    let allowed = Request::builder()
        .uri("/health")
        .header("Origin", "http://allowed.example")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(allowed).await.unwrap();
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://allowed.example"
    );

    let denied = Request::builder()
        .uri("/health")
        .header("Origin", "http://other.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(denied).await.unwrap();
    assert!(
        response
            .headers()
            .get("access-control-allow-origin")
            .is_none()
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let mut config = Config::default();
    config.api.cors_enabled = false;
    let (app, _server, _scratch) = create_test_app(config).await;

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(
        response
            .headers()
            .get("access-control-allow-origin")
            .is_none(),
        "CORS headers should not be present when disabled"
    );
}

#[tokio::test]
async fn test_swagger_ui_toggle() {
    let (app, _server, _scratch) = create_test_app(Config::default()).await;
    let response = get(app, "/swagger-ui/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let mut config = Config::default();
    config.api.swagger_ui = false;
    let (app, _server, _scratch) = create_test_app(config).await;
    let response = get(app, "/swagger-ui/").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
