#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;
use travel_advice_api::config::ServerConfig;
use travel_advice_api::router::build_app_router;
use travel_advice_api::state::AppState;
use travel_advice_core::country::Country;
use travel_advice_core::memory::MemoryEditionStore;
use travel_advice_core::testing::{FakeAssetManager, FixedClock, RecordingPublishingApi};
use travel_advice_core::EditionLifecycle;

pub const EDITOR: &str = "Joe Bloggs";
pub const ALBANIA_CONTENT_ID: &str = "2a3938e1-d588-45fc-8c8f-0f51814d5409";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
    }
}

/// The application under test plus handles on its fakes.
pub struct TestApp {
    pub router: Router,
    pub publishing: Arc<RecordingPublishingApi>,
    pub assets: Arc<FakeAssetManager>,
}

/// Build the full application router over the in-memory store.
pub fn build_test_app() -> TestApp {
    let store = MemoryEditionStore::new([
        Country::new("albania", ALBANIA_CONTENT_ID, "Albania"),
        Country::new("aruba", "56bae85b-a57c-4ca2-9dbd-68361a086bb3", "Aruba"),
    ]);
    let publishing = Arc::new(RecordingPublishingApi::new());
    let assets = Arc::new(FakeAssetManager::new());
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap(),
    ));

    let lifecycle = EditionLifecycle::new(Arc::new(store), publishing.clone(), assets.clone())
        .with_clock(clock);
    let config = test_config();
    let state = AppState { lifecycle };

    TestApp {
        router: build_app_router(state, &config),
        publishing,
        assets,
    }
}

async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

/// Send a request with the editor header and an optional JSON body.
pub async fn as_editor(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-editor-name", EDITOR);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    send(app, request).await
}

pub async fn post(app: &Router, uri: &str) -> Response<Body> {
    as_editor(app, Method::POST, uri, None).await
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    as_editor(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    as_editor(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    as_editor(app, Method::DELETE, uri, None).await
}

/// Send a multipart upload with a single `file` field.
pub async fn upload(
    app: &Router,
    uri: &str,
    filename: &str,
    content_type: &str,
    contents: &[u8],
) -> Response<Body> {
    let boundary = "travel-advice-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("x-editor-name", EDITOR)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create Albania's first draft and return its id.
pub async fn create_albania_draft(app: &Router) -> i64 {
    let response = post(app, "/api/v1/countries/albania/editions").await;
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
