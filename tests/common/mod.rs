// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use coach_trail::config::Config;
use coach_trail::routes::create_router;
use coach_trail::AppState;
use serde_json::Value;
use std::sync::Arc;

/// Create a test app whose upstream calls go to `config`'s endpoints.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(config: Config) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(&config).expect("Failed to build app state"));
    (create_router(state.clone()), state)
}

/// Test app with every Polar endpoint on the mock server at `base_url`.
#[allow(dead_code)]
pub fn create_mocked_app(base_url: &str) -> axum::Router {
    create_test_app(Config::with_upstream(base_url)).0
}

/// Build a JSON POST request.
#[allow(dead_code)]
pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).expect("Body should be JSON")
}
