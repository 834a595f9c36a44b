//! Shared test helpers for integration tests.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use enghub_api::{AppState, build_app};
use enghub_core::config::AppConfig;
use enghub_database::Database;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Store backing the router
    pub database: Database,
}

impl TestApp {
    /// Create a new test application over a fresh in-memory store
    pub async fn new() -> Self {
        let config = AppConfig::in_memory();
        let database = Database::connect(&config.database)
            .await
            .expect("Failed to open in-memory store");
        let router = build_app(AppState::new(config, database.clone()));
        Self { router, database }
    }

    /// Create an engineer through the API and return its id
    pub async fn create_engineer(&self, name: &str, name_ar: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/engineers",
                Some(serde_json::json!({ "name": name, "nameAR": name_ar })),
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Create failed: {:?}",
            response.body
        );

        response.body["data"]
            .as_str()
            .expect("No id in create response")
            .to_string()
    }

    /// Make an HTTP request to the test app
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();
        self.request_raw(method, path, Some("application/json"), body_str)
            .await
    }

    /// Make an HTTP request with a literal body and optional content type
    pub async fn request_raw(
        &self,
        method: &str,
        path: &str,
        content_type: Option<&str>,
        body: impl Into<String>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(content_type) = content_type {
            builder = builder.header("Content-Type", content_type);
        }
        let req = builder
            .body(Body::from(body.into()))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Status and decoded JSON body of a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Response body (`Null` when not JSON)
    pub body: Value,
}
