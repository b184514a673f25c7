/// Common test utilities for integration tests
///
/// Builds the full router on top of an in-memory document store so the HTTP
/// surface can be exercised without a database.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::Config;
use taskboard_shared::store::memory::InMemoryDocumentStore;
use tower::Service as _;

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: Arc<InMemoryDocumentStore>,
    pub app: axum::Router,
}

impl TestContext {
    /// Creates a new test context with an empty store
    pub fn new() -> Self {
        let config = Config::from_lookup(|key| match key {
            "STORE_BACKEND" => Some("memory".to_string()),
            "API_HOST" => Some("127.0.0.1".to_string()),
            _ => None,
        })
        .expect("test configuration is valid");

        let store = Arc::new(InMemoryDocumentStore::new());
        let app = build_router(AppState::new(store.clone(), config));

        TestContext { store, app }
    }

    /// Sends a request and returns the status and decoded JSON body
    ///
    /// An empty body decodes to `Value::Null`.
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.send_raw(builder.body(body).unwrap()).await
    }

    /// Sends a pre-built request
    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!(
                    "Expected JSON body with status {}, got: {}",
                    status,
                    String::from_utf8_lossy(&bytes)
                )
            })
        };

        (status, json)
    }

    /// Creates a document through the API and returns its identifier
    pub async fn create(&self, collection: &str, body: Value) -> String {
        let (status, json) = self
            .send("POST", &format!("/v1/{}", collection), Some(body))
            .await;
        assert_eq!(status, StatusCode::OK, "create failed: {}", json);
        assert_eq!(json["acknowledged"], true);

        json["insertedId"]
            .as_str()
            .expect("insertedId is a string")
            .to_string()
    }

    /// Fetches one document through the API
    pub async fn fetch(&self, collection: &str, id: &str) -> Value {
        let (status, json) = self
            .send("GET", &format!("/v1/{}/{}", collection, id), None)
            .await;
        assert_eq!(status, StatusCode::OK, "fetch failed: {}", json);
        json
    }
}
