/// Health check endpoint
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "store": "connected"
/// }
/// ```
///
/// An unreachable store reports `"degraded"` / `"disconnected"` with status 200
/// so load balancers can distinguish a live process from a dead one.

use crate::app::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Application version
    pub version: String,

    /// Document store status
    pub store: String,
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_status = match state.store.ping().await {
        Ok(()) => "connected",
        Err(err) => {
            tracing::warn!(error = %err, "Health check could not reach the document store");
            "disconnected"
        }
    };

    Json(HealthResponse {
        status: if store_status == "connected" {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: store_status.to_string(),
    })
}
