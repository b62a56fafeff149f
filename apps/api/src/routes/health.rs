//! Health check HTTP route handlers
//!
//! Provides endpoints for checking the health of the API and its storage:
//! - `GET /health` - Simple liveness check (returns 200 OK)
//! - `GET /health/ready` - Readiness check (pings the storage backend)
//! - `GET /health/live` - Kubernetes-style liveness check

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use std::sync::Arc;

use crate::services::HealthService;
use crate::storage::SharedStorage;

/// Shared application state for health check handlers
#[derive(Clone)]
pub struct HealthState {
    /// Health check service
    pub health_service: Arc<HealthService>,
}

impl HealthState {
    /// Create new health state over a storage backend
    pub fn new(storage: SharedStorage) -> Self {
        Self {
            health_service: Arc::new(HealthService::new(storage)),
        }
    }
}

/// Create health check router
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/", get(simple_health))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .with_state(state)
}

/// Simple health check - always returns OK if the server is running
async fn simple_health() -> &'static str {
    "OK"
}

/// Liveness check for Kubernetes
///
/// Returns 200 if the server process is running and can handle requests.
/// This should NOT check external dependencies - that's what readiness is for.
async fn liveness() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness check - checks the storage backend
///
/// # Response
/// - 200 OK if storage answers
/// - 503 Service Unavailable otherwise
async fn readiness(State(state): State<HealthState>) -> impl IntoResponse {
    let response = state.health_service.check_all().await;

    let status_code = if response.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simple_health() {
        let response = simple_health().await;
        assert_eq!(response, "OK");
    }

    #[tokio::test]
    async fn test_liveness_returns_ok() {
        let response = liveness().await;
        let json = response.into_response();
        assert_eq!(json.status(), StatusCode::OK);
    }
}
