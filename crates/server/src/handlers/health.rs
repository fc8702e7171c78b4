//! Health endpoint.

use axum::Json;
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok" when the server is able to answer.
    pub status: &'static str,
}

/// Handle `GET /v1/health`. Unauthenticated liveness probe.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
