//! Liveness and readiness checks.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::warn;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// `GET /health`
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /health/ready`: the database answers and its schema is current.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    if !state.db.health_check().await {
        warn!("Readiness check failed: database unreachable");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    match state.db.migrations_current().await {
        Ok(true) => Ok(Json(HealthResponse {
            status: "ready",
            version: env!("CARGO_PKG_VERSION"),
        })),
        Ok(false) => {
            warn!("Readiness check failed: pending migrations");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
        Err(e) => {
            warn!(error = %e, "Readiness check failed");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
