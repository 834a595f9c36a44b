//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use enghub_core::types::{Envelope, FieldErrors};

use crate::state::AppState;

/// Health report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` or `"degraded"`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Active store provider.
    pub database: String,
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Envelope<HealthResponse>>) {
    let healthy = match state.database.health_check().await {
        Ok(ok) => ok,
        Err(e) => {
            tracing::warn!(error = %e, "Store health check failed");
            false
        }
    };

    let report = HealthResponse {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: state.database.provider_name().to_string(),
    };
    if healthy {
        (StatusCode::OK, Json(Envelope::success_with(report)))
    } else {
        let envelope = Envelope {
            is_success: false,
            message: "Store is unavailable".to_string(),
            data: Some(report),
            errors: FieldErrors::new(),
        };
        (StatusCode::SERVICE_UNAVAILABLE, Json(envelope))
    }
}
