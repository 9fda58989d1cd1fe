// handlers/public/mod.rs - endpoints that need no authentication

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::config;
use crate::middleware::ApiResponse;
use crate::state::AppState;

/// GET / - service identification
pub async fn root_get() -> impl IntoResponse {
    ApiResponse::success(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "environment": config::config().environment,
    }))
}

/// GET /health - store connectivity
pub async fn health_get(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.health_check().await {
        Ok(()) => ApiResponse::success(json!({ "status": "ok", "store": state.store.name() })).into_response(),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "success": false, "status": "degraded", "store": state.store.name() })),
            )
                .into_response()
        }
    }
}
