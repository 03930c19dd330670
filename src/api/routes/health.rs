//! Liveness and readiness endpoints

use axum::{Json, extract::State, http::StatusCode};
use tracing::{debug, warn};

use crate::api::state::ApiState;
use crate::api::types::{OkResponse, ReadyResponse};

/// GET /healthz
///
/// Process liveness; never touches the backend
pub async fn healthz() -> Json<OkResponse> {
    Json(OkResponse::ok())
}

/// GET /readyz
///
/// Probes the selected backend
pub async fn readyz(State(state): State<ApiState>) -> (StatusCode, Json<ReadyResponse>) {
    match state.backend.health_check().await {
        Ok(()) => {
            debug!("{} backend ready", state.backend.name());
            (
                StatusCode::OK,
                Json(ReadyResponse {
                    ready: true,
                    error: None,
                }),
            )
        }
        Err(e) => {
            warn!("{} backend not ready: {}", state.backend.name(), e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ReadyResponse {
                    ready: false,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}
