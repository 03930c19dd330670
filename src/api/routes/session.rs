//! Session gauge endpoints

use axum::{Json, extract::State};

use crate::api::{state::ApiState, types::OkResponse};

/// POST /api/session/start
pub async fn start_session(State(state): State<ApiState>) -> Json<OkResponse> {
    state.metrics.session_started();
    Json(OkResponse::ok())
}

/// POST /api/session/end
pub async fn end_session(State(state): State<ApiState>) -> Json<OkResponse> {
    state.metrics.session_ended();
    Json(OkResponse::ok())
}
