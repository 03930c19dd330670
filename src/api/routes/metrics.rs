//! Metrics exposition endpoint

use axum::{extract::State, http::header, response::IntoResponse};

use crate::api::state::ApiState;
use crate::metrics::CONTENT_TYPE;

/// GET /metrics
pub async fn metrics(State(state): State<ApiState>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, CONTENT_TYPE)], state.metrics.render())
}
