//! Scores API

use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use tracing::debug;

use crate::api::{error::ApiResult, state::ApiState};
use crate::score::{ScoreRecord, ScoreSubmission};
use crate::storage::LIST_LIMIT;

/// GET /api/scores
///
/// Returns up to 50 scores, newest first
pub async fn list_scores(State(state): State<ApiState>) -> ApiResult<Json<Vec<ScoreRecord>>> {
    let scores = state.backend.list_recent(LIST_LIMIT).await?;
    Ok(Json(scores))
}

/// POST /api/scores
///
/// Body: `{"user_id": "optional", "points": <number>}`. The body is read raw
/// so that a malformed payload yields a 400 with an `error` message.
pub async fn submit_score(
    State(state): State<ApiState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<ScoreRecord>)> {
    let submission = ScoreSubmission::from_body(&body)?;
    let record = ScoreRecord::from_submission(submission)?;

    state.metrics.score_submitted();

    let record = state.backend.insert(record).await?;
    debug!("accepted score {}", record);

    Ok((StatusCode::CREATED, Json(record)))
}
