use axum::{
    Json,
    extract::{Path, State},
};
use bytes::Bytes;

use feedboard_types::api::{ToggleVoteRequest, ToggleVoteResponse};

use crate::error::ApiError;
use crate::state::{AppState, parse_body, with_db};

/// POST /api/feedbacks/{feedback_id}/vote/
///
/// Adds the username's upvote if absent, removes it if present.
pub async fn toggle_vote(
    State(state): State<AppState>,
    Path(feedback_id): Path<String>,
    body: Bytes,
) -> Result<Json<ToggleVoteResponse>, ApiError> {
    let feedback_id = parse_feedback_id(&feedback_id).ok_or_else(ApiError::feedback_not_found)?;

    let req: ToggleVoteRequest = parse_body(&body)?;
    let username = req.username.trim().to_string();
    if username.is_empty() {
        return Err(ApiError::bad_request("Username required"));
    }

    let outcome = with_db(&state, move |db| db.toggle_upvote(feedback_id, &username)).await?;

    Ok(Json(ToggleVoteResponse::from(outcome)))
}

/// Ids are bare decimal digits; signs, spaces and overflow never name a row.
fn parse_feedback_id(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}
