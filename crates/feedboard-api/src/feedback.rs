use axum::{
    Json,
    extract::{Query, State},
};
use bytes::Bytes;
use tracing::warn;

use feedboard_types::api::{
    CreateFeedbackRequest, CreateFeedbackResponse, FeedbackItem, FeedbackListResponse,
};
use feedboard_types::models::{CONTENT_MIN_CHARS, FeedbackSummary};

use crate::error::ApiError;
use crate::state::{AppState, parse_body, with_db};

/// Viewer whose votes are reflected in `user_has_voted`. The last `username`
/// pair wins; a missing or blank one means no viewer.
fn viewer_from_query(pairs: Vec<(String, String)>) -> Option<String> {
    pairs
        .into_iter()
        .rev()
        .find(|(key, _)| key == "username")
        .map(|(_, value)| value)
        .filter(|value| !value.trim().is_empty())
}

/// GET /api/feedbacks/?username=<viewer>
pub async fn list_feedbacks(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<FeedbackListResponse>, ApiError> {
    let viewer = viewer_from_query(pairs);

    let rows = with_db(&state, move |db| db.list_feedback_for_viewer(viewer.as_deref())).await?;

    Ok(Json(FeedbackListResponse {
        feedbacks: rows.into_iter().map(FeedbackItem::from).collect(),
    }))
}

/// POST /api/feedbacks/
pub async fn create_feedback(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CreateFeedbackResponse>, ApiError> {
    let req: CreateFeedbackRequest = parse_body(&body)?;
    let content = req.content.trim().to_string();
    let username = req.username.trim().to_string();

    if content.is_empty() || username.is_empty() {
        return Err(ApiError::bad_request("Content and username required"));
    }

    if content.chars().count() < CONTENT_MIN_CHARS {
        warn!("Rejected short feedback from '{}'", username);
        return Err(ApiError::bad_request("Feedback too short (min 5 chars)"));
    }

    let feedback = with_db(&state, move |db| db.create_feedback(&content, &username)).await?;

    Ok(Json(CreateFeedbackResponse {
        success: true,
        message: "Feedback created successfully".to_string(),
        feedback: FeedbackItem::from(FeedbackSummary {
            feedback,
            upvote_count: 0,
            user_has_voted: false,
        }),
    }))
}
