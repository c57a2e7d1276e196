use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize, Serializer};

use crate::models::{FeedbackSummary, TIMESTAMP_FORMAT, ToggleOutcome, VoteAction};

fn serialize_timestamp<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&ts.format(TIMESTAMP_FORMAT))
}

// -- Feedback --

/// Missing fields decode as empty strings and are rejected by validation.
#[derive(Debug, Default, Deserialize)]
pub struct CreateFeedbackRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackItem {
    pub id: i64,
    pub content: String,
    pub username: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: NaiveDateTime,
    pub upvote_count: i64,
    pub user_has_voted: bool,
}

impl From<FeedbackSummary> for FeedbackItem {
    fn from(summary: FeedbackSummary) -> Self {
        Self {
            id: summary.feedback.id,
            content: summary.feedback.content,
            username: summary.feedback.username,
            created_at: summary.feedback.created_at,
            upvote_count: summary.upvote_count,
            user_has_voted: summary.user_has_voted,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FeedbackListResponse {
    pub feedbacks: Vec<FeedbackItem>,
}

#[derive(Debug, Serialize)]
pub struct CreateFeedbackResponse {
    pub success: bool,
    pub message: String,
    pub feedback: FeedbackItem,
}

// -- Votes --

#[derive(Debug, Default, Deserialize)]
pub struct ToggleVoteRequest {
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct ToggleVoteResponse {
    pub success: bool,
    pub action: VoteAction,
    pub upvote_count: i64,
    pub user_has_voted: bool,
}

impl From<ToggleOutcome> for ToggleVoteResponse {
    fn from(outcome: ToggleOutcome) -> Self {
        Self {
            success: true,
            action: outcome.action,
            upvote_count: outcome.upvote_count,
            user_has_voted: outcome.user_has_voted,
        }
    }
}

// -- Errors --

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
