use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Storage and wire format for every timestamp (UTC, no zone suffix).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Shortest feedback body accepted, counted after trimming.
pub const CONTENT_MIN_CHARS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub id: i64,
    pub content: String,
    pub username: String,
    pub created_at: NaiveDateTime,
}

/// One username's endorsement of one feedback item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upvote {
    pub id: i64,
    pub feedback_id: i64,
    pub username: String,
    pub created_at: NaiveDateTime,
}

/// A feedback row annotated with values derived from its upvotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackSummary {
    pub feedback: Feedback,
    pub upvote_count: i64,
    pub user_has_voted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteAction {
    Added,
    Removed,
}

impl VoteAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
        }
    }
}

/// Result of flipping a username's vote on a feedback item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub action: VoteAction,
    pub upvote_count: i64,
    pub user_has_voted: bool,
}
