//! Raw row shapes as SQLite returns them, before timestamps are parsed.

use chrono::NaiveDateTime;
use feedboard_types::models::{Feedback, TIMESTAMP_FORMAT, Upvote};

use crate::StoreError;

pub struct FeedbackRow {
    pub id: i64,
    pub content: String,
    pub username: String,
    pub created_at: String,
}

pub struct UpvoteRow {
    pub id: i64,
    pub feedback_id: i64,
    pub username: String,
    pub created_at: String,
}

fn parse_timestamp(raw: &str, table: &str, id: i64) -> Result<NaiveDateTime, StoreError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map_err(|e| {
        StoreError::CorruptRow(format!("{table} {id}: created_at '{raw}': {e}"))
    })
}

impl TryFrom<FeedbackRow> for Feedback {
    type Error = StoreError;

    fn try_from(row: FeedbackRow) -> Result<Self, Self::Error> {
        let created_at = parse_timestamp(&row.created_at, "feedback", row.id)?;
        Ok(Feedback {
            id: row.id,
            content: row.content,
            username: row.username,
            created_at,
        })
    }
}

impl TryFrom<UpvoteRow> for Upvote {
    type Error = StoreError;

    fn try_from(row: UpvoteRow) -> Result<Self, Self::Error> {
        let created_at = parse_timestamp(&row.created_at, "upvote", row.id)?;
        Ok(Upvote {
            id: row.id,
            feedback_id: row.feedback_id,
            username: row.username,
            created_at,
        })
    }
}
