use feedboard_types::models::{Feedback, FeedbackSummary, ToggleOutcome, Upvote, VoteAction};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, info};

use crate::models::{FeedbackRow, UpvoteRow};
use crate::{Database, Result, StoreError};

impl Database {
    // -- Feedback --

    pub fn create_feedback(&self, content: &str, username: &str) -> Result<Feedback> {
        let feedback = self.with_conn_mut(|conn| {
            let row = conn.query_row(
                "INSERT INTO feedbacks (content, username) VALUES (?1, ?2)
                 RETURNING id, content, username, created_at",
                params![content, username],
                feedback_row,
            )?;
            Feedback::try_from(row)
        })?;

        info!("Feedback {} created by '{}'", feedback.id, feedback.username);
        Ok(feedback)
    }

    /// Every feedback item, newest first.
    pub fn list_feedback(&self) -> Result<Vec<Feedback>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, content, username, created_at
                 FROM feedbacks
                 ORDER BY created_at DESC, id DESC",
            )?;

            let rows = stmt
                .query_map([], feedback_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            rows.into_iter().map(Feedback::try_from).collect()
        })
    }

    /// Every feedback item, newest first, with its upvote count and whether
    /// `viewer` has voted on it. A `None` viewer has voted on nothing.
    pub fn list_feedback_for_viewer(&self, viewer: Option<&str>) -> Result<Vec<FeedbackSummary>> {
        self.with_conn(|conn| {
            // Counts and the viewer flag come back in one pass (no N+1)
            let mut stmt = conn.prepare(
                "SELECT f.id, f.content, f.username, f.created_at,
                        (SELECT COUNT(*) FROM upvotes u WHERE u.feedback_id = f.id),
                        EXISTS (SELECT 1 FROM upvotes u
                                WHERE u.feedback_id = f.id AND u.username = ?1)
                 FROM feedbacks f
                 ORDER BY f.created_at DESC, f.id DESC",
            )?;

            let rows = stmt
                .query_map([viewer], |row| {
                    Ok((feedback_row(row)?, row.get::<_, i64>(4)?, row.get::<_, bool>(5)?))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            rows.into_iter()
                .map(|(row, upvote_count, user_has_voted)| -> Result<FeedbackSummary> {
                    Ok(FeedbackSummary {
                        feedback: Feedback::try_from(row)?,
                        upvote_count,
                        user_has_voted,
                    })
                })
                .collect()
        })
    }

    pub fn get_feedback(&self, id: i64) -> Result<Feedback> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, content, username, created_at FROM feedbacks WHERE id = ?1",
                    [id],
                    feedback_row,
                )
                .optional()?
                .ok_or(StoreError::NotFound)?;
            Feedback::try_from(row)
        })
    }

    /// Delete a feedback item and, through the cascade, all of its upvotes.
    /// Returns how many upvotes went with it.
    pub fn delete_feedback(&self, id: i64) -> Result<usize> {
        let removed_upvotes = self.with_conn_mut(|conn| {
            if !feedback_exists(conn, id)? {
                return Err(StoreError::NotFound);
            }
            let upvotes = query_upvote_count(conn, id)?;
            conn.execute("DELETE FROM feedbacks WHERE id = ?1", [id])?;
            Ok(usize::try_from(upvotes).unwrap_or_default())
        })?;

        info!("Feedback {} deleted ({} upvotes cascaded)", id, removed_upvotes);
        Ok(removed_upvotes)
    }

    // -- Upvotes --

    pub fn count_upvotes(&self, feedback_id: i64) -> Result<i64> {
        self.with_conn(|conn| query_upvote_count(conn, feedback_id))
    }

    pub fn has_voted(&self, feedback_id: i64, username: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let voted = conn.query_row(
                "SELECT EXISTS (SELECT 1 FROM upvotes WHERE feedback_id = ?1 AND username = ?2)",
                params![feedback_id, username],
                |row| row.get(0),
            )?;
            Ok(voted)
        })
    }

    /// Fails with `ConstraintViolation` if `username` already upvoted this item
    /// or the item does not exist.
    pub fn create_upvote(&self, feedback_id: i64, username: &str) -> Result<Upvote> {
        self.with_conn_mut(|conn| {
            let row = conn.query_row(
                "INSERT INTO upvotes (feedback_id, username) VALUES (?1, ?2)
                 RETURNING id, feedback_id, username, created_at",
                params![feedback_id, username],
                |row| {
                    Ok(UpvoteRow {
                        id: row.get(0)?,
                        feedback_id: row.get(1)?,
                        username: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )?;
            Upvote::try_from(row)
        })
    }

    /// Returns whether a matching upvote existed.
    pub fn delete_upvote(&self, feedback_id: i64, username: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let removed = conn.execute(
                "DELETE FROM upvotes WHERE feedback_id = ?1 AND username = ?2",
                params![feedback_id, username],
            )?;
            Ok(removed > 0)
        })
    }

    /// Toggle an upvote: removes it if present, inserts it if not.
    ///
    /// The existence check, the write and the recount share one immediate
    /// transaction, so two toggles for the same pair cannot both insert.
    pub fn toggle_upvote(&self, feedback_id: i64, username: &str) -> Result<ToggleOutcome> {
        let outcome = self.with_conn_mut(|conn| {
            if !feedback_exists(conn, feedback_id)? {
                return Err(StoreError::NotFound);
            }

            let removed = conn.execute(
                "DELETE FROM upvotes WHERE feedback_id = ?1 AND username = ?2",
                params![feedback_id, username],
            )?;

            let action = if removed > 0 {
                VoteAction::Removed
            } else {
                conn.execute(
                    "INSERT INTO upvotes (feedback_id, username) VALUES (?1, ?2)",
                    params![feedback_id, username],
                )?;
                VoteAction::Added
            };

            Ok(ToggleOutcome {
                action,
                upvote_count: query_upvote_count(conn, feedback_id)?,
                user_has_voted: action == VoteAction::Added,
            })
        })?;

        debug!(
            "Upvote {} on feedback {} by '{}' (count now {})",
            outcome.action.as_str(),
            feedback_id,
            username,
            outcome.upvote_count
        );
        Ok(outcome)
    }
}

fn feedback_row(row: &Row<'_>) -> rusqlite::Result<FeedbackRow> {
    Ok(FeedbackRow {
        id: row.get(0)?,
        content: row.get(1)?,
        username: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn feedback_exists(conn: &Connection, id: i64) -> Result<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM feedbacks WHERE id = ?1)",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

fn query_upvote_count(conn: &Connection, feedback_id: i64) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM upvotes WHERE feedback_id = ?1",
        [feedback_id],
        |row| row.get(0),
    )?;
    Ok(count)
}
