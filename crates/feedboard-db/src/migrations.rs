use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (feedbacks, upvotes)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE feedbacks (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                content     TEXT NOT NULL,
                username    TEXT NOT NULL CHECK (length(username) <= 50),
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_feedbacks_created
                ON feedbacks(created_at DESC, id DESC);

            CREATE TABLE upvotes (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                feedback_id INTEGER NOT NULL REFERENCES feedbacks(id) ON DELETE CASCADE,
                username    TEXT NOT NULL CHECK (length(username) <= 50),
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE(feedback_id, username)
            );

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
