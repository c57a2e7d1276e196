use rusqlite::ErrorCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Feedback not found")]
    NotFound,

    /// A UNIQUE, CHECK or FOREIGN KEY constraint rejected a write.
    #[error("{0}")]
    ConstraintViolation(String),

    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    #[error("DB lock poisoned: {0}")]
    LockPoisoned(String),

    #[error(transparent)]
    Sqlite(rusqlite::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(err, msg)
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Self::ConstraintViolation(msg.clone().unwrap_or_else(|| err.to_string()))
            }
            _ => Self::Sqlite(e),
        }
    }
}
