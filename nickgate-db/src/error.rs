use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlite(#[from] tokio_rusqlite::rusqlite::Error),

    #[error("database connection error: {0}")]
    Connection(tokio_rusqlite::Error),

    #[error("update for account {account_id} affected {rows} rows (expected 0 or 1)")]
    UpdateRowCount { account_id: u64, rows: usize },

    #[error("insert affected {rows} rows (expected exactly 1)")]
    InsertRowCount { rows: usize },
}

impl DbError {
    /// Row-count invariant violations point at a logic or concurrent-mutation
    /// bug rather than an I/O failure.
    pub fn is_integrity(&self) -> bool {
        matches!(
            self,
            DbError::UpdateRowCount { .. } | DbError::InsertRowCount { .. }
        )
    }
}

impl From<tokio_rusqlite::Error> for DbError {
    fn from(err: tokio_rusqlite::Error) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => DbError::Sqlite(e),
            other => DbError::Connection(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
