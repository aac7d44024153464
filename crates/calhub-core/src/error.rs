//! Storage error types shared across calhub crates.
//!
//! `DatabaseError` classifies SQLite failures so callers can tell a busy
//! database (worth retrying) from a broken query or a corrupt file.

use thiserror::Error;

/// Database/storage errors (SQLite).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatabaseError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Database is busy: {0}")]
    Busy(String),

    #[error("Data corruption detected: {0}")]
    Corruption(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

impl DatabaseError {
    pub fn user_message(&self) -> &'static str {
        match self {
            DatabaseError::ConnectionFailed(_) => {
                "Unable to open the calendar database. Check the storage path."
            }
            DatabaseError::QueryFailed(_) => "A data operation failed. Please try again.",
            DatabaseError::Busy(_) => "The calendar database is busy. Please try again.",
            DatabaseError::Corruption(_) => {
                "The calendar database may be corrupted. Consider recreating it."
            }
            DatabaseError::MigrationFailed(_) => {
                "Failed to prepare the calendar database schema."
            }
        }
    }

    /// Whether retrying the same operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, DatabaseError::Busy(_))
    }
}

/// Extension trait for converting rusqlite errors to our error types.
pub trait RusqliteErrorExt {
    fn into_database_error(self) -> DatabaseError;
}

impl RusqliteErrorExt for rusqlite::Error {
    fn into_database_error(self) -> DatabaseError {
        match &self {
            rusqlite::Error::SqliteFailure(err, _)
                if matches!(
                    err.code,
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
                ) =>
            {
                DatabaseError::Busy(self.to_string())
            }
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::CannotOpen =>
            {
                DatabaseError::ConnectionFailed(self.to_string())
            }
            rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("corrupt") => {
                DatabaseError::Corruption(self.to_string())
            }
            _ => DatabaseError::QueryFailed(self.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_non_empty() {
        let errors = [
            DatabaseError::ConnectionFailed("x".into()),
            DatabaseError::QueryFailed("x".into()),
            DatabaseError::Busy("x".into()),
            DatabaseError::Corruption("x".into()),
            DatabaseError::MigrationFailed("x".into()),
        ];
        for err in errors {
            assert!(!err.user_message().is_empty());
        }
    }

    #[test]
    fn test_busy_maps_to_transient() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        let db_err = err.into_database_error();
        assert!(matches!(db_err, DatabaseError::Busy(_)));
        assert!(db_err.is_transient());
    }

    #[test]
    fn test_other_sqlite_errors_are_query_failures() {
        let db_err = rusqlite::Error::QueryReturnedNoRows.into_database_error();
        assert!(matches!(db_err, DatabaseError::QueryFailed(_)));
        assert!(!db_err.is_transient());
    }
}
