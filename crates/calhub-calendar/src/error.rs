//! Calendar-specific error types.

use calhub_core::{DatabaseError, RusqliteErrorExt};
use thiserror::Error;

/// Accumulated request validation failures.
///
/// Displays as `Validation Failed: 1: first;2: second;`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Validation Failed: ")?;
        for (i, error) in self.errors.iter().enumerate() {
            write!(f, "{}: {};", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),

    #[error("Timed out: {0}")]
    Timeout(String),
}

impl From<rusqlite::Error> for CalendarError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err.into_database_error())
    }
}

impl CalendarError {
    pub fn not_found(calendar_id: &str) -> Self {
        Self::NotFound(format!("No calendar with id [{}]", calendar_id))
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// User-friendly error message for terminal output.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(errors) => errors.to_string(),
            Self::InvalidArgument(msg) => format!("Invalid request: {}", msg),
            Self::NotFound(msg) => msg.clone(),
            Self::Storage(e) => e.user_message().to_string(),
            Self::Timeout(_) => "The calendar store did not respond in time.".to_string(),
        }
    }

    /// HTTP-style status for the transport layer.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::InvalidArgument(_) => 400,
            Self::NotFound(_) => 404,
            Self::Storage(e) if e.is_transient() => 503,
            Self::Storage(_) => 500,
            Self::Timeout(_) => 503,
        }
    }

    /// Whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_transient(),
            Self::Timeout(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_display() {
        let mut errors = ValidationErrors::new();
        errors.add("first problem");
        errors.add("second problem");
        assert_eq!(
            errors.to_string(),
            "Validation Failed: 1: first problem;2: second problem;"
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = CalendarError::not_found("holidays");
        assert_eq!(err.to_string(), "No calendar with id [holidays]");
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_is_retryable() {
        assert!(CalendarError::Storage(DatabaseError::Busy("locked".into())).is_retryable());
        assert!(CalendarError::Timeout("slow".into()).is_retryable());
        assert!(!CalendarError::Storage(DatabaseError::QueryFailed("x".into())).is_retryable());
        assert!(!CalendarError::not_found("x").is_retryable());
        assert!(!CalendarError::Validation(ValidationErrors::new()).is_retryable());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(CalendarError::invalid_argument("bad").status_code(), 400);
        assert_eq!(CalendarError::Validation(ValidationErrors::new()).status_code(), 400);
        assert_eq!(
            CalendarError::Storage(DatabaseError::Busy("locked".into())).status_code(),
            503
        );
        assert_eq!(
            CalendarError::Storage(DatabaseError::Corruption("bad page".into())).status_code(),
            500
        );
    }
}
