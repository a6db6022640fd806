use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlAccessError {
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    PrepareFailed(String),

    #[error("Unsupported parameter type: {kind}")]
    UnsupportedParameterType { kind: String },

    #[error("Parameter count mismatch: statement expects {expected}, got {actual}")]
    ParameterCountMismatch { expected: usize, actual: usize },

    #[error("SQL execution error: {0}")]
    ExecutionFailed(String),

    #[error("Statement exceeded its deadline of {0:?}")]
    Timeout(Duration),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Other database error: {0}")]
    Other(String),
}

impl SqlAccessError {
    pub(crate) fn unsupported(kind: impl Into<String>) -> Self {
        SqlAccessError::UnsupportedParameterType { kind: kind.into() }
    }

    /// Whether the error stems from the caller's parameters rather than the database.
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            SqlAccessError::UnsupportedParameterType { .. }
                | SqlAccessError::ParameterCountMismatch { .. }
        )
    }
}
