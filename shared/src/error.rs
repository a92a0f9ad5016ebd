//! Error types for the event store gateway.

use std::time::Duration;

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while serving event requests.
#[derive(Error, Debug)]
pub enum Error {
    /// Database error not covered by a more specific variant
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    /// Database unreachable or pool exhausted
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    /// Statement exceeded its time bound
    #[error("Database statement timed out after {0:?}")]
    Timeout(Duration),

    /// Uniqueness constraint violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::NotFound(_) => 404,
            Error::Conflict(_) => 409,
            Error::Unavailable(_) => 503,
            Error::Timeout(_) => 504,
            _ => 500,
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return Error::Conflict(db.message().to_string());
            }
        }

        if matches!(
            err,
            sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
                | sqlx::Error::Io(_)
                | sqlx::Error::Tls(_)
        ) {
            return Error::Unavailable(err.to_string());
        }

        Error::Database(err)
    }
}
