//! Error types for temporal-days

use thiserror::Error;

/// Result type alias for timeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for timeline operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A date passed as a query or subscription argument could not be resolved
    #[error("Invalid date: {input}")]
    InvalidDate {
        /// Debug rendering of the offending raw input
        input: String,
    },

    /// Event kind string other than `bounds`, `date` or `item`
    #[error("Unknown event kind: {0}")]
    UnknownEventKind(String),

    /// Malformed or inconsistent options
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    pub(crate) fn invalid_date(input: impl std::fmt::Debug) -> Self {
        Error::InvalidDate {
            input: format!("{input:?}"),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Configuration(e.to_string())
    }
}
