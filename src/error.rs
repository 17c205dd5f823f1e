//! Error taxonomy for history queries.

use serde::Serialize;
use thiserror::Error;

/// Failures surfaced by [`crate::analysis::HistoryQueryService`] and the date aggregator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// A required parameter is missing or empty
    #[error("{0} parameter required")]
    Validation(String),

    /// The repository or folder path does not exist
    #[error("not found ({0})")]
    NotFound(String),

    /// The path exists but has no version-control metadata
    #[error("not a git project root ({0})")]
    NotARepository(String),

    /// The log collaborator rejected the commit range or scope
    #[error("range query failed: {0}")]
    RangeQuery(String),

    /// A log entry could not be parsed as a calendar date
    #[error("malformed commit date: {0:?}")]
    MalformedDate(String),
}

/// Serializable tag for a [`HistoryError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    ValidationError,
    NotFoundError,
    NotARepositoryError,
    RangeQueryError,
    MalformedDateError,
}

impl HistoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HistoryError::Validation(_) => ErrorKind::ValidationError,
            HistoryError::NotFound(_) => ErrorKind::NotFoundError,
            HistoryError::NotARepository(_) => ErrorKind::NotARepositoryError,
            HistoryError::RangeQuery(_) => ErrorKind::RangeQueryError,
            HistoryError::MalformedDate(_) => ErrorKind::MalformedDateError,
        }
    }
}
