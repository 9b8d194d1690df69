//! Error types for srs-core.

use thiserror::Error;

/// Result type alias using SrsError.
pub type Result<T> = std::result::Result<T, SrsError>;

/// Errors raised by scheduling and collection operations.
#[derive(Debug, Error, PartialEq)]
pub enum SrsError {
    #[error("item not found: {0}")]
    NotFound(u64),

    #[error("similarity score must be a finite number in [0, 1], got {0}")]
    InvalidSimilarity(f64),

    #[error("item content must not be empty")]
    EmptyContent,

    #[error("an item with content {0:?} already exists")]
    DuplicateContent(String),

    #[error("scheduled date precedes the item's original start")]
    InvalidDate,

    #[error("next review would fall outside the representable date range ({0} days out)")]
    DateOutOfRange(i64),

    #[error("no item ids left to allocate")]
    IdsExhausted,
}

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
}

/// Errors a similarity oracle may report instead of a score.
#[derive(Debug, Error, PartialEq)]
pub enum OracleError {
    #[error("recall answer is empty")]
    EmptyAnswer,

    #[error("oracle unavailable: {0}")]
    Unavailable(String),
}
