//! Error types for the echomap recommendation engine.

use thiserror::Error;

/// Result type alias using echomap's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for echomap operations.
///
/// Only [`Error::StoreUnavailable`] and [`Error::InvalidInput`] ever escape a
/// recommendation strategy. [`Error::EmbeddingUnavailable`] is raised by
/// embedding backends and absorbed by the engine, which then ranks without
/// the vector-similarity key.
#[derive(Error, Debug)]
pub enum Error {
    /// Record store query failed (wraps sqlx::Error)
    #[error("Record store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),

    /// Record store failed for a reason that is not a sqlx error
    #[error("Record store unavailable: {0}")]
    StoreFailure(String),

    /// Embedding provider timed out, errored, or returned malformed data
    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// True for errors that mean the record store could not answer.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Error::StoreUnavailable(_) | Error::StoreFailure(_))
    }
}
