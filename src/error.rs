//! Error types for the customer search engine.
//!
//! This module defines custom error types using `thiserror` for precise error handling.

use thiserror::Error;

/// Errors raised by the index store, the writer and the query path.
#[derive(Error, Debug)]
pub enum SearchError {
    /// The index location could not be opened or created
    #[error("Search index store unavailable: {0}")]
    StoreUnavailable(String),

    /// Another rebuild currently holds the index writer
    #[error("Index writer is busy with another rebuild")]
    WriterBusy,

    /// Fetching records, writing documents or committing failed
    #[error("Index rebuild failed: {0}")]
    RebuildFailed(String),

    /// The search text could not be parsed into an exact query
    #[error("Query parse failed: {0}")]
    QueryParseFailed(String),

    /// Invalid search parameters
    #[error("Invalid search parameters: {0}")]
    InvalidParameters(String),

    /// Unexpected failure inside the index while searching
    #[error("Index error: {0}")]
    Index(#[from] tantivy::TantivyError),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SearchError {
    /// Check if this error indicates a transient failure that could be retried
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            SearchError::WriterBusy | SearchError::StoreUnavailable(_)
        )
    }
}

/// Errors that can occur when reading customer records from a source.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The record source cannot be reached
    #[error("Record source unavailable: {0}")]
    Unavailable(String),

    /// Generic repository error
    #[error("Repository error: {0}")]
    Other(String),
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable has invalid value
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Other(String),
}

/// Convenience type alias for Results with SearchError
pub type SearchResult<T> = Result<T, SearchError>;

/// Convenience type alias for Results with RepositoryError
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Convenience type alias for Results with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<RepositoryError> for SearchError {
    fn from(err: RepositoryError) -> Self {
        SearchError::RebuildFailed(err.to_string())
    }
}
