//! Error types for search operations

use crate::error::AppError;
use crate::search::Dialect;

/// Result type for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Errors that can occur while building or running an issue search
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The active database speaks a dialect no query variant exists for
    #[error("Unsupported database type: {0}")]
    UnsupportedDialect(Dialect),

    /// The store failed to execute the statement
    #[error("Search execution failed: {0}")]
    StoreFailed(String),

    /// The permission model could not produce an access snapshot
    #[error("Access lookup failed: {0}")]
    AccessLookupFailed(String),
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::UnsupportedDialect(_) => AppError::Configuration(err.to_string()),
            SearchError::StoreFailed(msg) => AppError::Database(msg),
            SearchError::AccessLookupFailed(msg) => AppError::Internal(msg),
        }
    }
}
