//! Error types for the pathfinder service.

use catalog::MovieId;
use search::UnknownStrategy;
use thiserror::Error;

use crate::results::SearchId;

/// Everything a caller of the service can be told went wrong.
///
/// Provider failures never show up here directly: the search absorbs them
/// and they surface, at most, as `MovieNotFound` or `NoPathFound`.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Movie {0} not found")]
    MovieNotFound(MovieId),

    #[error("No path found between the movies ({explored} movies explored)")]
    NoPathFound { search_id: SearchId, explored: usize },

    #[error("Movie not found")]
    NoResults,

    #[error("No processed movies found. Please find a path first.")]
    NoSearchYet,

    #[error("Search {0} is unknown or has expired")]
    UnknownSearch(SearchId),

    #[error("Internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl From<UnknownStrategy> for ServiceError {
    fn from(err: UnknownStrategy) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}

/// Convenience alias for service results
pub type Result<T> = std::result::Result<T, ServiceError>;
