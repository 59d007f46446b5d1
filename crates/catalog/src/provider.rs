//! The metadata provider seam.
//!
//! Everything the search knows about movies and people comes through this
//! trait. The live implementation talks to TMDB over HTTP (`tmdb-client`);
//! [`crate::Catalog`] serves the same data from memory for offline runs and tests.

use crate::error::ProviderError;
use crate::types::{MovieCredits, MovieDetail, MovieId, MovieSummary, PersonCredits, PersonId};

/// Source of movie and person metadata, queried by id or free-text title.
///
/// ## Design Note
/// - `Send + Sync` so one provider can sit behind an `Arc` shared by every
///   in-flight search
/// - Calls are blocking; async callers run searches on a blocking thread
/// - Any failure is reported as `Err`. Callers decide whether that is fatal
pub trait MetadataProvider: Send + Sync {
    /// Returns the name of this provider (for logging/debugging)
    fn name(&self) -> &str;

    fn movie_detail(&self, id: MovieId) -> Result<MovieDetail, ProviderError>;

    fn movie_credits(&self, id: MovieId) -> Result<MovieCredits, ProviderError>;

    fn person_credits(&self, id: PersonId) -> Result<PersonCredits, ProviderError>;

    /// Free-text title search, in the provider's own relevance order
    fn search_movies(&self, title: &str) -> Result<Vec<MovieSummary>, ProviderError>;
}
