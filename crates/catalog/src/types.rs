//! Core domain types for the movie/person graph.
//!
//! The graph is bipartite: movies link to the people credited on them, and
//! people link back to every movie in their credit history. None of it is
//! stored up front; every type here is a payload fetched on demand from a
//! metadata provider.
//!
//! The field names follow the TMDB v3 JSON payloads so the same structs can be
//! deserialized straight from the wire and from offline fixtures.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Type Aliases
// =============================================================================

/// Provider-assigned movie identifier (stable across requests)
pub type MovieId = u32;

/// Provider-assigned person identifier
pub type PersonId = u32;

/// Crew job used to pick a "best guess" director for title search results
pub const DIRECTOR_JOB: &str = "Director";

// =============================================================================
// Movie-related Types
// =============================================================================

/// Genre tag attached to a movie detail
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

/// Full movie detail as returned by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieDetail {
    pub id: MovieId,
    pub title: String,
    /// ISO date string ("1999-03-31"). Providers send `""` or `null` when unknown.
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub popularity: f32,
}

impl MovieDetail {
    /// Release year parsed from the release date, if any
    pub fn year(&self) -> Option<u16> {
        release_year(self.release_date.as_deref())
    }

    /// Project the detail down to the node shape returned to callers
    pub fn to_node(&self) -> MovieNode {
        MovieNode {
            id: self.id,
            title: self.title.clone(),
            year: self.year(),
            poster_path: self.poster_path.clone(),
        }
    }
}

/// A movie as it appears in a path or in the explored set.
///
/// Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieNode {
    pub id: MovieId,
    pub title: String,
    pub year: Option<u16>,
    pub poster_path: Option<String>,
}

/// Short movie record found in a person's credit history or a title search.
///
/// Carries just enough to rank candidates: release date and popularity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: MovieId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub popularity: f32,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl MovieSummary {
    pub fn year(&self) -> Option<u16> {
        release_year(self.release_date.as_deref())
    }

    /// Release date used as a sort key; a missing date sorts lowest.
    pub fn release_key(&self) -> &str {
        self.release_date.as_deref().unwrap_or("")
    }
}

// =============================================================================
// Person-related Types
// =============================================================================

/// A credited person on a movie (cast or crew)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonRef {
    pub id: PersonId,
    pub name: String,
    /// Provider popularity; only used for ranking, never persisted
    #[serde(default)]
    pub popularity: f32,
    /// Crew job ("Director", "Writer", ...). Absent for cast entries.
    #[serde(default)]
    pub job: Option<String>,
}

// =============================================================================
// Credit Sets
// =============================================================================

/// Everyone credited on one movie
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovieCredits {
    #[serde(default)]
    pub cast: Vec<PersonRef>,
    #[serde(default)]
    pub crew: Vec<PersonRef>,
}

impl MovieCredits {
    /// Cast followed by crew, in provider order.
    ///
    /// The same person may appear twice (e.g. actor and director).
    pub fn people(&self) -> impl Iterator<Item = &PersonRef> {
        self.cast.iter().chain(self.crew.iter())
    }

    pub fn person_ids(&self) -> HashSet<PersonId> {
        self.people().map(|p| p.id).collect()
    }

    /// First crew member whose job is "Director"
    pub fn director(&self) -> Option<&PersonRef> {
        self.crew
            .iter()
            .find(|p| p.job.as_deref() == Some(DIRECTOR_JOB))
    }
}

/// Everything one person is credited on
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonCredits {
    #[serde(default)]
    pub cast: Vec<MovieSummary>,
    #[serde(default)]
    pub crew: Vec<MovieSummary>,
}

impl PersonCredits {
    /// Movies as cast followed by movies as crew
    pub fn movies(&self) -> impl Iterator<Item = &MovieSummary> {
        self.cast.iter().chain(self.crew.iter())
    }
}

// =============================================================================
// Cache Keys
// =============================================================================

/// The three entity kinds the cache memoizes, each with its own capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    MovieDetail,
    MovieCredits,
    PersonCredits,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::MovieDetail => "movie detail",
            EntityKind::MovieCredits => "movie credits",
            EntityKind::PersonCredits => "person credits",
        };
        f.write_str(name)
    }
}

/// Parse the leading four-digit year of an ISO date string.
///
/// Returns `None` for missing, empty, or malformed dates.
pub fn release_year(date: Option<&str>) -> Option<u16> {
    let date = date?;
    date.get(..4)?.parse().ok()
}
