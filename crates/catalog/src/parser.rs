//! Fixture loader for the in-memory catalog.
//!
//! Format (JSON):
//!
//! ```text
//! { "movies": [
//!     { "id": 100, "title": "Movie A", "release_date": "1999-01-01",
//!       "poster_path": null, "popularity": 12.5, "genres": [],
//!       "credits": { "cast": [{ "id": 55, "name": "...", "popularity": 3.0 }],
//!                    "crew": [{ "id": 56, "name": "...", "job": "Director" }] } }
//! ] }
//! ```
//!
//! A movie without a `credits` key behaves like a provider that cannot
//! return its credits.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{CatalogError, Result};
use crate::index::Catalog;
use crate::types::{MovieCredits, MovieDetail};

#[derive(Debug, Deserialize)]
struct FixtureFile {
    movies: Vec<FixtureMovie>,
}

#[derive(Debug, Deserialize)]
struct FixtureMovie {
    #[serde(flatten)]
    detail: MovieDetail,
    #[serde(default)]
    credits: Option<MovieCredits>,
}

impl Catalog {
    /// Load a catalog from a JSON fixture on disk
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CatalogError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let raw = fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&raw)?;

        let (movies, with_credits, people) = catalog.counts();
        info!(
            "Loaded fixture {}: {} movies ({} with credits), {} people",
            path.display(),
            movies,
            with_credits,
            people
        );
        Ok(catalog)
    }

    /// Parse a catalog from fixture JSON
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let fixture: FixtureFile = serde_json::from_str(raw)?;

        let mut seen = HashSet::new();
        let mut catalog = Catalog::new();
        for entry in fixture.movies {
            if !seen.insert(entry.detail.id) {
                return Err(CatalogError::ValidationError(format!(
                    "duplicate movie id {}",
                    entry.detail.id
                )));
            }
            let movie_id = entry.detail.id;
            catalog.insert_movie(entry.detail);
            if let Some(credits) = entry.credits {
                catalog.insert_credits(movie_id, credits);
            }
        }
        Ok(catalog)
    }
}
