//! In-memory catalog.
//!
//! `Catalog` holds a closed set of movies and their credits and answers the
//! same lookups as the remote provider. Person credit histories are not
//! stored; they are derived from a reverse index built as credits are
//! inserted.
//!
//! Used for offline runs (`--fixture`), benchmarks, and every test that
//! needs a small, fully known graph.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use crate::error::ProviderError;
use crate::provider::MetadataProvider;
use crate::types::*;

/// Which credit list a person appears in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreditRole {
    Cast,
    Crew,
}

/// A closed, in-memory movie/person graph
#[derive(Debug, Default)]
pub struct Catalog {
    pub(crate) movies: HashMap<MovieId, MovieDetail>,
    /// Movies with no entry here behave like a provider failure on credits
    pub(crate) credits: HashMap<MovieId, MovieCredits>,
    /// Reverse index: every (movie, role) a person is credited on, in insertion order
    pub(crate) person_movies: HashMap<PersonId, Vec<(MovieId, CreditRole)>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a movie detail
    pub fn insert_movie(&mut self, movie: MovieDetail) {
        self.movies.insert(movie.id, movie);
    }

    /// Mark a movie as having a credit list, even an empty one
    pub fn insert_credits(&mut self, movie_id: MovieId, credits: MovieCredits) {
        for person in &credits.cast {
            self.index_person(person.id, movie_id, CreditRole::Cast);
        }
        for person in &credits.crew {
            self.index_person(person.id, movie_id, CreditRole::Crew);
        }
        self.credits.insert(movie_id, credits);
    }

    /// Credit one person on a movie and update the reverse index
    pub fn add_credit(&mut self, movie_id: MovieId, person: PersonRef, role: CreditRole) {
        self.index_person(person.id, movie_id, role);
        let credits = self.credits.entry(movie_id).or_default();
        match role {
            CreditRole::Cast => credits.cast.push(person),
            CreditRole::Crew => credits.crew.push(person),
        }
    }

    fn index_person(&mut self, person_id: PersonId, movie_id: MovieId, role: CreditRole) {
        self.person_movies
            .entry(person_id)
            .or_default()
            .push((movie_id, role));
    }

    pub fn get_movie(&self, id: MovieId) -> Option<&MovieDetail> {
        self.movies.get(&id)
    }

    /// All movie ids, sorted ascending
    pub fn movie_ids(&self) -> Vec<MovieId> {
        let mut ids: Vec<MovieId> = self.movies.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// (movies, movies with credits, distinct people)
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.movies.len(), self.credits.len(), self.person_movies.len())
    }

    fn summary(&self, movie_id: MovieId) -> MovieSummary {
        match self.movies.get(&movie_id) {
            Some(movie) => MovieSummary {
                id: movie.id,
                title: movie.title.clone(),
                release_date: movie.release_date.clone(),
                popularity: movie.popularity,
                poster_path: movie.poster_path.clone(),
            },
            // Credited but never described: still an edge in the graph
            None => MovieSummary {
                id: movie_id,
                title: String::new(),
                release_date: None,
                popularity: 0.0,
                poster_path: None,
            },
        }
    }
}

impl MetadataProvider for Catalog {
    fn name(&self) -> &str {
        "catalog"
    }

    fn movie_detail(&self, id: MovieId) -> Result<MovieDetail, ProviderError> {
        self.movies.get(&id).cloned().ok_or(ProviderError::NotFound {
            kind: EntityKind::MovieDetail,
            id,
        })
    }

    fn movie_credits(&self, id: MovieId) -> Result<MovieCredits, ProviderError> {
        self.credits.get(&id).cloned().ok_or(ProviderError::NotFound {
            kind: EntityKind::MovieCredits,
            id,
        })
    }

    fn person_credits(&self, id: PersonId) -> Result<PersonCredits, ProviderError> {
        let entries = self.person_movies.get(&id).ok_or(ProviderError::NotFound {
            kind: EntityKind::PersonCredits,
            id,
        })?;

        let mut history = PersonCredits::default();
        for &(movie_id, role) in entries {
            let summary = self.summary(movie_id);
            match role {
                CreditRole::Cast => history.cast.push(summary),
                CreditRole::Crew => history.crew.push(summary),
            }
        }
        Ok(history)
    }

    /// Case-insensitive substring match; exact titles first, then by popularity
    fn search_movies(&self, title: &str) -> Result<Vec<MovieSummary>, ProviderError> {
        let needle = title.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(vec![]);
        }

        // (rank, summary): rank 0 = exact match, 1 = substring match
        let mut matches: Vec<(u8, MovieSummary)> = self
            .movies
            .values()
            .filter_map(|movie| {
                let candidate = movie.title.to_lowercase();
                let rank = if candidate == needle {
                    0
                } else if candidate.contains(&needle) {
                    1
                } else {
                    return None;
                };
                Some((rank, self.summary(movie.id)))
            })
            .collect();

        matches.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| {
                    b.1.popularity
                        .partial_cmp(&a.1.popularity)
                        .unwrap_or(Ordering::Equal)
                })
                .then_with(|| a.1.id.cmp(&b.1.id))
        });
        debug!("Catalog search for '{}' matched {} movies", title, matches.len());

        Ok(matches.into_iter().map(|(_, summary)| summary).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: MovieId, title: &str, date: &str, popularity: f32) -> MovieDetail {
        MovieDetail {
            id,
            title: title.to_string(),
            release_date: Some(date.to_string()),
            poster_path: None,
            genres: vec![],
            popularity,
        }
    }

    fn person(id: PersonId, name: &str) -> PersonRef {
        PersonRef {
            id,
            name: name.to_string(),
            popularity: 1.0,
            job: None,
        }
    }

    fn create_test_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.insert_movie(movie(1, "Alien", "1979-05-25", 40.0));
        catalog.insert_movie(movie(2, "Aliens", "1986-07-18", 35.0));
        catalog.insert_movie(movie(3, "Blade Runner", "1982-06-25", 50.0));

        catalog.add_credit(1, person(10, "Sigourney Weaver"), CreditRole::Cast);
        catalog.add_credit(2, person(10, "Sigourney Weaver"), CreditRole::Cast);
        catalog.add_credit(1, person(20, "Ridley Scott"), CreditRole::Crew);
        catalog.add_credit(3, person(20, "Ridley Scott"), CreditRole::Crew);
        catalog
    }

    #[test]
    fn test_person_credits_are_derived_from_movie_credits() {
        let catalog = create_test_catalog();

        let weaver = catalog.person_credits(10).unwrap();
        let ids: Vec<MovieId> = weaver.cast.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(weaver.crew.is_empty());

        let scott = catalog.person_credits(20).unwrap();
        assert_eq!(scott.crew.len(), 2);
        assert_eq!(scott.crew[1].title, "Blade Runner");
    }

    #[test]
    fn test_missing_entities_are_errors() {
        let catalog = create_test_catalog();

        assert!(matches!(
            catalog.movie_detail(999),
            Err(ProviderError::NotFound { kind: EntityKind::MovieDetail, id: 999 })
        ));
        assert!(catalog.movie_credits(999).is_err());
        assert!(catalog.person_credits(999).is_err());
    }

    #[test]
    fn test_search_ranks_exact_match_first() {
        let catalog = create_test_catalog();

        let results = catalog.search_movies("alien").unwrap();
        let ids: Vec<MovieId> = results.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2]);

        assert!(catalog.search_movies("   ").unwrap().is_empty());
        assert!(catalog.search_movies("zzz").unwrap().is_empty());
    }

    #[test]
    fn test_counts() {
        let catalog = create_test_catalog();
        assert_eq!(catalog.counts(), (3, 3, 2));
        assert_eq!(catalog.movie_ids(), vec![1, 2, 3]);
    }
}
