//! Graph Expansion
//!
//! The movie graph is never materialized. A movie's neighbors are computed on
//! demand from two cached lookups:
//!
//! ## Algorithm
//! 1. Fetch the movie's credits; merge cast then crew
//! 2. Rank people by popularity (descending), keep the top `people_limit`
//! 3. For each kept person, fetch their credit history; merge cast then crew
//! 4. Rank those movies by (release date, popularity) descending, keep the
//!    top `movie_limit`
//! 5. Concatenate: person-rank-major, movie-rank-minor
//!
//! Both sorts are stable, so ties keep provider order. Missing credits for
//! the movie or for any person contribute nothing instead of failing.

use std::cmp::Ordering;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, instrument};

use catalog::{EntityCache, MovieCredits, MovieId, MovieSummary, PersonCredits, PersonId, PersonRef};

use crate::config::SearchConfig;

/// One outgoing edge: an adjacent movie and the person linking to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    pub movie_id: MovieId,
    pub via: PersonId,
}

/// Computes ranked, capped neighbor lists through the entity cache
#[derive(Clone)]
pub struct GraphExpander {
    /// Shared with every other search in the process
    cache: Arc<EntityCache>,
    people_limit: usize,
    movie_limit: usize,
}

impl GraphExpander {
    pub fn new(cache: Arc<EntityCache>, config: &SearchConfig) -> Self {
        Self {
            cache,
            people_limit: config.people_limit,
            movie_limit: config.movie_limit,
        }
    }

    pub fn cache(&self) -> &Arc<EntityCache> {
        &self.cache
    }

    /// Ranked neighbors of `movie_id`, at most `people_limit * movie_limit` long.
    ///
    /// Person histories are fetched in parallel; the result is reassembled in
    /// rank order so the output does not depend on fetch timing.
    #[instrument(skip(self))]
    pub fn neighbors(&self, movie_id: MovieId) -> Vec<Neighbor> {
        let Some(credits) = self.cache.movie_credits(movie_id) else {
            debug!("No credits for movie {}, no neighbors", movie_id);
            return Vec::new();
        };

        let people = rank_people(&credits, self.people_limit);

        let branches: Vec<Vec<Neighbor>> = people
            .par_iter()
            .map(|person| self.person_branch(person))
            .collect();

        let neighbors: Vec<Neighbor> = branches.into_iter().flatten().collect();
        debug!(
            "Movie {} expanded through {} people into {} neighbors",
            movie_id,
            people.len(),
            neighbors.len()
        );
        neighbors
    }

    fn person_branch(&self, person: &PersonRef) -> Vec<Neighbor> {
        let Some(history) = self.cache.person_credits(person.id) else {
            return Vec::new();
        };
        debug!("Exploring connections through: {} ({})", person.name, person.id);

        rank_movies(&history, self.movie_limit)
            .into_iter()
            .map(|movie| Neighbor {
                movie_id: movie.id,
                via: person.id,
            })
            .collect()
    }
}

/// Cast + crew, most popular first, truncated to `limit`
pub fn rank_people(credits: &MovieCredits, limit: usize) -> Vec<&PersonRef> {
    let mut people: Vec<&PersonRef> = credits.people().collect();
    // Rust concept: `sort_by` is stable, equal keys keep their input order
    people.sort_by(|a, b| {
        b.popularity
            .partial_cmp(&a.popularity)
            .unwrap_or(Ordering::Equal)
    });
    people.truncate(limit);
    people
}

/// Cast + crew movies, newest first, then most popular, truncated to `limit`
pub fn rank_movies(history: &PersonCredits, limit: usize) -> Vec<&MovieSummary> {
    let mut movies: Vec<&MovieSummary> = history.movies().collect();
    movies.sort_by(|a, b| {
        b.release_key().cmp(a.release_key()).then_with(|| {
            b.popularity
                .partial_cmp(&a.popularity)
                .unwrap_or(Ordering::Equal)
        })
    });
    movies.truncate(limit);
    movies
}
