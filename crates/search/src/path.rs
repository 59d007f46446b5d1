//! Path reconstruction and annotation.
//!
//! `reconstruct` stitches the two predecessor maps together at the meeting
//! node. `annotate` turns the id path into what callers display: one
//! [`MovieNode`] per movie and a labelled [`Connection`] per adjacent pair.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use catalog::{EntityCache, MovieId, MovieNode, PersonId};

/// Label used when no shared person can be determined for an edge
pub const UNKNOWN_CONNECTION: &str = "unknown";

/// The person linking two adjacent movies in a path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub from: MovieId,
    pub to: MovieId,
    /// `None` when the edge is unlabelled
    pub person_id: Option<PersonId>,
    pub name: String,
}

impl Connection {
    fn unknown(from: MovieId, to: MovieId) -> Self {
        Self {
            from,
            to,
            person_id: None,
            name: UNKNOWN_CONNECTION.to_string(),
        }
    }
}

/// A path ready for display
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedPath {
    pub movies: Vec<MovieNode>,
    pub connections: Vec<Connection>,
}

/// Rebuild the source-to-target id path through `meeting`.
///
/// The forward half always ends with `source`, even when a predecessor link
/// is missing; the backward half is truncated at a missing link. Both walks
/// stop after as many steps as their map has entries.
pub fn reconstruct(
    meeting: MovieId,
    forward: &HashMap<MovieId, MovieId>,
    backward: &HashMap<MovieId, MovieId>,
    source: MovieId,
    target: MovieId,
) -> Vec<MovieId> {
    let mut path = Vec::new();

    let mut current = meeting;
    let mut steps = 0;
    while current != source && steps <= forward.len() {
        path.push(current);
        match forward.get(&current) {
            Some(&previous) => current = previous,
            None => break,
        }
        steps += 1;
    }
    path.push(source);
    path.reverse();

    let mut current = meeting;
    let mut steps = 0;
    while current != target && steps < backward.len() {
        match backward.get(&current) {
            Some(&next) => {
                path.push(next);
                current = next;
            }
            None => break,
        }
        steps += 1;
    }

    path
}

/// First person credited on both movies, in `from`'s cast-then-crew order
pub fn connect(cache: &EntityCache, from: MovieId, to: MovieId) -> Connection {
    let (Some(from_credits), Some(to_credits)) =
        (cache.movie_credits(from), cache.movie_credits(to))
    else {
        debug!("Credits unavailable for edge {} -> {}", from, to);
        return Connection::unknown(from, to);
    };

    let shared = to_credits.person_ids();
    match from_credits.people().find(|p| shared.contains(&p.id)) {
        Some(person) => Connection {
            from,
            to,
            person_id: Some(person.id),
            name: person.name.clone(),
        },
        None => Connection::unknown(from, to),
    }
}

/// Describe every movie in `path` and label every adjacent pair.
///
/// Movies whose detail cannot be fetched are left out of `movies`; the
/// connections still cover every pair of the id path.
pub fn annotate(cache: &EntityCache, path: &[MovieId]) -> AnnotatedPath {
    let movies = path
        .iter()
        .filter_map(|&id| cache.movie_detail(id).map(|detail| detail.to_node()))
        .collect();

    let connections = path
        .windows(2)
        .map(|pair| connect(cache, pair[0], pair[1]))
        .collect();

    AnnotatedPath {
        movies,
        connections,
    }
}
