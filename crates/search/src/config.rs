//! Search configuration and strategy selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fan-out cap #1: people kept per movie expansion
pub const DEFAULT_PEOPLE_LIMIT: usize = 50;

/// Fan-out cap #2: movies kept per person
pub const DEFAULT_MOVIE_LIMIT: usize = 50;

/// Traversal strategy driving both frontiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Strategy {
    /// Unit-cost, FIFO expansion (breadth-first). Stops at the first meeting.
    #[default]
    #[serde(rename = "bfs")]
    UnitCost,
    /// Best-first by accumulated cost (uniform-cost / Dijkstra). Keeps the
    /// cheapest meeting seen in a round.
    #[serde(rename = "dijkstra")]
    Weighted,
}

impl Strategy {
    /// Selector name used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::UnitCost => "bfs",
            Strategy::Weighted => "dijkstra",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The selector did not name a known strategy
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid algorithm '{0}': expected 'bfs' or 'dijkstra'")]
pub struct UnknownStrategy(pub String);

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bfs" => Ok(Strategy::UnitCost),
            "dijkstra" => Ok(Strategy::Weighted),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}

/// Tunables for graph expansion and the search loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub people_limit: usize,
    pub movie_limit: usize,
    /// Expand a side's whole cost layer before checking for a meeting.
    ///
    /// Off by default: one node per side per round, stopping at the first
    /// round that records a meeting. On: the returned path is a shortest
    /// one within the fan-out caps, at the price of more fetches.
    pub layered: bool,
}

impl SearchConfig {
    /// Configure people kept per movie (default: 50)
    pub fn with_people_limit(mut self, limit: usize) -> Self {
        self.people_limit = limit;
        self
    }

    /// Configure movies kept per person (default: 50)
    pub fn with_movie_limit(mut self, limit: usize) -> Self {
        self.movie_limit = limit;
        self
    }

    pub fn with_layered(mut self, layered: bool) -> Self {
        self.layered = layered;
        self
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            people_limit: DEFAULT_PEOPLE_LIMIT,
            movie_limit: DEFAULT_MOVIE_LIMIT,
            layered: false,
        }
    }
}
