//! Bidirectional path search over the implicit movie/person graph.
//!
//! This crate provides:
//! - GraphExpander for ranked, capped neighbor lists backed by the entity cache
//! - Two frontier implementations (unit-cost FIFO and min-cost heap)
//! - SearchEngine, which alternates the frontiers until they meet
//! - Path reconstruction and annotation with the connecting person per edge
//!
//! ## Architecture
//! A search proceeds in rounds:
//! 1. The forward frontier (from the source) expands one node
//! 2. The backward frontier (from the target) expands one node
//! 3. Every neighbor discovered lands in the processed set
//! 4. A neighbor already admitted by the other side is a meeting
//! 5. The first round with a meeting ends the search; the path is rebuilt
//!    from both predecessor maps and annotated
//!
//! ## Example Usage
//! ```ignore
//! use search::{SearchConfig, SearchEngine, Strategy, annotate};
//!
//! let engine = SearchEngine::new(cache.clone(), SearchConfig::default());
//! let outcome = engine.search(603, 155, Strategy::UnitCost);
//!
//! if let Some(path) = &outcome.path {
//!     let annotated = annotate(engine.cache(), path);
//! }
//! ```

pub mod config;
pub mod engine;
pub mod expansion;
pub mod frontier;
pub mod path;
pub mod processed;

#[cfg(test)]
mod testing;

// Re-export main types
pub use config::{DEFAULT_MOVIE_LIMIT, DEFAULT_PEOPLE_LIMIT, SearchConfig, Strategy, UnknownStrategy};
pub use engine::{Meeting, SearchEngine, SearchOutcome, Side};
pub use expansion::{GraphExpander, Neighbor, rank_movies, rank_people};
pub use frontier::{Cost, CostFrontier, Frontier, QueueFrontier};
pub use path::{AnnotatedPath, Connection, UNKNOWN_CONNECTION, annotate, connect, reconstruct};
pub use processed::ProcessedSet;
