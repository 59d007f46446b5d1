//! # Catalog Crate
//!
//! Domain types and data access for the movie/person graph.
//!
//! ## Main Components
//!
//! - **types**: Movies, people, credit sets (MovieDetail, PersonRef, ...)
//! - **provider**: The `MetadataProvider` trait every data source implements
//! - **cache**: `EntityCache`, the bounded LRU memo in front of a provider
//! - **index**: `Catalog`, an in-memory provider for offline runs and tests
//! - **parser**: Load a `Catalog` from a JSON fixture
//! - **error**: Error types for lookups and fixture loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{Catalog, EntityCache};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let catalog = Catalog::load_from_file(Path::new("data/sample_catalog.json"))?;
//! let cache = EntityCache::new(Arc::new(catalog));
//!
//! // First call goes to the provider, the second is served from memory
//! let credits = cache.movie_credits(100);
//! let again = cache.movie_credits(100);
//! ```

pub mod cache;
pub mod error;
pub mod index;
pub mod parser;
pub mod provider;
pub mod types;

// Re-export commonly used types for convenience
pub use cache::{CacheStats, DEFAULT_CACHE_CAPACITY, EntityCache};
pub use error::{CatalogError, ProviderError, Result};
pub use index::{Catalog, CreditRole};
pub use provider::MetadataProvider;
pub use types::{
    // Type aliases
    MovieId,
    PersonId,
    // Core types
    EntityKind,
    Genre,
    MovieCredits,
    MovieDetail,
    MovieNode,
    MovieSummary,
    PersonCredits,
    PersonRef,
};
