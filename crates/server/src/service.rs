//! # Pathfinder Service
//!
//! Coordinates one path query end to end:
//! 1. Validate the raw inputs (ids, strategy)
//! 2. Resolve both endpoint movies
//! 3. Run the bidirectional search on a blocking thread
//! 4. Store the explored set under a fresh search id
//! 5. Annotate the path with the connecting person per edge
//!
//! It also serves paginated reads of a stored explored set and free-text
//! title search.
//!
//! ## Learning Goals
//!
//! This component teaches you:
//! - Using spawn_blocking for blocking I/O inside an async service
//! - Turning a task panic into a typed error with anyhow context
//! - Sharing one cache and one result store across concurrent requests

use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use tracing::{info, warn};

use catalog::{CacheStats, EntityCache, MovieId, MovieNode};
use search::{AnnotatedPath, SearchConfig, SearchEngine, Strategy, annotate};

use crate::error::{Result, ServiceError};
use crate::results::{ResultStore, SearchId, SearchRecord};

/// Page size used when the caller does not pass a limit
pub const DEFAULT_PAGE_LIMIT: usize = 250;

/// Title search returns at most this many matches
pub const TITLE_SEARCH_LIMIT: usize = 10;

/// Director label when none can be found
pub const NO_DIRECTOR: &str = "N/A";

/// A validated path query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathRequest {
    pub source: MovieId,
    pub target: MovieId,
    pub strategy: Strategy,
}

impl PathRequest {
    /// Validate raw query parameters.
    ///
    /// Both ids are required and must be integers; the strategy defaults to
    /// `bfs` and is matched case-insensitively.
    pub fn parse(start: Option<&str>, end: Option<&str>, algorithm: Option<&str>) -> Result<Self> {
        let (Some(start), Some(end)) = (non_blank(start), non_blank(end)) else {
            return Err(ServiceError::InvalidInput(
                "Please provide both start_id and end_id".to_string(),
            ));
        };
        let (Ok(source), Ok(target)) = (start.parse::<MovieId>(), end.parse::<MovieId>()) else {
            return Err(ServiceError::InvalidInput(
                "Invalid movie IDs provided".to_string(),
            ));
        };
        let strategy = match non_blank(algorithm) {
            Some(name) => name.parse::<Strategy>()?,
            None => Strategy::default(),
        };

        Ok(Self {
            source,
            target,
            strategy,
        })
    }
}

/// A found path, ready for the caller
#[derive(Debug, Clone, Serialize)]
pub struct PathResponse {
    pub search_id: SearchId,
    pub path: AnnotatedPath,
    /// Search wall time in seconds
    pub execution_time: f64,
    /// Size of the explored set
    pub total_movies: usize,
}

/// Which stored explored set to read, and which slice of it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExploredRequest {
    /// `None` reads the most recent search
    pub search_id: Option<SearchId>,
    pub offset: usize,
    pub limit: usize,
}

impl ExploredRequest {
    pub fn parse(search_id: Option<&str>, offset: Option<&str>, limit: Option<&str>) -> Result<Self> {
        let search_id = non_blank(search_id)
            .map(|raw| {
                raw.parse::<SearchId>()
                    .map_err(|_| ServiceError::InvalidInput(format!("Invalid search id '{}'", raw)))
            })
            .transpose()?;

        Ok(Self {
            search_id,
            offset: parse_count("offset", offset, 0)?,
            limit: parse_count("limit", limit, DEFAULT_PAGE_LIMIT)?,
        })
    }
}

impl Default for ExploredRequest {
    fn default() -> Self {
        Self {
            search_id: None,
            offset: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

/// One page of an explored set
#[derive(Debug, Clone, Serialize)]
pub struct ExploredPage {
    pub search_id: SearchId,
    /// Movies whose detail could not be fetched are left out
    pub processed_movies: Vec<MovieNode>,
    pub total_count: usize,
}

/// One title search hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleMatch {
    pub id: MovieId,
    pub title: String,
    pub year: Option<u16>,
    pub poster_path: Option<String>,
    pub director: String,
}

/// Main service that answers path, explored-set and title queries
#[derive(Clone)]
pub struct PathfinderService {
    engine: SearchEngine,
    results: Arc<ResultStore>,
}

impl PathfinderService {
    pub fn new(cache: Arc<EntityCache>, config: SearchConfig) -> Self {
        Self::with_results(cache, config, Arc::new(ResultStore::new()))
    }

    pub fn with_results(cache: Arc<EntityCache>, config: SearchConfig, results: Arc<ResultStore>) -> Self {
        Self {
            engine: SearchEngine::new(cache, config),
            results,
        }
    }

    pub fn cache(&self) -> &Arc<EntityCache> {
        self.engine.cache()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache().stats()
    }

    pub fn results(&self) -> &Arc<ResultStore> {
        &self.results
    }

    /// Find and annotate a path between two movies.
    ///
    /// The explored set is stored even when no path exists, so it can be
    /// paged through afterwards with the id carried by `NoPathFound`.
    pub async fn find_path(&self, request: PathRequest) -> Result<PathResponse> {
        info!(
            "Received request to find path from {} to {} using {}",
            request.source, request.target, request.strategy
        );

        let engine = self.engine.clone();
        let results = Arc::clone(&self.results);

        tokio::task::spawn_blocking(move || -> Result<PathResponse> {
            let cache = engine.cache();
            for id in [request.source, request.target] {
                if cache.movie_detail(id).is_none() {
                    warn!("Endpoint movie {} not found", id);
                    return Err(ServiceError::MovieNotFound(id));
                }
            }

            let outcome = engine.search(request.source, request.target, request.strategy);
            let record = results.insert(SearchRecord::from_outcome(outcome));

            let Some(path) = &record.path else {
                info!("No path found between the movies");
                return Err(ServiceError::NoPathFound {
                    search_id: record.id,
                    explored: record.processed.len(),
                });
            };

            let annotated = annotate(cache, path);
            info!(
                "Path found and formatted: {} movies, {} connections",
                annotated.movies.len(),
                annotated.connections.len()
            );

            Ok(PathResponse {
                search_id: record.id,
                path: annotated,
                execution_time: record.elapsed.as_secs_f64(),
                total_movies: record.processed.len(),
            })
        })
        .await
        .context("Search task panicked")?
    }

    /// Read one page of a stored explored set
    pub async fn explored(&self, request: ExploredRequest) -> Result<ExploredPage> {
        let record = match request.search_id {
            Some(id) => self.results.get(&id).ok_or(ServiceError::UnknownSearch(id))?,
            None => self.results.latest().ok_or(ServiceError::NoSearchYet)?,
        };

        let engine = self.engine.clone();
        tokio::task::spawn_blocking(move || {
            let cache = engine.cache();
            let total_count = record.processed.len();

            let processed_movies: Vec<MovieNode> = record
                .processed
                .iter()
                .skip(request.offset)
                .take(request.limit)
                .filter_map(|&id| cache.movie_detail(id).map(|detail| detail.to_node()))
                .collect();

            info!(
                "Returning {} processed movies. Offset: {}, Limit: {}, Total: {}",
                processed_movies.len(),
                request.offset,
                request.limit,
                total_count
            );

            ExploredPage {
                search_id: record.id,
                processed_movies,
                total_count,
            }
        })
        .await
        .context("Explored page task panicked")
        .map_err(ServiceError::from)
    }

    /// Free-text title search with a best-guess director per hit
    pub async fn search_titles(&self, query: &str) -> Result<Vec<TitleMatch>> {
        let Some(query) = non_blank(Some(query)).map(str::to_string) else {
            return Err(ServiceError::InvalidInput(
                "Please provide a movie name".to_string(),
            ));
        };
        info!("Searching for movie: '{}'", query);

        let engine = self.engine.clone();
        let matches = tokio::task::spawn_blocking(move || {
            let cache = engine.cache();
            let hits = match cache.search_movies(&query) {
                Ok(hits) => hits,
                Err(e) => {
                    warn!("Title search for '{}' failed: {}", query, e);
                    Vec::new()
                }
            };

            hits.into_iter()
                .take(TITLE_SEARCH_LIMIT)
                .map(|hit| {
                    let director = cache
                        .movie_credits(hit.id)
                        .and_then(|credits| credits.director().map(|p| p.name.clone()))
                        .unwrap_or_else(|| NO_DIRECTOR.to_string());
                    TitleMatch {
                        id: hit.id,
                        year: hit.year(),
                        title: hit.title,
                        poster_path: hit.poster_path,
                        director,
                    }
                })
                .collect::<Vec<_>>()
        })
        .await
        .context("Title search task panicked")?;

        if matches.is_empty() {
            return Err(ServiceError::NoResults);
        }
        info!("Found {} movies", matches.len());
        Ok(matches)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_count(name: &str, raw: Option<&str>, default: usize) -> Result<usize> {
    match non_blank(raw) {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| ServiceError::InvalidInput(format!("Invalid {} '{}'", name, raw))),
        None => Ok(default),
    }
}
