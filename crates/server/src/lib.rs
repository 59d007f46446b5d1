//! Server crate for the ReelLink pathfinder.
//!
//! This crate contains the service that coordinates one path query end to
//! end, the per-search result store, and the HTTP surface in front of both.

pub mod error;
pub mod http;
pub mod results;
pub mod service;

pub use error::ServiceError;
pub use http::{router, serve};
pub use results::{DEFAULT_RESULT_CAPACITY, ResultStore, SearchId, SearchRecord};
pub use service::{
    DEFAULT_PAGE_LIMIT, ExploredPage, ExploredRequest, PathRequest, PathResponse,
    PathfinderService, TitleMatch,
};
