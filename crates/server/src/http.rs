use std::net::SocketAddr;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use catalog::CacheStats;

use crate::error::ServiceError;
use crate::results::SearchId;
use crate::service::{
    ExploredPage, ExploredRequest, PathRequest, PathResponse, PathfinderService, TitleMatch,
};

/// Build the axum router with all pathfinder endpoints.
pub fn router(service: PathfinderService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/find_path", get(find_path))
        .route("/get_processed_movies", get(get_processed_movies))
        .route("/search_movie", get(search_movie))
        .layer(cors)
        .with_state(service)
}

/// Start the HTTP server on the given address.
pub async fn serve(service: PathfinderService, addr: SocketAddr) -> anyhow::Result<()> {
    let app = router(service);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

// --- Request / Response types ---

// Parameters stay raw strings so malformed values get our own 400 message.

#[derive(Deserialize)]
pub struct FindPathQuery {
    pub start_id: Option<String>,
    pub end_id: Option<String>,
    pub algorithm: Option<String>,
}

#[derive(Deserialize)]
pub struct ProcessedQuery {
    pub search_id: Option<String>,
    pub offset: Option<String>,
    pub limit: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchMovieQuery {
    pub movie_name: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub provider: String,
    pub cache: CacheStats,
}

#[derive(Serialize)]
pub struct SearchMovieResponse {
    pub results: Vec<TitleMatch>,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
    /// Set when the failed search can still be paged through
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_id: Option<SearchId>,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::InvalidInput(_) | ServiceError::NoSearchYet => StatusCode::BAD_REQUEST,
            ServiceError::MovieNotFound(_)
            | ServiceError::NoPathFound { .. }
            | ServiceError::NoResults
            | ServiceError::UnknownSearch(_) => StatusCode::NOT_FOUND,
            ServiceError::Internal(e) => {
                error!("Request failed: {:#}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let search_id = match &self {
            ServiceError::NoPathFound { search_id, .. } => Some(*search_id),
            _ => None,
        };

        let body = ErrorBody {
            error: self.to_string(),
            search_id,
        };
        (status, Json(body)).into_response()
    }
}

// --- Handlers ---

async fn health(State(service): State<PathfinderService>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        provider: service.cache().provider_name().to_string(),
        cache: service.cache_stats(),
    })
}

async fn find_path(
    State(service): State<PathfinderService>,
    Query(query): Query<FindPathQuery>,
) -> Result<Json<PathResponse>, ServiceError> {
    let request = PathRequest::parse(
        query.start_id.as_deref(),
        query.end_id.as_deref(),
        query.algorithm.as_deref(),
    )?;
    let response = service.find_path(request).await?;
    Ok(Json(response))
}

async fn get_processed_movies(
    State(service): State<PathfinderService>,
    Query(query): Query<ProcessedQuery>,
) -> Result<Json<ExploredPage>, ServiceError> {
    let request = ExploredRequest::parse(
        query.search_id.as_deref(),
        query.offset.as_deref(),
        query.limit.as_deref(),
    )?;
    let page = service.explored(request).await?;
    Ok(Json(page))
}

async fn search_movie(
    State(service): State<PathfinderService>,
    Query(query): Query<SearchMovieQuery>,
) -> Result<Json<SearchMovieResponse>, ServiceError> {
    let results = service
        .search_titles(query.movie_name.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(SearchMovieResponse { results }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use catalog::{Catalog, CreditRole, EntityCache, MovieDetail, PersonRef};
    use search::SearchConfig;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_service() -> PathfinderService {
        let mut catalog = Catalog::new();
        for (id, title) in [(100, "Movie A"), (200, "Movie B"), (300, "Movie C")] {
            catalog.insert_movie(MovieDetail {
                id,
                title: title.to_string(),
                release_date: Some("2001-01-01".to_string()),
                poster_path: None,
                genres: vec![],
                popularity: 1.0,
            });
        }
        let shared = PersonRef {
            id: 55,
            name: "Shared Crew".to_string(),
            popularity: 1.0,
            job: Some("Director".to_string()),
        };
        catalog.add_credit(100, shared.clone(), CreditRole::Crew);
        catalog.add_credit(200, shared, CreditRole::Crew);

        let cache = Arc::new(EntityCache::new(Arc::new(catalog)));
        PathfinderService::new(cache, SearchConfig::default())
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (status, body) = get(router(test_service()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["provider"], "catalog");
    }

    #[tokio::test]
    async fn test_find_path_ok() {
        let app = router(test_service());
        let (status, body) = get(app, "/find_path?start_id=100&end_id=200").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["path"]["movies"].as_array().unwrap().len(), 2);
        assert_eq!(body["path"]["connections"][0]["name"], "Shared Crew");
        assert!(body["search_id"].is_string());
    }

    #[tokio::test]
    async fn test_find_path_bad_input() {
        let service = test_service();

        let (status, body) = get(router(service.clone()), "/find_path?start_id=100").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Please provide both start_id and end_id");

        let (status, _) = get(router(service.clone()), "/find_path?start_id=x&end_id=200").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get(
            router(service),
            "/find_path?start_id=100&end_id=200&algorithm=astar",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_find_path_no_path_is_not_found() {
        let (status, body) = get(router(test_service()), "/find_path?start_id=100&end_id=300").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["search_id"].is_string());
    }

    #[tokio::test]
    async fn test_processed_movies_flow() {
        let service = test_service();

        let (status, _) = get(router(service.clone()), "/get_processed_movies").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get(router(service.clone()), "/find_path?start_id=100&end_id=200").await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = get(router(service), "/get_processed_movies?offset=0&limit=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["processed_movies"].as_array().unwrap().len(), 1);
        assert_eq!(body["total_count"], 2);
    }

    #[tokio::test]
    async fn test_search_movie() {
        let service = test_service();

        let (status, body) = get(router(service.clone()), "/search_movie?movie_name=movie%20a").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"][0]["id"], 100);
        assert_eq!(body["results"][0]["director"], "Shared Crew");

        let (status, body) = get(router(service), "/search_movie?movie_name=nothing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Movie not found");
    }
}
