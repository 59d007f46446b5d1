//! TMDB client for fetching movie and person metadata.
//!
//! This crate provides the live [`MetadataProvider`] implementation. It handles:
//! - Building TMDB v3 URLs and attaching the API key
//! - Blocking HTTP calls through a shared `ureq::Agent` with a global timeout
//! - Turning non-success statuses and bad bodies into `ProviderError`s
//!
//! There are no retries. A failed call is reported once and the search
//! treats the entity as having no data.

use std::io::Read;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info};

use catalog::{
    EntityKind, MetadataProvider, MovieCredits, MovieDetail, MovieId, MovieSummary,
    PersonCredits, PersonId, ProviderError,
};

/// Public TMDB v3 endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Per-request timeout covering connect, send, and body read
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur while talking to TMDB
#[derive(Error, Debug)]
pub enum TmdbClientError {
    #[error("TMDB returned status {0}")]
    Status(u16),

    #[error("Request to TMDB failed: {0}")]
    Transport(String),

    #[error("Failed to read TMDB response: {0}")]
    Read(#[from] std::io::Error),
}

impl TmdbClientError {
    /// Attach the entity being looked up
    fn for_entity(self, kind: EntityKind, id: u32) -> ProviderError {
        match self {
            TmdbClientError::Status(status) => ProviderError::Status { kind, id, status },
            other => ProviderError::Transport(other.to_string()),
        }
    }

    fn for_search(self) -> ProviderError {
        match self {
            TmdbClientError::Status(status) => ProviderError::SearchStatus { status },
            other => ProviderError::Transport(other.to_string()),
        }
    }
}

/// Blocking client for the TMDB REST API.
///
/// Cheap to share: the inner agent pools connections and is `Send + Sync`.
pub struct TmdbClient {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    /// Create a client against [`DEFAULT_BASE_URL`] with [`DEFAULT_TIMEOUT`]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_config(api_key, DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    /// Create a client against a custom endpoint (proxies, test servers)
    pub fn with_config(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!("Configuring TMDB client for {}", base_url);

        let agent = ureq::Agent::new_with_config(
            ureq::Agent::config_builder()
                .timeout_global(Some(timeout))
                .build(),
        );
        Self {
            agent,
            base_url,
            api_key: api_key.into(),
        }
    }

    /// Get the base URL this client sends requests to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get_body(&self, path: &str, query: &[(&str, &str)]) -> Result<String, TmdbClientError> {
        let url = self.url(path);
        debug!("GET {}", url);

        let mut request = self.agent.get(&url).query("api_key", &self.api_key);
        for (key, value) in query {
            request = request.query(*key, *value);
        }

        let response = request.call().map_err(|e| match e {
            ureq::Error::StatusCode(status) => TmdbClientError::Status(status),
            other => {
                error!("Request to {} failed: {}", url, other);
                TmdbClientError::Transport(other.to_string())
            }
        })?;

        let mut body = String::new();
        response
            .into_body()
            .into_reader()
            .read_to_string(&mut body)?;
        Ok(body)
    }

    fn get_entity<T: DeserializeOwned>(
        &self,
        kind: EntityKind,
        id: u32,
        path: &str,
    ) -> Result<T, ProviderError> {
        let body = self
            .get_body(path, &[])
            .map_err(|e| e.for_entity(kind, id))?;
        parse_json(&body)
    }
}

impl MetadataProvider for TmdbClient {
    fn name(&self) -> &str {
        "tmdb"
    }

    fn movie_detail(&self, id: MovieId) -> Result<MovieDetail, ProviderError> {
        self.get_entity(EntityKind::MovieDetail, id, &format!("movie/{}", id))
    }

    fn movie_credits(&self, id: MovieId) -> Result<MovieCredits, ProviderError> {
        self.get_entity(EntityKind::MovieCredits, id, &format!("movie/{}/credits", id))
    }

    fn person_credits(&self, id: PersonId) -> Result<PersonCredits, ProviderError> {
        self.get_entity(
            EntityKind::PersonCredits,
            id,
            &format!("person/{}/movie_credits", id),
        )
    }

    fn search_movies(&self, title: &str) -> Result<Vec<MovieSummary>, ProviderError> {
        let body = self
            .get_body("search/movie", &[("query", title)])
            .map_err(TmdbClientError::for_search)?;
        parse_search_results(&body)
    }
}

/// Page envelope of `search/movie`
#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    results: Vec<MovieSummary>,
}

/// Decode a JSON body, reporting shape mismatches as malformed payloads
pub fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(ProviderError::from)
}

/// Decode a `search/movie` response into its result list
pub fn parse_search_results(body: &str) -> Result<Vec<MovieSummary>, ProviderError> {
    let page: SearchPage = parse_json(body)?;
    Ok(page.results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_url_building_strips_slashes() {
        let client = TmdbClient::with_config("key", "http://localhost:8080/3/", DEFAULT_TIMEOUT);

        assert_eq!(client.base_url(), "http://localhost:8080/3");
        assert_eq!(client.url("/movie/603"), "http://localhost:8080/3/movie/603");
        assert_eq!(client.url("movie/603/credits"), "http://localhost:8080/3/movie/603/credits");
    }

    #[test]
    fn test_parse_movie_credits() {
        let body = r#"{
            "id": 603,
            "cast": [
                { "id": 6384, "name": "Keanu Reeves", "popularity": 28.5, "character": "Neo" }
            ],
            "crew": [
                { "id": 9339, "name": "Lilly Wachowski", "popularity": 3.1, "job": "Director", "department": "Directing" }
            ]
        }"#;

        let credits: MovieCredits = parse_json(body).unwrap();
        assert_eq!(credits.cast.len(), 1);
        assert_eq!(credits.cast[0].name, "Keanu Reeves");
        assert_eq!(credits.director().map(|p| p.id), Some(9339));
    }

    #[test]
    fn test_parse_person_credits_with_missing_dates() {
        let body = r#"{
            "cast": [
                { "id": 603, "title": "The Matrix", "release_date": "1999-03-30", "popularity": 80.0 },
                { "id": 1, "title": "Untitled", "release_date": "", "poster_path": null }
            ],
            "crew": []
        }"#;

        let credits: PersonCredits = parse_json(body).unwrap();
        assert_eq!(credits.cast.len(), 2);
        assert_eq!(credits.cast[0].year(), Some(1999));
        assert_eq!(credits.cast[1].year(), None);
        assert_eq!(credits.cast[1].popularity, 0.0);
    }

    #[test]
    fn test_parse_search_results() {
        let body = r#"{ "page": 1, "results": [ { "id": 603, "title": "The Matrix", "release_date": "1999-03-30" } ], "total_results": 1 }"#;
        let results = parse_search_results(body).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 603);

        let empty = parse_search_results(r#"{ "page": 1 }"#).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_malformed_payload() {
        let err = parse_json::<MovieDetail>(r#"{ "status_code": 7 }"#).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[test]
    fn test_status_error_keeps_entity() {
        let err = TmdbClientError::Status(404).for_entity(EntityKind::PersonCredits, 55);
        assert!(matches!(
            err,
            ProviderError::Status { kind: EntityKind::PersonCredits, id: 55, status: 404 }
        ));

        let err = TmdbClientError::Transport("timeout".into()).for_entity(EntityKind::MovieDetail, 1);
        assert!(matches!(err, ProviderError::Transport(_)));
    }

    #[test]
    fn test_search_status_is_kept() {
        let err = TmdbClientError::Status(401).for_search();
        assert!(matches!(err, ProviderError::SearchStatus { status: 401 }));
    }

    /// Answer one request with `status_line` and an empty body
    fn serve_once(status_line: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request: Vec<u8> = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!("{}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n", status_line);
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{}/3", addr)
    }

    #[test]
    fn test_rejected_key_surfaces_status() {
        let base_url = serve_once("HTTP/1.1 401 Unauthorized");
        let client = TmdbClient::with_config("bad-key", base_url, Duration::from_secs(5));
        let err = client.search_movies("matrix").unwrap_err();
        assert!(matches!(err, ProviderError::SearchStatus { status: 401 }));

        let base_url = serve_once("HTTP/1.1 404 Not Found");
        let client = TmdbClient::with_config("key", base_url, Duration::from_secs(5));
        let err = client.movie_credits(603).unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Status { kind: EntityKind::MovieCredits, id: 603, status: 404 }
        ));
    }

    #[test]
    fn test_unreachable_server_is_transport_error() {
        // Bind then drop, so the port is known to be closed
        let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let client = TmdbClient::with_config("key", format!("http://{}", addr), Duration::from_millis(500));
        let err = client.movie_detail(603).unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
    }
}
