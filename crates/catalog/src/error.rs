//! Error types for the catalog crate.
//!
//! Two families live here:
//! - [`ProviderError`]: a metadata lookup failed. The search core never treats
//!   this as fatal; it only means "no data" for that entity.
//! - [`CatalogError`]: loading an offline fixture failed. This one is fatal to
//!   whoever asked for the fixture.

use thiserror::Error;

use crate::types::EntityKind;

/// Why a single metadata lookup produced no payload
///
/// Rust concept: `#[derive(Error)]` from thiserror implements `Display` from
/// the `#[error(...)]` attributes, so callers can log these directly.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The provider has no record of this entity
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: u32 },

    /// The provider answered with a non-success status
    #[error("provider returned status {status} for {kind} {id}")]
    Status { kind: EntityKind, id: u32, status: u16 },

    /// Title search answered with a non-success status
    #[error("provider returned status {status} for title search")]
    SearchStatus { status: u16 },

    /// Network, TLS, or timeout failure before a status was received
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body did not match the expected shape
    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Malformed(err.to_string())
    }
}

/// Errors that can occur while loading an offline catalog fixture
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to open fixture: {path}")]
    FileNotFound { path: String },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid fixture JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Fixture parsed but is internally inconsistent
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience alias for fixture loading results
pub type Result<T> = std::result::Result<T, CatalogError>;
