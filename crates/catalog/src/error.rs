//! Catalog error types.

use thiserror::Error;

/// Errors that can occur while loading a feed.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The feed could not be parsed as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The feed file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The feed decoded to something other than a JSON array.
    #[error("feed is not a JSON array")]
    NotAnArray,

    /// The feed server answered with a non-success status.
    #[error("HTTP {0}")]
    Status(u16),
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
