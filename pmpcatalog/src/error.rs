//! Error types for catalog operations

use crate::model::Source;

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, SourceError>;

/// Errors that can occur while fetching or resolving catalog items
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend returned an error status or unusable payload
    #[error("API error: {0}")]
    Api(String),

    /// The local directory exists but contains no playable files
    ///
    /// Distinct from a transient error: there is simply nothing to list.
    #[error("No local files found")]
    NoFiles,

    /// No adapter is registered for the requested source
    #[error("No adapter registered for source: {0}")]
    NoAdapter(Source),

    /// An item cannot be resolved to a stream locator
    #[error("Cannot resolve item: {0}")]
    Resolution(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}
