//! Error types for persistence operations

/// Result type alias for persistence operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while persisting a document
///
/// Load paths never surface these: a missing or corrupt file reads back as
/// an empty document. Save paths return them so the caller can log the
/// failure, but nothing treats them as fatal.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
