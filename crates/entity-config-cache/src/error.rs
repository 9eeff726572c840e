//! Error types for entity-config-cache

use std::path::PathBuf;

/// Result type for entity-config-cache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in entity-config-cache operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Cache directory is missing or not a directory
    #[error("Cache directory {path} does not exist")]
    MissingDirectory { path: PathBuf },

    /// A cached entry could not be decoded
    #[error("Corrupt cache entry '{key}': {message}")]
    CorruptEntry { key: String, message: String },

    /// File-backed provider failure
    #[error(transparent)]
    Fs(#[from] entity_config_fs::Error),

    /// JSON encoding of a cache entry failed
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
