//! Error types for entity-config-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from entity-config-core
    #[error(transparent)]
    Core(#[from] entity_config_core::Error),

    /// Output encoding error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Invalid `--filter` expression
    #[error("Invalid filter: {0}")]
    Filter(#[from] regex::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
