//! Error types for entity-config-meta

/// Result type for entity-config-meta operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in entity-config-meta operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A strict lookup found no value for the code
    #[error("Config '{code}' for class '{class_name}' in scope '{scope}' is not found")]
    ValueNotFound {
        code: String,
        class_name: String,
        scope: String,
    },

    /// Unknown model mode string
    #[error("Invalid config mode: {mode}")]
    InvalidMode { mode: String },

    /// Metadata or scope definition file problem
    #[error(transparent)]
    Fs(#[from] entity_config_fs::Error),
}
