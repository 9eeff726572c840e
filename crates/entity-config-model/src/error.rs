//! Error types for entity-config-model

use std::path::PathBuf;

/// Result type for entity-config-model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in entity-config-model operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No durable model exists for the class or field
    #[error("{}", describe_missing(.class_name, .field_name.as_deref()))]
    ModelNotFound {
        class_name: String,
        field_name: Option<String>,
    },

    /// A model for the class or field already exists
    #[error("Config model for '{key}' already exists")]
    DuplicateModel { key: String },

    /// The store file has not been created yet
    #[error("Model store at {path} is not initialized")]
    NotInitialized { path: PathBuf },

    /// Store file problem
    #[error(transparent)]
    Fs(#[from] entity_config_fs::Error),
}

fn describe_missing(class_name: &str, field_name: Option<&str>) -> String {
    match field_name {
        Some(field) => format!("No config model for field '{field}' of class '{class_name}'"),
        None => format!("No config model for class '{class_name}'"),
    }
}

impl Error {
    pub fn entity_not_found(class_name: &str) -> Self {
        Self::ModelNotFound {
            class_name: class_name.to_string(),
            field_name: None,
        }
    }

    pub fn field_not_found(class_name: &str, field_name: &str) -> Self {
        Self::ModelNotFound {
            class_name: class_name.to_string(),
            field_name: Some(field_name.to_string()),
        }
    }
}
