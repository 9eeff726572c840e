//! Error types for entity-config-core

/// Result type for entity-config-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in entity-config-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Config was read before the backing schema exists
    #[error(
        "Database is not synced: config storage is missing. Check readiness with ConfigManager::check_database first"
    )]
    SchemaNotReady,

    /// Class or field does not take configuration
    #[error("{}", describe_target("is not configurable", .class_name, .field_name.as_deref()))]
    NotConfigurable {
        class_name: String,
        field_name: Option<String>,
    },

    /// A class name could not be resolved from the given input
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Claimed configurable, but the durable model is missing
    #[error("{}", describe_target("has no config model", .class_name, .field_name.as_deref()))]
    ModelNotFound {
        class_name: String,
        field_name: Option<String>,
    },

    /// Listeners kept restaging configs with new values during a flush
    #[error("Flush did not settle after {passes} passes")]
    FlushNotSettled { passes: usize },

    /// No provider is registered for the scope
    #[error("Unknown config scope: {scope}")]
    UnknownScope { scope: String },

    // Transparent wrappers for underlying crate errors
    /// Value type error from entity-config-meta
    #[error(transparent)]
    Meta(#[from] entity_config_meta::Error),

    /// Cache error from entity-config-cache
    #[error(transparent)]
    Cache(#[from] entity_config_cache::Error),

    /// Store error from entity-config-model
    #[error(transparent)]
    Model(entity_config_model::Error),

    /// Filesystem error from entity-config-fs
    #[error(transparent)]
    Fs(#[from] entity_config_fs::Error),
}

fn describe_target(what: &str, class_name: &str, field_name: Option<&str>) -> String {
    match field_name {
        Some(field) => format!("Field '{field}' of entity '{class_name}' {what}"),
        None => format!("Entity '{class_name}' {what}"),
    }
}

impl From<entity_config_model::Error> for Error {
    fn from(err: entity_config_model::Error) -> Self {
        match err {
            entity_config_model::Error::ModelNotFound {
                class_name,
                field_name,
            } => Self::ModelNotFound {
                class_name,
                field_name,
            },
            other => Self::Model(other),
        }
    }
}

impl Error {
    pub fn not_configurable(class_name: &str, field_name: Option<&str>) -> Self {
        Self::NotConfigurable {
            class_name: class_name.to_string(),
            field_name: field_name.map(str::to_string),
        }
    }

    pub fn model_not_found(class_name: &str, field_name: Option<&str>) -> Self {
        Self::ModelNotFound {
            class_name: class_name.to_string(),
            field_name: field_name.map(str::to_string),
        }
    }
}
