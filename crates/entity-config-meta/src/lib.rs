//! Value types of the entity configuration engine
//!
//! - [`ConfigId`]: entity-level or field-level identifier within a scope,
//!   with the canonical `scope.className[.fieldName]` key
//! - [`Config`]: mutable values bound to an identifier
//! - [`change_set`]: diff of values against their loaded snapshot
//! - [`MetadataSource`]: descriptors of configurable classes
//! - [`PropertyConfigContainer`]: per-scope property rules

pub mod change_set;
pub mod config;
pub mod error;
pub mod helper;
pub mod id;
pub mod metadata;
pub mod mode;
pub mod property;
pub mod value;

pub use change_set::{ChangeSet, diff, merge_change_sets};
pub use config::Config;
pub use error::{Error, Result};
pub use helper::{real_class_name, translation_key};
pub use id::{ConfigId, EntityConfigId, FieldConfigId};
pub use metadata::{EntityMetadata, FieldMetadata, MetadataSource, StaticMetadataSource};
pub use mode::ConfigMode;
pub use property::{PropertyConfigContainer, PropertyItem, PropertyOptions, PropertyType};
pub use value::{Values, index_string, is_empty_value, is_truthy, loose_eq};

/// Re-exported so callers build values without naming serde_json.
pub use serde_json::Value;
