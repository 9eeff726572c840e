//! Demo scopes, metadata and collaborators.
//!
//! Three scopes are provided, registered in this order:
//!
//! - `entity`: translatable `label`, `plural_label` and `description`, an
//!   indexed `icon`
//! - `extend`: `owner` defaulting to `System`
//! - `datagrid`: field-level `is_visible` (indexed) and a `precision` only
//!   allowed for `decimal` fields

use std::sync::Arc;

use entity_config_cache::{ConfigCache, MemoryCacheProvider};
use entity_config_meta::{
    EntityMetadata, FieldMetadata, PropertyConfigContainer, PropertyOptions, PropertyType,
    StaticMetadataSource, Values,
};
use entity_config_model::InMemoryModelStore;
use serde_json::{Value, json};

pub const CONTACT: &str = r"Acme\DemoBundle\Entity\Contact";
pub const ACCOUNT: &str = r"Acme\DemoBundle\Entity\Account";
/// Described by metadata but not configurable.
pub const AUDIT_LOG: &str = r"Acme\DemoBundle\Entity\AuditLog";

/// Object literal as [`Values`].
///
/// # Panics
/// Panics if `value` is not a JSON object.
pub fn values(value: Value) -> Values {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

fn options(value: Value) -> PropertyOptions {
    serde_json::from_value(value).unwrap_or_else(|e| panic!("invalid property options: {e}"))
}

pub fn entity_scope() -> PropertyConfigContainer {
    PropertyConfigContainer::new()
        .with_item(PropertyType::Entity, "label", options(json!({"translatable": true})))
        .with_item(
            PropertyType::Entity,
            "plural_label",
            options(json!({"translatable": true})),
        )
        .with_item(
            PropertyType::Entity,
            "description",
            options(json!({"translatable": true})),
        )
        .with_item(
            PropertyType::Entity,
            "icon",
            options(json!({"default_value": "icon-default", "indexed": true})),
        )
        .with_item(PropertyType::Field, "label", options(json!({"translatable": true})))
        .with_item(
            PropertyType::Field,
            "description",
            options(json!({"translatable": true})),
        )
}

pub fn extend_scope() -> PropertyConfigContainer {
    PropertyConfigContainer::new()
        .with_item(
            PropertyType::Entity,
            "owner",
            options(json!({"default_value": "System"})),
        )
        .with_item(
            PropertyType::Entity,
            "is_extend",
            options(json!({"default_value": false})),
        )
        .with_item(
            PropertyType::Field,
            "owner",
            options(json!({"default_value": "System"})),
        )
}

pub fn datagrid_scope() -> PropertyConfigContainer {
    PropertyConfigContainer::new()
        .with_item(
            PropertyType::Field,
            "is_visible",
            options(json!({"default_value": true, "indexed": true})),
        )
        .with_item(
            PropertyType::Field,
            "precision",
            options(json!({"default_value": 2, "allowed_type": ["decimal"]})),
        )
}

/// All demo scopes in registration order.
pub fn scopes() -> Vec<(&'static str, PropertyConfigContainer)> {
    vec![
        ("entity", entity_scope()),
        ("extend", extend_scope()),
        ("datagrid", datagrid_scope()),
    ]
}

/// Contact and Account are configurable, AuditLog is not.
pub fn metadata() -> StaticMetadataSource {
    [
        EntityMetadata::new(CONTACT)
            .with_default_values("entity", values(json!({"icon": "icon-user"})))
            .with_field(FieldMetadata::new("id", "integer"))
            .with_field(
                FieldMetadata::new("email", "string")
                    .with_default_values("entity", values(json!({"description": "Primary email"}))),
            )
            .with_field(FieldMetadata::new("credit", "decimal")),
        EntityMetadata::new(ACCOUNT).with_field(FieldMetadata::new("name", "string")),
        EntityMetadata::new(AUDIT_LOG)
            .not_configurable()
            .with_field(FieldMetadata::new("message", "text")),
    ]
    .into_iter()
    .collect()
}

pub fn memory_cache() -> ConfigCache {
    ConfigCache::new(
        Box::new(MemoryCacheProvider::new()),
        Box::new(MemoryCacheProvider::new()),
    )
}

/// Shared tier handles, for several caches modelling separate processes.
#[derive(Clone, Default)]
pub struct SharedCache {
    pub configs: Arc<MemoryCacheProvider>,
    pub configurable: Arc<MemoryCacheProvider>,
}

impl SharedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache with its own local tier over the shared providers.
    pub fn cache(&self) -> ConfigCache {
        ConfigCache::new(
            Box::new(Arc::clone(&self.configs)),
            Box::new(Arc::clone(&self.configurable)),
        )
    }
}

/// Store whose schema is ready.
pub fn store() -> InMemoryModelStore {
    InMemoryModelStore::new()
}

/// Store simulating a missing schema.
pub fn store_without_schema() -> InMemoryModelStore {
    let mut store = InMemoryModelStore::new();
    store.set_schema_ready(false);
    store
}
