//! Two-tier cache of configs and configurable flags
//!
//! The local tier is a process map that is always consulted first and always
//! updated. The shared tier is a [`CacheProvider`], consulted on a local miss
//! and skipped by every operation called with `local_only`.
//!
//! Configs are cached per class and per field as one bucket holding the
//! values of every scope. Configurable flags and the entity/field lists live
//! in a second provider so they can be dropped on their own.

use std::collections::{BTreeMap, HashMap};

use entity_config_meta::{Config, ConfigId, Values};
use serde::{Deserialize, Serialize};

use crate::provider::CacheProvider;
use crate::{Error, Result};

const ENTITIES_KEY: &str = "_entities";
const FIELDS_KEY_PREFIX: &str = "_fields_";

/// Cached values of one class or field across scopes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Bucket {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    field_type: Option<String>,
    #[serde(default)]
    scopes: BTreeMap<String, Values>,
}

/// Cached description of a field of a configurable class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedField {
    pub field_type: String,
    pub hidden: bool,
}

/// Two-tier cache of configs and configurable flags.
pub struct ConfigCache {
    cache: Box<dyn CacheProvider>,
    model_cache: Box<dyn CacheProvider>,
    local_configs: HashMap<String, Bucket>,
    local_configurable: HashMap<String, bool>,
    local_entities: Option<BTreeMap<String, bool>>,
    local_fields: HashMap<String, BTreeMap<String, CachedField>>,
}

impl std::fmt::Debug for ConfigCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigCache")
            .field("local_configs", &self.local_configs.len())
            .field("local_configurable", &self.local_configurable.len())
            .finish()
    }
}

fn bucket_key(class_name: &str, field_name: Option<&str>) -> String {
    match field_name {
        Some(field) => format!("{class_name}.{field}"),
        None => class_name.to_string(),
    }
}

impl ConfigCache {
    /// `cache` holds config buckets, `model_cache` the configurable flags.
    pub fn new(cache: Box<dyn CacheProvider>, model_cache: Box<dyn CacheProvider>) -> Self {
        Self {
            cache,
            model_cache,
            local_configs: HashMap::new(),
            local_configurable: HashMap::new(),
            local_entities: None,
            local_fields: HashMap::new(),
        }
    }

    pub fn get_entity_config(
        &mut self,
        scope: &str,
        class_name: &str,
        local_only: bool,
    ) -> Result<Option<Config>> {
        self.get_config(&ConfigId::entity(scope, class_name), local_only)
    }

    pub fn get_field_config(
        &mut self,
        scope: &str,
        class_name: &str,
        field_name: &str,
        local_only: bool,
    ) -> Result<Option<Config>> {
        self.get_config(&ConfigId::field(scope, class_name, field_name, None), local_only)
    }

    /// Cached config for `id`; the field type comes from the cache.
    pub fn get_config(&mut self, id: &ConfigId, local_only: bool) -> Result<Option<Config>> {
        let key = bucket_key(id.class_name(), id.field_name());
        let Some(bucket) = self.load_bucket(&key, local_only)? else {
            tracing::trace!(key = %id, "Config cache miss");
            return Ok(None);
        };

        let Some(values) = bucket.scopes.get(id.scope()) else {
            return Ok(None);
        };
        let config_id = match id.field_name() {
            Some(field) => ConfigId::field(
                id.scope(),
                id.class_name(),
                field,
                bucket.field_type.clone(),
            ),
            None => id.clone(),
        };
        tracing::trace!(key = %id, "Config cache hit");
        Ok(Some(Config::with_values(config_id, values.clone())))
    }

    /// Store the values of `config` under its scope.
    pub fn save_config(&mut self, config: &Config, local_only: bool) -> Result<bool> {
        let id = config.id();
        let key = bucket_key(id.class_name(), id.field_name());

        let mut bucket = self.load_bucket(&key, local_only)?.unwrap_or_default();
        if let Some(field_type) = id.field_type() {
            bucket.field_type = Some(field_type.to_string());
        }
        bucket
            .scopes
            .insert(id.scope().to_string(), config.all().clone());

        self.store_bucket(key, bucket, local_only)
    }

    /// Store the values of every scope of a class at once.
    pub fn save_entity_config_values(
        &mut self,
        values: BTreeMap<String, Values>,
        class_name: &str,
    ) -> Result<bool> {
        let bucket = Bucket {
            field_type: None,
            scopes: values,
        };
        self.store_bucket(bucket_key(class_name, None), bucket, false)
    }

    /// Store the values of every scope of a field at once.
    pub fn save_field_config_values(
        &mut self,
        values: BTreeMap<String, Values>,
        class_name: &str,
        field_name: &str,
        field_type: &str,
    ) -> Result<bool> {
        let bucket = Bucket {
            field_type: Some(field_type.to_string()),
            scopes: values,
        };
        self.store_bucket(bucket_key(class_name, Some(field_name)), bucket, false)
    }

    pub fn delete_entity_config(&mut self, class_name: &str, local_only: bool) -> Result<bool> {
        self.delete_bucket(bucket_key(class_name, None), local_only)
    }

    pub fn delete_field_config(
        &mut self,
        class_name: &str,
        field_name: &str,
        local_only: bool,
    ) -> Result<bool> {
        self.delete_bucket(bucket_key(class_name, Some(field_name)), local_only)
    }

    /// Drop the cache entry of `id`, all scopes included.
    pub fn delete_config(&mut self, id: &ConfigId, local_only: bool) -> Result<bool> {
        self.delete_bucket(bucket_key(id.class_name(), id.field_name()), local_only)
    }

    pub fn delete_all_configs(&mut self, local_only: bool) -> Result<bool> {
        self.local_configs.clear();
        if local_only {
            return Ok(true);
        }
        tracing::debug!("Dropping all cached configs");
        self.cache.delete_all()
    }

    /// Whether a class or field is configurable; `None` when unknown.
    pub fn get_configurable(
        &mut self,
        class_name: &str,
        field_name: Option<&str>,
    ) -> Result<Option<bool>> {
        let key = bucket_key(class_name, field_name);
        if let Some(flag) = self.local_configurable.get(&key) {
            return Ok(Some(*flag));
        }

        let flag = match self.model_cache.fetch(&key)? {
            Some(raw) => match raw.as_str() {
                "1" => true,
                "0" => false,
                other => {
                    return Err(Error::CorruptEntry {
                        key,
                        message: format!("unexpected configurable flag {other:?}"),
                    });
                }
            },
            None => return Ok(None),
        };
        self.local_configurable.insert(key, flag);
        Ok(Some(flag))
    }

    pub fn save_configurable(
        &mut self,
        flag: bool,
        class_name: &str,
        field_name: Option<&str>,
        local_only: bool,
    ) -> Result<bool> {
        let key = bucket_key(class_name, field_name);
        self.local_configurable.insert(key.clone(), flag);
        if local_only {
            return Ok(true);
        }
        self.model_cache.save(&key, if flag { "1" } else { "0" })
    }

    /// Forget every configurable flag and the entity/field lists.
    pub fn delete_all_configurable(&mut self, local_only: bool) -> Result<bool> {
        self.local_configurable.clear();
        self.local_entities = None;
        self.local_fields.clear();
        if local_only {
            return Ok(true);
        }
        tracing::debug!("Dropping all cached configurable flags");
        self.model_cache.delete_all()
    }

    /// Store the configurable classes with their hidden flag.
    pub fn save_entities(&mut self, entities: BTreeMap<String, bool>) -> Result<bool> {
        let raw = serde_json::to_string(&entities)?;
        self.local_entities = Some(entities);
        self.model_cache.save(ENTITIES_KEY, &raw)
    }

    /// Configurable classes with their hidden flag, when cached.
    pub fn get_entities(&mut self) -> Result<Option<BTreeMap<String, bool>>> {
        if let Some(entities) = &self.local_entities {
            return Ok(Some(entities.clone()));
        }
        let Some(raw) = self.model_cache.fetch(ENTITIES_KEY)? else {
            return Ok(None);
        };
        let entities: BTreeMap<String, bool> = decode(ENTITIES_KEY, &raw)?;
        self.local_entities = Some(entities.clone());
        Ok(Some(entities))
    }

    /// Store the configurable fields of a class.
    pub fn save_fields(
        &mut self,
        class_name: &str,
        fields: BTreeMap<String, CachedField>,
    ) -> Result<bool> {
        let raw = serde_json::to_string(&fields)?;
        self.local_fields.insert(class_name.to_string(), fields);
        self.model_cache
            .save(&format!("{FIELDS_KEY_PREFIX}{class_name}"), &raw)
    }

    /// Configurable fields of a class, when cached.
    pub fn get_fields(&mut self, class_name: &str) -> Result<Option<BTreeMap<String, CachedField>>> {
        if let Some(fields) = self.local_fields.get(class_name) {
            return Ok(Some(fields.clone()));
        }
        let key = format!("{FIELDS_KEY_PREFIX}{class_name}");
        let Some(raw) = self.model_cache.fetch(&key)? else {
            return Ok(None);
        };
        let fields: BTreeMap<String, CachedField> = decode(&key, &raw)?;
        self.local_fields
            .insert(class_name.to_string(), fields.clone());
        Ok(Some(fields))
    }

    fn load_bucket(&mut self, key: &str, local_only: bool) -> Result<Option<Bucket>> {
        if let Some(bucket) = self.local_configs.get(key) {
            return Ok(Some(bucket.clone()));
        }
        if local_only {
            return Ok(None);
        }
        let Some(raw) = self.cache.fetch(key)? else {
            return Ok(None);
        };
        let bucket: Bucket = decode(key, &raw)?;
        self.local_configs.insert(key.to_string(), bucket.clone());
        Ok(Some(bucket))
    }

    fn store_bucket(&mut self, key: String, bucket: Bucket, local_only: bool) -> Result<bool> {
        let saved = if local_only {
            true
        } else {
            self.cache.save(&key, &serde_json::to_string(&bucket)?)?
        };
        self.local_configs.insert(key, bucket);
        Ok(saved)
    }

    fn delete_bucket(&mut self, key: String, local_only: bool) -> Result<bool> {
        self.local_configs.remove(&key);
        if local_only {
            return Ok(true);
        }
        self.cache.delete(&key)
    }
}

fn decode<T: serde::de::DeserializeOwned>(key: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| Error::CorruptEntry {
        key: key.to_string(),
        message: e.to_string(),
    })
}
