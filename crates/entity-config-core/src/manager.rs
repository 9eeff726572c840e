//! Config manager: load, stage, diff and flush entity configs
//!
//! The manager fronts three collaborators: the [`MetadataSource`] describing
//! configurable classes, the [`ConfigModelStore`] holding durable models and
//! the [`ConfigCache`] in front of both. Configs read through it are
//! snapshots; callers mutate them and hand them back via
//! [`persist`](ConfigManager::persist). [`flush`](ConfigManager::flush)
//! writes everything staged to the store in one pass.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use chrono::Utc;
use entity_config_cache::ConfigCache;
use entity_config_meta::{
    ChangeSet, Config, ConfigId, ConfigMode, EntityMetadata, FieldMetadata, MetadataSource,
    PropertyConfigContainer, PropertyType, Value, Values, diff, loose_eq, merge_change_sets,
    real_class_name,
};
use entity_config_model::{ConfigModel, ConfigModelStore, EntityConfigModel, FieldConfigModel};

use crate::defaults::default_values;
use crate::event::{self, ConfigEvent, ConfigEventKind, ConfigListener, EventDispatcher};
use crate::pending::PendingConfigs;
use crate::provider::ConfigProvider;
use crate::scope::ScopeRegistry;
use crate::{Error, Result};

/// Scope holding ownership data of a class or field.
pub const EXTEND_SCOPE: &str = "extend";
/// Owner of classes and fields created at runtime.
pub const OWNER_CUSTOM: &str = "Custom";
/// Passes a flush may take before listeners are assumed to restage forever.
pub const MAX_FLUSH_PASSES: usize = 16;

/// Central coordinator of entity configuration.
pub struct ConfigManager {
    metadata: Box<dyn MetadataSource>,
    store: Box<dyn ConfigModelStore>,
    cache: ConfigCache,
    scopes: ScopeRegistry,
    dispatcher: EventDispatcher,
    originals: HashMap<String, Config>,
    pending: PendingConfigs,
    change_sets: HashMap<String, ChangeSet>,
    renamed_fields: Vec<(String, String)>,
}

impl fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigManager")
            .field("scopes", &self.scopes.list())
            .field("pending", &self.pending.len())
            .field("originals", &self.originals.len())
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

impl ConfigManager {
    pub fn new(
        metadata: Box<dyn MetadataSource>,
        store: Box<dyn ConfigModelStore>,
        cache: ConfigCache,
    ) -> Self {
        Self {
            metadata,
            store,
            cache,
            scopes: ScopeRegistry::new(),
            dispatcher: EventDispatcher::new(),
            originals: HashMap::new(),
            pending: PendingConfigs::default(),
            change_sets: HashMap::new(),
            renamed_fields: Vec::new(),
        }
    }

    // Scopes and providers

    /// Register a scope with its property rules.
    pub fn add_scope(&mut self, scope: impl Into<String>, properties: PropertyConfigContainer) {
        let scope = scope.into();
        tracing::debug!(%scope, "Registered config scope");
        self.scopes.register(scope, properties);
    }

    pub fn scopes(&self) -> &ScopeRegistry {
        &self.scopes
    }

    /// Property rules of `scope`.
    pub fn properties(&self, scope: &str) -> Result<&PropertyConfigContainer> {
        self.scopes
            .get(scope)
            .map(|registration| &registration.properties)
            .ok_or_else(|| Error::UnknownScope {
                scope: scope.to_string(),
            })
    }

    /// Registered scope names, in registration order.
    pub fn get_providers(&self) -> Vec<String> {
        self.scopes.names()
    }

    /// Façade bound to one scope.
    pub fn get_provider(&mut self, scope: &str) -> Result<ConfigProvider<'_>> {
        if !self.scopes.contains(scope) {
            return Err(Error::UnknownScope {
                scope: scope.to_string(),
            });
        }
        Ok(ConfigProvider::new(self, scope))
    }

    // Events

    /// Subscribe `listener` to events of `kind`.
    pub fn add_listener(&mut self, kind: ConfigEventKind, listener: impl ConfigListener + 'static) {
        self.dispatcher.subscribe(kind, Box::new(listener));
    }

    pub(crate) fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    pub(crate) fn dispatcher_mut(&mut self) -> &mut EventDispatcher {
        &mut self.dispatcher
    }

    // Collaborators

    pub fn store(&self) -> &dyn ConfigModelStore {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn ConfigModelStore {
        self.store.as_mut()
    }

    pub fn cache_mut(&mut self) -> &mut ConfigCache {
        &mut self.cache
    }

    pub fn metadata_source(&self) -> &dyn MetadataSource {
        self.metadata.as_ref()
    }

    /// Whether the backing schema exists.
    pub fn check_database(&mut self) -> Result<bool> {
        Ok(self.store.check_database()?)
    }

    /// Metadata of a configurable class; proxy prefixes are ignored.
    pub fn get_entity_metadata(&self, class_name: &str) -> Option<EntityMetadata> {
        self.metadata
            .metadata_for_class(real_class_name(class_name))
            .filter(|metadata| metadata.configurable)
    }

    pub fn get_field_metadata(&self, class_name: &str, field_name: &str) -> Option<FieldMetadata> {
        self.get_entity_metadata(class_name)
            .and_then(|metadata| metadata.field(field_name).cloned())
    }

    // Models

    pub fn has_config_entity_model(&self, class_name: &str) -> Result<bool> {
        Ok(self.store.find_entity_model(class_name)?.is_some())
    }

    pub fn has_config_field_model(&self, class_name: &str, field_name: &str) -> Result<bool> {
        Ok(self.store.find_field_model(class_name, field_name)?.is_some())
    }

    pub fn get_config_entity_model(&self, class_name: &str) -> Result<Option<EntityConfigModel>> {
        Ok(self.store.find_entity_model(class_name)?)
    }

    pub fn get_config_field_model(
        &self,
        class_name: &str,
        field_name: &str,
    ) -> Result<Option<FieldConfigModel>> {
        Ok(self.store.find_field_model(class_name, field_name)?)
    }

    /// Entity models, or the field models of `class_name`.
    pub fn get_config_models(
        &mut self,
        class_name: Option<&str>,
        with_hidden: bool,
    ) -> Result<Vec<ConfigModel>> {
        if !self.store.check_database()? {
            return Ok(Vec::new());
        }
        Ok(self.store.get_models(class_name, with_hidden)?)
    }

    // Reading configs

    /// Whether a class, or a field of it, takes configuration.
    ///
    /// Always `false` before the schema exists. The answer is cached.
    pub fn has_config(&mut self, class_name: &str, field_name: Option<&str>) -> Result<bool> {
        if !self.store.check_database()? {
            return Ok(false);
        }
        if let Some(flag) = self.cache.get_configurable(class_name, field_name)? {
            return Ok(flag);
        }

        let configurable = match field_name {
            None => self.store.find_entity_model(class_name)?.is_some(),
            Some(field) => self.store.find_field_model(class_name, field)?.is_some(),
        };
        self.cache
            .save_configurable(configurable, class_name, field_name, false)?;
        Ok(configurable)
    }

    /// Config of `id`.
    ///
    /// Staged configs win over cached ones, cached over stored. The first
    /// load of a key records the snapshot its change set is measured
    /// against.
    pub fn get_config(&mut self, id: &ConfigId) -> Result<Config> {
        let key = id.key();
        if let Some(config) = self.pending.get(&key) {
            return Ok(config.clone());
        }
        if !id.is_field() && id.class_name().is_empty() {
            return self.create_entity_config(id.scope());
        }

        if let Some(config) = self.cache.get_config(id, false)? {
            self.originals
                .entry(key)
                .or_insert_with(|| config.clone());
            return Ok(config);
        }

        if !self.store.check_database()? {
            return Err(Error::SchemaNotReady);
        }
        let class_name = id.class_name();
        if !self.has_config(class_name, None)? {
            return Err(Error::not_configurable(class_name, None));
        }
        let model: ConfigModel = match id.field_name() {
            None => self.store.get_entity_model(class_name)?.into(),
            Some(field) => {
                if !self.has_config(class_name, Some(field))? {
                    return Err(Error::not_configurable(class_name, Some(field)));
                }
                self.store.get_field_model(class_name, field)?.into()
            }
        };

        let config = Config::with_values(
            Self::get_config_id_by_model(&model, id.scope()),
            model.to_array(id.scope()),
        );
        self.cache.save_config(&config, false)?;
        self.originals
            .entry(key)
            .or_insert_with(|| config.clone());
        Ok(config)
    }

    pub fn get_entity_config(&mut self, scope: &str, class_name: &str) -> Result<Config> {
        self.get_config(&ConfigId::entity(scope, class_name))
    }

    pub fn get_field_config(
        &mut self,
        scope: &str,
        class_name: &str,
        field_name: &str,
    ) -> Result<Config> {
        let id = self.get_id(scope, class_name, Some(field_name))?;
        self.get_config(&id)
    }

    /// Blank config of a not-yet-named class, seeded with property defaults.
    pub fn create_entity_config(&self, scope: &str) -> Result<Config> {
        let values = self
            .properties(scope)?
            .default_values(PropertyType::Entity, None);
        Ok(Config::with_values(ConfigId::entity(scope, ""), values))
    }

    /// Identifier of a class or field; the field type is looked up.
    pub fn get_id(
        &mut self,
        scope: &str,
        class_name: &str,
        field_name: Option<&str>,
    ) -> Result<ConfigId> {
        match field_name {
            None => Ok(ConfigId::entity(scope, class_name)),
            Some(field) => {
                let field_type = self.field_type(class_name, field)?;
                Ok(ConfigId::field(scope, class_name, field, field_type))
            }
        }
    }

    pub fn get_config_id_by_model(model: &ConfigModel, scope: &str) -> ConfigId {
        match model {
            ConfigModel::Entity(entity) => ConfigId::entity(scope, entity.class_name.as_str()),
            ConfigModel::Field(field) => ConfigId::field(
                scope,
                field.entity_class.as_str(),
                field.field_name.as_str(),
                Some(field.field_type.clone()),
            ),
        }
    }

    /// Ids of every class, or of every field of `class_name`.
    pub fn get_ids(
        &mut self,
        scope: &str,
        class_name: Option<&str>,
        with_hidden: bool,
    ) -> Result<Vec<ConfigId>> {
        Ok(self
            .get_config_models(class_name, with_hidden)?
            .iter()
            .map(|model| Self::get_config_id_by_model(model, scope))
            .collect())
    }

    pub fn get_configs(
        &mut self,
        scope: &str,
        class_name: Option<&str>,
        with_hidden: bool,
    ) -> Result<Vec<Config>> {
        self.get_ids(scope, class_name, with_hidden)?
            .iter()
            .map(|id| self.get_config(id))
            .collect()
    }

    fn field_type(&mut self, class_name: &str, field_name: &str) -> Result<Option<String>> {
        if let Some(fields) = self.cache.get_fields(class_name)?
            && let Some(field) = fields.get(field_name)
        {
            return Ok(Some(field.field_type.clone()));
        }
        Ok(self
            .store
            .find_field_model(class_name, field_name)?
            .map(|model| model.field_type))
    }

    // Staging

    /// Stage `config` for the next flush, replacing one staged under its key.
    pub fn persist(&mut self, config: Config) {
        tracing::trace!(key = %config.id(), "Staged config");
        self.pending.insert(config);
    }

    /// Stage `config` on top of the values already staged under its key.
    pub fn merge(&mut self, config: Config) -> Config {
        let merged = match self.pending.get(&config.id().key()) {
            Some(staged) => {
                let mut values = staged.all().clone();
                for (code, value) in config.all() {
                    values.insert(code.clone(), value.clone());
                }
                Config::with_values(config.id().clone(), values)
            }
            None => config,
        };
        self.pending.insert(merged.clone());
        merged
    }

    /// Drop the config staged under `id`, together with its change set.
    pub fn unstage(&mut self, id: &ConfigId) -> Option<Config> {
        let key = id.key();
        self.change_sets.remove(&key);
        let config = self.pending.remove(&key)?;
        tracing::trace!(key = %id, "Unstaged config");
        Some(config)
    }

    /// Reset the unit of work.
    ///
    /// Staged configs, change sets, originals and pending field renames are
    /// discarded. Caches and the store are left alone.
    pub fn clear(&mut self) {
        tracing::debug!(staged = self.pending.len(), "Cleared staged configs");
        self.pending = PendingConfigs::default();
        self.change_sets.clear();
        self.originals.clear();
        self.renamed_fields.clear();
    }

    /// Staged configs in staging order.
    pub fn get_update_configs(&self) -> Vec<Config> {
        self.pending.iter().cloned().collect()
    }

    /// Staged configs accepted by `filter`, in staging order.
    pub fn get_update_configs_by<F>(&self, filter: F) -> Vec<Config>
    where
        F: Fn(&Config) -> bool,
    {
        self.pending
            .iter()
            .filter(|config| filter(config))
            .cloned()
            .collect()
    }

    /// Diff `config` against its snapshot and fold it into its change set.
    ///
    /// An existing entry keeps the first old value of each code.
    pub fn calculate_config_change_set(&mut self, config: &Config) {
        let key = config.id().key();
        let incoming = match self.originals.get(&key) {
            Some(original) => diff(original.all(), config.all()),
            None => diff(&Values::new(), config.all()),
        };
        merge_change_sets(self.change_sets.entry(key).or_default(), incoming);
    }

    pub fn get_config_change_set(&self, config: &Config) -> ChangeSet {
        self.change_sets
            .get(&config.id().key())
            .cloned()
            .unwrap_or_default()
    }

    /// Write every staged config to its model and commit.
    ///
    /// Listeners of `pre-persist-config` may stage further configs; those are
    /// picked up in another pass until a pass stages nothing new. A key
    /// written earlier in the flush and restaged with other values is
    /// written again.
    pub fn flush(&mut self) -> Result<()> {
        let mut models: Vec<ConfigModel> = Vec::new();
        let mut slots: HashMap<String, usize> = HashMap::new();
        let mut written: HashMap<String, Values> = HashMap::new();
        let mut passes = 0usize;

        loop {
            let batch: Vec<String> = self
                .pending
                .iter()
                .filter(|config| written.get(&config.id().key()) != Some(config.all()))
                .map(|config| config.id().key())
                .collect();
            if batch.is_empty() {
                break;
            }
            if passes == MAX_FLUSH_PASSES {
                return Err(Error::FlushNotSettled { passes });
            }
            passes += 1;
            if passes > 1 {
                tracing::warn!(pass = passes, configs = batch.len(), "Configs staged during flush, running another pass");
            } else {
                tracing::debug!(configs = batch.len(), "Writing staged configs");
            }

            for key in batch {
                let Some(config) = self.pending.get(&key).cloned() else {
                    continue;
                };
                self.calculate_config_change_set(&config);
                event::dispatch(self, &ConfigEvent::PrePersistConfig { config })?;

                // Listeners may have restaged or dropped it
                let Some(config) = self.pending.get(&key).cloned() else {
                    continue;
                };
                let id = config.id();
                let slot = match slots.get(&id.model_key()) {
                    Some(slot) => *slot,
                    None => {
                        models.push(self.load_model(id)?);
                        slots.insert(id.model_key(), models.len() - 1);
                        models.len() - 1
                    }
                };

                let indexed = self.indexed_codes(id);
                let model = &mut models[slot];
                model.from_array(id.scope(), config.all(), &indexed);
                let stored = Config::with_values(id.clone(), model.to_array(id.scope()));

                self.cache.delete_config(id, false)?;
                self.originals.insert(key.clone(), stored);
                written.insert(key, config.all().clone());
            }
        }

        let now = Utc::now();
        for model in &mut models {
            if model.id().is_none() {
                model.set_created(now);
            }
            model.set_updated(now);
        }
        let saved = self.store.save(models)?;

        for key in written.keys() {
            self.pending.remove(key);
        }
        let renamed = std::mem::take(&mut self.renamed_fields);
        for (class_name, field_name) in &renamed {
            self.cache
                .delete_field_config(class_name, field_name, false)?;
        }
        if !saved.is_empty() || !renamed.is_empty() {
            self.cache.delete_all_configurable(false)?;
        }

        event::dispatch(self, &ConfigEvent::PostFlush {
            models: saved.clone(),
        })?;
        for key in written.keys() {
            self.change_sets.remove(key);
        }

        tracing::info!(
            configs = written.len(),
            models = saved.len(),
            passes,
            "Flushed entity configs"
        );
        Ok(())
    }

    fn load_model(&self, id: &ConfigId) -> Result<ConfigModel> {
        Ok(match id.field_name() {
            None => self.store.get_entity_model(id.class_name())?.into(),
            Some(field) => self.store.get_field_model(id.class_name(), field)?.into(),
        })
    }

    fn indexed_codes(&self, id: &ConfigId) -> BTreeSet<String> {
        let property_type = if id.is_field() {
            PropertyType::Field
        } else {
            PropertyType::Entity
        };
        self.scopes
            .get(id.scope())
            .map(|registration| registration.properties.indexed_values(property_type))
            .unwrap_or_default()
    }

    // Creating and updating models

    /// Create the model of a class and stage its default configs.
    ///
    /// An existing model is returned untouched. Without a class name a
    /// transient model is returned and nothing is staged.
    pub fn create_config_entity_model(
        &mut self,
        class_name: Option<&str>,
        mode: Option<ConfigMode>,
    ) -> Result<EntityConfigModel> {
        let Some(class_name) = class_name.filter(|name| !name.is_empty()) else {
            return Ok(self
                .store
                .create_entity_model(None, mode.unwrap_or_default())?);
        };
        if let Some(model) = self.store.find_entity_model(class_name)? {
            return Ok(model);
        }

        let metadata = self.get_entity_metadata(class_name);
        let mode = mode
            .or_else(|| metadata.as_ref().map(|m| m.mode))
            .unwrap_or_default();
        let model = self.store.create_entity_model(Some(class_name), mode)?;

        let seeded: Vec<Config> = self
            .scopes
            .iter()
            .map(|scope| {
                let declared = metadata
                    .as_ref()
                    .and_then(|m| m.default_values.get(&scope.name));
                Config::with_values(
                    ConfigId::entity(scope.name.as_str(), class_name),
                    default_values(&scope.properties, &scope.name, class_name, None, declared),
                )
            })
            .collect();
        for config in seeded {
            self.stage_created(config)?;
        }
        self.cache.save_configurable(true, class_name, None, true)?;

        tracing::info!(class = %class_name, %mode, "Created entity config model");
        event::dispatch(self, &ConfigEvent::CreateEntity {
            class_name: class_name.to_string(),
        })?;
        Ok(model)
    }

    /// Create the model of a field and stage its default configs.
    ///
    /// An existing model is returned untouched.
    pub fn create_config_field_model(
        &mut self,
        class_name: &str,
        field_name: &str,
        field_type: &str,
        mode: Option<ConfigMode>,
    ) -> Result<FieldConfigModel> {
        if let Some(model) = self.store.find_field_model(class_name, field_name)? {
            return Ok(model);
        }

        let metadata = self.get_field_metadata(class_name, field_name);
        let mode = mode
            .or_else(|| metadata.as_ref().map(|m| m.mode))
            .unwrap_or_default();
        let model = self
            .store
            .create_field_model(class_name, field_name, field_type, mode)?;

        let seeded: Vec<Config> = self
            .scopes
            .iter()
            .map(|scope| {
                let declared = metadata
                    .as_ref()
                    .and_then(|m| m.default_values.get(&scope.name));
                Config::with_values(
                    ConfigId::field(
                        scope.name.as_str(),
                        class_name,
                        field_name,
                        Some(field_type.to_string()),
                    ),
                    default_values(
                        &scope.properties,
                        &scope.name,
                        class_name,
                        Some((field_name, field_type)),
                        declared,
                    ),
                )
            })
            .collect();
        for config in seeded {
            self.stage_created(config)?;
        }
        self.cache
            .save_configurable(true, class_name, Some(field_name), true)?;

        tracing::info!(class = %class_name, field = %field_name, %field_type, "Created field config model");
        event::dispatch(self, &ConfigEvent::CreateField {
            class_name: class_name.to_string(),
            field_name: field_name.to_string(),
        })?;
        Ok(model)
    }

    fn stage_created(&mut self, config: Config) -> Result<()> {
        self.cache.save_config(&config, true)?;
        self.originals
            .insert(config.id().key(), Config::new(config.id().clone()));
        self.persist(config);
        Ok(())
    }

    /// Merge current defaults into every scope of a class.
    ///
    /// Missing codes are added. With `force` differing values are overwritten
    /// too, unless the class is owned by [`OWNER_CUSTOM`]. Only configs that
    /// actually change are staged.
    pub fn update_config_entity_model(&mut self, class_name: &str, force: bool) -> Result<()> {
        if self.store.find_entity_model(class_name)?.is_none() {
            return Err(Error::model_not_found(class_name, None));
        }
        let metadata = self.get_entity_metadata(class_name);
        let force = force && !self.is_custom(class_name, None)?;

        let defaults: Vec<(String, Values)> = self
            .scopes
            .iter()
            .map(|scope| {
                let declared = metadata
                    .as_ref()
                    .and_then(|m| m.default_values.get(&scope.name));
                (
                    scope.name.clone(),
                    default_values(&scope.properties, &scope.name, class_name, None, declared),
                )
            })
            .collect();
        for (scope, values) in defaults {
            let config = self.get_config(&ConfigId::entity(scope, class_name))?;
            self.apply_defaults(config, values, force);
        }

        tracing::debug!(class = %class_name, force, "Updated entity config model");
        event::dispatch(self, &ConfigEvent::UpdateEntity {
            class_name: class_name.to_string(),
        })
    }

    /// Merge current defaults into every scope of a field.
    pub fn update_config_field_model(
        &mut self,
        class_name: &str,
        field_name: &str,
        force: bool,
    ) -> Result<()> {
        let Some(model) = self.store.find_field_model(class_name, field_name)? else {
            return Err(Error::model_not_found(class_name, Some(field_name)));
        };
        let field_type = model.field_type;
        let metadata = self.get_field_metadata(class_name, field_name);
        let force = force && !self.is_custom(class_name, Some(field_name))?;

        let defaults: Vec<(String, Values)> = self
            .scopes
            .iter()
            .map(|scope| {
                let declared = metadata
                    .as_ref()
                    .and_then(|m| m.default_values.get(&scope.name));
                (
                    scope.name.clone(),
                    default_values(
                        &scope.properties,
                        &scope.name,
                        class_name,
                        Some((field_name, field_type.as_str())),
                        declared,
                    ),
                )
            })
            .collect();
        for (scope, values) in defaults {
            let id = ConfigId::field(scope, class_name, field_name, Some(field_type.clone()));
            let config = self.get_config(&id)?;
            self.apply_defaults(config, values, force);
        }

        tracing::debug!(class = %class_name, field = %field_name, force, "Updated field config model");
        event::dispatch(self, &ConfigEvent::UpdateField {
            class_name: class_name.to_string(),
            field_name: field_name.to_string(),
        })
    }

    fn apply_defaults(&mut self, mut config: Config, defaults: Values, force: bool) {
        let mut changed = false;
        for (code, value) in defaults {
            let apply = if force {
                config.all().get(&code).is_none_or(|stored| !loose_eq(stored, &value))
            } else {
                !config.has(&code)
            };
            if apply {
                config.set(code, value);
                changed = true;
            }
        }
        if changed {
            self.persist(config);
        }
    }

    /// Whether the class or field was created at runtime.
    pub fn is_custom(&mut self, class_name: &str, field_name: Option<&str>) -> Result<bool> {
        if !self.scopes.contains(EXTEND_SCOPE) || !self.has_config(class_name, field_name)? {
            return Ok(false);
        }
        let id = match field_name {
            None => ConfigId::entity(EXTEND_SCOPE, class_name),
            Some(field) => ConfigId::field(EXTEND_SCOPE, class_name, field, None),
        };
        Ok(self
            .get_config(&id)?
            .is_value("owner", &Value::from(OWNER_CUSTOM)))
    }

    // Schema changes

    /// Rename a field, carrying its cached, staged and tracked state along.
    ///
    /// The shared cache entry of the old name is dropped on the next flush.
    pub fn change_field_name(
        &mut self,
        class_name: &str,
        field_name: &str,
        new_field_name: &str,
    ) -> Result<bool> {
        if !self
            .store
            .change_field_name(class_name, field_name, new_field_name)?
        {
            return Ok(false);
        }
        event::dispatch(self, &ConfigEvent::RenameField {
            class_name: class_name.to_string(),
            field_name: field_name.to_string(),
            new_field_name: new_field_name.to_string(),
        })?;

        for scope in self.scopes.names() {
            let old_id = ConfigId::field(scope.as_str(), class_name, field_name, None);
            let old_key = old_id.key();

            if let Some(cached) = self.cache.get_config(&old_id, true)? {
                let renamed = rename_field(cached, new_field_name);
                self.cache.save_config(&renamed, true)?;
            }
            if let Some(staged) = self.pending.get(&old_key).cloned() {
                self.pending
                    .replace(&old_key, rename_field(staged, new_field_name));
            }
            if let Some(original) = self.originals.remove(&old_key) {
                let renamed = rename_field(original, new_field_name);
                self.originals.insert(renamed.id().key(), renamed);
            }
            if let Some(change_set) = self.change_sets.remove(&old_key) {
                let new_key =
                    ConfigId::field(scope.as_str(), class_name, new_field_name, None).key();
                self.change_sets.insert(new_key, change_set);
            }
        }

        self.cache.delete_field_config(class_name, field_name, true)?;
        self.cache
            .save_configurable(false, class_name, Some(field_name), true)?;
        self.cache
            .save_configurable(true, class_name, Some(new_field_name), true)?;
        self.renamed_fields
            .push((class_name.to_string(), field_name.to_string()));

        tracing::info!(class = %class_name, from = %field_name, to = %new_field_name, "Renamed field");
        Ok(true)
    }

    /// Change the type of a field, retyping its cached and staged configs.
    pub fn change_field_type(
        &mut self,
        class_name: &str,
        field_name: &str,
        field_type: &str,
    ) -> Result<bool> {
        if !self
            .store
            .change_field_type(class_name, field_name, field_type)?
        {
            return Ok(false);
        }

        for scope in self.scopes.names() {
            let id = ConfigId::field(
                scope.as_str(),
                class_name,
                field_name,
                Some(field_type.to_string()),
            );
            if let Some(cached) = self.cache.get_config(&id, true)? {
                self.cache
                    .save_config(&Config::with_values(id.clone(), cached.into_values()), true)?;
            }
            if let Some(staged) = self.pending.get(&id.key()).cloned() {
                self.pending
                    .insert(Config::with_values(id, staged.into_values()));
            }
        }

        tracing::info!(class = %class_name, field = %field_name, %field_type, "Changed field type");
        Ok(true)
    }

    pub fn change_field_mode(
        &mut self,
        class_name: &str,
        field_name: &str,
        mode: ConfigMode,
    ) -> Result<bool> {
        let changed = self
            .store
            .change_field_mode(class_name, field_name, mode)?;
        if changed {
            self.cache.delete_all_configurable(true)?;
            tracing::info!(class = %class_name, field = %field_name, %mode, "Changed field mode");
        }
        Ok(changed)
    }

    pub fn change_entity_mode(&mut self, class_name: &str, mode: ConfigMode) -> Result<bool> {
        let changed = self.store.change_entity_mode(class_name, mode)?;
        if changed {
            self.cache.delete_all_configurable(true)?;
            tracing::info!(class = %class_name, %mode, "Changed entity mode");
        }
        Ok(changed)
    }

    // Cache control

    /// Drop the cached configs of one class or field, all scopes included.
    pub fn clear_cache(&mut self, id: &ConfigId) -> Result<()> {
        self.cache.delete_config(id, false)?;
        Ok(())
    }

    pub fn clear_cache_all(&mut self) -> Result<()> {
        self.cache.delete_all_configs(false)?;
        Ok(())
    }

    /// Forget configurable flags and the memoized schema check.
    pub fn clear_configurable_cache(&mut self) -> Result<()> {
        self.cache.delete_all_configurable(false)?;
        self.store.clear_check_database();
        Ok(())
    }

    /// Discard uncommitted model changes.
    pub fn clear_model_cache(&mut self) -> Result<()> {
        self.store.clear_cache()?;
        self.cache.delete_all_configurable(true)?;
        Ok(())
    }
}

fn rename_field(config: Config, new_field_name: &str) -> Config {
    let id = config.id();
    let renamed = ConfigId::field(
        id.scope(),
        id.class_name(),
        new_field_name,
        id.field_type().map(str::to_string),
    );
    Config::with_values(renamed, config.into_values())
}
