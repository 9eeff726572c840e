//! Pre-population of the config cache

use std::collections::BTreeMap;

use entity_config_cache::CachedField;
use entity_config_meta::Values;
use entity_config_model::ConfigModel;

use crate::Result;
use crate::manager::ConfigManager;

/// Counts of what a warm-up wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarmUpStats {
    pub entities: usize,
    pub fields: usize,
    pub non_configurable: usize,
}

/// Fills the cache with every stored config and configurable flag.
///
/// Classes described by metadata but absent from the store are flagged not
/// configurable, together with their fields, unless a flag is already
/// cached for them.
pub struct ConfigCacheWarmer<'m> {
    manager: &'m mut ConfigManager,
}

impl<'m> ConfigCacheWarmer<'m> {
    pub fn new(manager: &'m mut ConfigManager) -> Self {
        Self { manager }
    }

    pub fn warm_up(&mut self) -> Result<WarmUpStats> {
        if !self.manager.check_database()? {
            tracing::warn!("Config storage is missing, skipping cache warm-up");
            return Ok(WarmUpStats::default());
        }

        let mut stats = self.load_configurable()?;
        stats.non_configurable = self.load_non_configurable()?;

        tracing::info!(
            entities = stats.entities,
            fields = stats.fields,
            non_configurable = stats.non_configurable,
            "Warmed up config cache"
        );
        Ok(stats)
    }

    fn load_configurable(&mut self) -> Result<WarmUpStats> {
        let empty: BTreeMap<String, Values> = self
            .manager
            .scopes()
            .names()
            .into_iter()
            .map(|scope| (scope, Values::new()))
            .collect();
        let with_empty_scopes = |model: &ConfigModel| {
            let mut data = empty.clone();
            for (scope, values) in model.data().all() {
                data.insert(scope.clone(), values.clone());
            }
            data
        };

        let mut stats = WarmUpStats::default();
        let mut entities = BTreeMap::new();
        for entity in self.manager.store().get_models(None, true)? {
            let class_name = entity.class_name().to_string();
            let data = with_empty_scopes(&entity);

            let cache = self.manager.cache_mut();
            cache.save_configurable(true, &class_name, None, false)?;
            cache.save_entity_config_values(data, &class_name)?;
            entities.insert(class_name.clone(), entity.mode().is_hidden());
            stats.entities += 1;

            let mut fields = BTreeMap::new();
            for field in self.manager.store().get_models(Some(&class_name), true)? {
                let (Some(field_name), Some(field_type)) = (field.field_name(), field.field_type())
                else {
                    continue;
                };
                let data = with_empty_scopes(&field);

                let cache = self.manager.cache_mut();
                cache.save_configurable(true, &class_name, Some(field_name), false)?;
                cache.save_field_config_values(data, &class_name, field_name, field_type)?;
                fields.insert(
                    field_name.to_string(),
                    CachedField {
                        field_type: field_type.to_string(),
                        hidden: field.mode().is_hidden(),
                    },
                );
                stats.fields += 1;
            }
            if !fields.is_empty() {
                self.manager.cache_mut().save_fields(&class_name, fields)?;
            }
        }
        self.manager.cache_mut().save_entities(entities)?;

        Ok(stats)
    }

    fn load_non_configurable(&mut self) -> Result<usize> {
        let cached = self
            .manager
            .cache_mut()
            .get_entities()?
            .unwrap_or_default();

        let mut count = 0;
        for class_name in self.manager.metadata_source().class_names() {
            if cached.contains_key(&class_name)
                || self
                    .manager
                    .cache_mut()
                    .get_configurable(&class_name, None)?
                    .is_some()
            {
                continue;
            }
            let field_names: Vec<String> = self
                .manager
                .metadata_source()
                .metadata_for_class(&class_name)
                .map(|metadata| metadata.fields.into_iter().map(|f| f.name).collect())
                .unwrap_or_default();

            let cache = self.manager.cache_mut();
            cache.save_configurable(false, &class_name, None, false)?;
            for field_name in &field_names {
                cache.save_configurable(false, &class_name, Some(field_name), false)?;
            }
            tracing::debug!(class = %class_name, "Flagged class as not configurable");
            count += 1;
        }
        Ok(count)
    }
}
