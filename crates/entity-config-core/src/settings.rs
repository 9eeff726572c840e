//! Settings file and manager bootstrap
//!
//! ```toml
//! scopes = ["scopes/entity.yml", "scopes/extend.yml"]
//!
//! [store]
//! path = "var/entity-config.json"
//!
//! [cache]
//! dir = "var/cache"
//!
//! [metadata]
//! path = "metadata.yml"
//! ```
//!
//! Relative paths resolve against the directory of the settings file.

use std::path::{Path, PathBuf};

use entity_config_cache::{CacheProvider, ConfigCache, FileCacheProvider, MemoryCacheProvider};
use entity_config_fs::DocumentStore;
use entity_config_meta::{PropertyConfigContainer, StaticMetadataSource};
use entity_config_model::FileModelStore;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::manager::ConfigManager;

/// Default settings file name
pub const DEFAULT_SETTINGS_FILE: &str = "entity-config.toml";

fn default_store_path() -> PathBuf {
    PathBuf::from("entity-config.store.json")
}

/// Durable store section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Shared cache section; no directory keeps the shared tier in memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// Entity metadata section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Settings of an entity config installation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityConfigSettings {
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub metadata: MetadataSettings,
    /// Scope definition files, registered in this order.
    #[serde(default)]
    pub scopes: Vec<PathBuf>,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl EntityConfigSettings {
    /// Load settings; relative paths resolve against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let mut settings: Self = DocumentStore::new().load(path)?;
        settings.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        tracing::debug!(path = %path.display(), "Loaded entity config settings");
        Ok(settings)
    }

    /// Settings resolving relative paths against `base_dir`.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn store_path(&self) -> PathBuf {
        self.resolve(&self.store.path)
    }

    pub fn cache_dir(&self) -> Option<PathBuf> {
        self.cache.dir.as_deref().map(|dir| self.resolve(dir))
    }

    pub fn metadata_path(&self) -> Option<PathBuf> {
        self.metadata.path.as_deref().map(|path| self.resolve(path))
    }

    pub fn scope_paths(&self) -> Vec<PathBuf> {
        self.scopes.iter().map(|path| self.resolve(path)).collect()
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn open_store(&self) -> Result<FileModelStore> {
        Ok(FileModelStore::open(self.store_path())?)
    }

    /// Config cache over the configured shared tier.
    pub fn open_cache(&self) -> Result<ConfigCache> {
        let (configs, flags): (Box<dyn CacheProvider>, Box<dyn CacheProvider>) =
            match self.cache_dir() {
                Some(dir) => (
                    Box::new(FileCacheProvider::create(dir.join("configs"))?),
                    Box::new(FileCacheProvider::create(dir.join("configurable"))?),
                ),
                None => (
                    Box::new(MemoryCacheProvider::new()),
                    Box::new(MemoryCacheProvider::new()),
                ),
            };
        Ok(ConfigCache::new(configs, flags))
    }

    pub fn load_metadata(&self) -> Result<StaticMetadataSource> {
        match self.metadata_path() {
            Some(path) => Ok(StaticMetadataSource::load(&path)?),
            None => Ok(StaticMetadataSource::new()),
        }
    }

    /// Manager over the file store, the configured cache and every scope.
    pub fn build_manager(&self) -> Result<ConfigManager> {
        let mut manager = ConfigManager::new(
            Box::new(self.load_metadata()?),
            Box::new(self.open_store()?),
            self.open_cache()?,
        );
        for path in self.scope_paths() {
            for (scope, properties) in PropertyConfigContainer::load_scopes(&path)? {
                manager.add_scope(scope, properties);
            }
        }
        tracing::debug!(scopes = manager.scopes().len(), "Built config manager");
        Ok(manager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_when_sections_are_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_SETTINGS_FILE);
        fs::write(&path, "").unwrap();

        let settings = EntityConfigSettings::load(&path).unwrap();

        assert_eq!(settings.store_path(), dir.path().join("entity-config.store.json"));
        assert_eq!(settings.cache_dir(), None);
        assert!(settings.scope_paths().is_empty());
    }

    #[test]
    fn relative_paths_resolve_against_settings_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            r#"
scopes = ["scopes/entity.yml"]

[store]
path = "var/models.json"

[cache]
dir = "var/cache"

[metadata]
path = "/etc/metadata.yml"
"#,
        )
        .unwrap();

        let settings = EntityConfigSettings::load(&path).unwrap();

        assert_eq!(settings.store_path(), dir.path().join("var/models.json"));
        assert_eq!(settings.cache_dir(), Some(dir.path().join("var/cache")));
        assert_eq!(settings.metadata_path(), Some(PathBuf::from("/etc/metadata.yml")));
        assert_eq!(settings.scope_paths(), vec![dir.path().join("scopes/entity.yml")]);
    }

    #[test]
    fn builds_manager_with_scopes_in_file_order() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("extend.json"),
            r#"{"extend": {"entity": {"items": {"owner": {"options": {"default_value": "System"}}}}}}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("entity.json"),
            r#"{"entity": {"entity": {"items": {"label": {"options": {"translatable": true}}}}}}"#,
        )
        .unwrap();

        let settings = EntityConfigSettings {
            scopes: vec!["extend.json".into(), "entity.json".into()],
            ..Default::default()
        }
        .with_base_dir(dir.path());

        let manager = settings.build_manager().unwrap();

        assert_eq!(manager.get_providers(), vec!["extend", "entity"]);
    }
}
