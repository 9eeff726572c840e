//! Model store persisted as one JSON document

use std::path::{Path, PathBuf};

use entity_config_fs::DocumentStore;
use entity_config_meta::ConfigMode;

use crate::model::{ConfigModel, EntityConfigModel, FieldConfigModel};
use crate::store::{ConfigModelStore, ModelDocument};
use crate::{Error, Result};

/// Store backed by a JSON file.
///
/// The schema counts as ready iff the file exists. Every
/// [`save`](ConfigModelStore::save) rewrites the whole document atomically
/// under an exclusive lock.
#[derive(Debug)]
pub struct FileModelStore {
    path: PathBuf,
    documents: DocumentStore,
    working: ModelDocument,
    checked: Option<bool>,
}

impl FileModelStore {
    /// Open the store at `path`, loading it when the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let documents = DocumentStore::new();
        let working = documents.load_optional(&path)?.unwrap_or_default();
        tracing::debug!(path = %path.display(), "Opened model store");
        Ok(Self {
            path,
            documents,
            working,
            checked: None,
        })
    }

    /// Create the store file if it does not exist yet.
    ///
    /// Returns `true` when a file was created.
    pub fn initialize(&mut self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        self.documents.save(&self.path, &ModelDocument::default())?;
        self.working = ModelDocument::default();
        self.checked = None;
        tracing::info!(path = %self.path.display(), "Initialized model store");
        Ok(true)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigModelStore for FileModelStore {
    fn check_database(&mut self) -> Result<bool> {
        let path = &self.path;
        Ok(*self.checked.get_or_insert_with(|| path.exists()))
    }

    fn clear_check_database(&mut self) {
        self.checked = None;
    }

    fn find_entity_model(&self, class_name: &str) -> Result<Option<EntityConfigModel>> {
        Ok(self.working.find_entity(class_name).cloned())
    }

    fn find_field_model(
        &self,
        class_name: &str,
        field_name: &str,
    ) -> Result<Option<FieldConfigModel>> {
        Ok(self.working.find_field(class_name, field_name).cloned())
    }

    fn create_entity_model(
        &mut self,
        class_name: Option<&str>,
        mode: ConfigMode,
    ) -> Result<EntityConfigModel> {
        self.working.create_entity(class_name, mode)
    }

    fn create_field_model(
        &mut self,
        class_name: &str,
        field_name: &str,
        field_type: &str,
        mode: ConfigMode,
    ) -> Result<FieldConfigModel> {
        self.working
            .create_field(class_name, field_name, field_type, mode)
    }

    fn get_models(&self, class_name: Option<&str>, with_hidden: bool) -> Result<Vec<ConfigModel>> {
        Ok(self.working.models(class_name, with_hidden))
    }

    fn change_field_name(
        &mut self,
        class_name: &str,
        field_name: &str,
        new_field_name: &str,
    ) -> Result<bool> {
        Ok(self
            .working
            .rename_field(class_name, field_name, new_field_name))
    }

    fn change_field_type(
        &mut self,
        class_name: &str,
        field_name: &str,
        field_type: &str,
    ) -> Result<bool> {
        Ok(self
            .working
            .change_field_type(class_name, field_name, field_type))
    }

    fn change_field_mode(
        &mut self,
        class_name: &str,
        field_name: &str,
        mode: ConfigMode,
    ) -> Result<bool> {
        Ok(self.working.change_field_mode(class_name, field_name, mode))
    }

    fn change_entity_mode(&mut self, class_name: &str, mode: ConfigMode) -> Result<bool> {
        Ok(self.working.change_entity_mode(class_name, mode))
    }

    fn save(&mut self, models: Vec<ConfigModel>) -> Result<Vec<ConfigModel>> {
        if !self.path.exists() {
            return Err(Error::NotInitialized {
                path: self.path.clone(),
            });
        }

        let mut next = self.working.clone();
        let saved = next.save(models);
        self.documents.save(&self.path, &next)?;
        self.working = next;

        tracing::debug!(path = %self.path.display(), models = saved.len(), "Saved config models");
        Ok(saved)
    }

    fn clear_cache(&mut self) -> Result<()> {
        self.working = self.documents.load_optional(&self.path)?.unwrap_or_default();
        Ok(())
    }
}
