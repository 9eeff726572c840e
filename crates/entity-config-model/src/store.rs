//! Durable model store contract and the in-memory store

use entity_config_meta::ConfigMode;
use serde::{Deserialize, Serialize};

use crate::model::{ConfigModel, EntityConfigModel, FieldConfigModel};
use crate::{Error, Result};

/// Resolves, creates and persists durable config models.
///
/// Mutations are visible to later lookups immediately and become durable on
/// [`save`](ConfigModelStore::save). [`clear_cache`](ConfigModelStore::clear_cache)
/// discards whatever has not been saved.
pub trait ConfigModelStore {
    /// Whether the backing schema exists. Memoized until
    /// [`clear_check_database`](ConfigModelStore::clear_check_database).
    fn check_database(&mut self) -> Result<bool>;

    fn clear_check_database(&mut self);

    fn find_entity_model(&self, class_name: &str) -> Result<Option<EntityConfigModel>>;

    fn find_field_model(&self, class_name: &str, field_name: &str)
    -> Result<Option<FieldConfigModel>>;

    fn get_entity_model(&self, class_name: &str) -> Result<EntityConfigModel> {
        self.find_entity_model(class_name)?
            .ok_or_else(|| Error::entity_not_found(class_name))
    }

    fn get_field_model(&self, class_name: &str, field_name: &str) -> Result<FieldConfigModel> {
        self.find_field_model(class_name, field_name)?
            .ok_or_else(|| Error::field_not_found(class_name, field_name))
    }

    /// Create an entity model; `None` creates one for a not-yet-named entity.
    fn create_entity_model(
        &mut self,
        class_name: Option<&str>,
        mode: ConfigMode,
    ) -> Result<EntityConfigModel>;

    fn create_field_model(
        &mut self,
        class_name: &str,
        field_name: &str,
        field_type: &str,
        mode: ConfigMode,
    ) -> Result<FieldConfigModel>;

    /// Entity models when `class_name` is `None`, otherwise the field models
    /// of that class. Hidden models are skipped unless `with_hidden`.
    fn get_models(&self, class_name: Option<&str>, with_hidden: bool) -> Result<Vec<ConfigModel>>;

    fn change_field_name(
        &mut self,
        class_name: &str,
        field_name: &str,
        new_field_name: &str,
    ) -> Result<bool>;

    fn change_field_type(
        &mut self,
        class_name: &str,
        field_name: &str,
        field_type: &str,
    ) -> Result<bool>;

    fn change_field_mode(&mut self, class_name: &str, field_name: &str, mode: ConfigMode)
    -> Result<bool>;

    fn change_entity_mode(&mut self, class_name: &str, mode: ConfigMode) -> Result<bool>;

    /// Write `models` and commit every pending change in one transaction.
    ///
    /// Returns the models as stored, with ids assigned.
    fn save(&mut self, models: Vec<ConfigModel>) -> Result<Vec<ConfigModel>>;

    /// Discard unsaved changes and any memoized lookups.
    fn clear_cache(&mut self) -> Result<()>;
}

/// The full set of models, as held in memory and written to disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDocument {
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    entities: Vec<EntityConfigModel>,
    #[serde(default)]
    fields: Vec<FieldConfigModel>,
}

impl ModelDocument {
    pub fn find_entity(&self, class_name: &str) -> Option<&EntityConfigModel> {
        if class_name.is_empty() {
            return None;
        }
        self.entities.iter().find(|m| m.class_name == class_name)
    }

    pub fn find_field(&self, class_name: &str, field_name: &str) -> Option<&FieldConfigModel> {
        self.fields
            .iter()
            .find(|m| m.entity_class == class_name && m.field_name == field_name)
    }

    fn find_field_mut(&mut self, class_name: &str, field_name: &str) -> Option<&mut FieldConfigModel> {
        self.fields
            .iter_mut()
            .find(|m| m.entity_class == class_name && m.field_name == field_name)
    }

    pub fn create_entity(
        &mut self,
        class_name: Option<&str>,
        mode: ConfigMode,
    ) -> Result<EntityConfigModel> {
        let class_name = class_name.unwrap_or_default();
        let model = EntityConfigModel::new(class_name, mode);
        // Unnamed models stay transient until they get a class name
        if class_name.is_empty() {
            return Ok(model);
        }
        if self.find_entity(class_name).is_some() {
            return Err(Error::DuplicateModel {
                key: class_name.to_string(),
            });
        }

        self.entities.push(model.clone());
        tracing::debug!(class = %class_name, %mode, "Created entity config model");
        Ok(model)
    }

    pub fn create_field(
        &mut self,
        class_name: &str,
        field_name: &str,
        field_type: &str,
        mode: ConfigMode,
    ) -> Result<FieldConfigModel> {
        if self.find_entity(class_name).is_none() {
            return Err(Error::entity_not_found(class_name));
        }
        if self.find_field(class_name, field_name).is_some() {
            return Err(Error::DuplicateModel {
                key: format!("{class_name}.{field_name}"),
            });
        }

        let model = FieldConfigModel::new(class_name, field_name, field_type, mode);
        self.fields.push(model.clone());
        tracing::debug!(class = %class_name, field = %field_name, %field_type, "Created field config model");
        Ok(model)
    }

    pub fn models(&self, class_name: Option<&str>, with_hidden: bool) -> Vec<ConfigModel> {
        let visible = |mode: ConfigMode| with_hidden || !mode.is_hidden();
        match class_name {
            None => self
                .entities
                .iter()
                .filter(|m| !m.class_name.is_empty() && visible(m.mode))
                .cloned()
                .map(ConfigModel::from)
                .collect(),
            Some(class_name) => self
                .fields
                .iter()
                .filter(|m| m.entity_class == class_name && visible(m.mode))
                .cloned()
                .map(ConfigModel::from)
                .collect(),
        }
    }

    pub fn rename_field(&mut self, class_name: &str, field_name: &str, new_field_name: &str) -> bool {
        if field_name == new_field_name || self.find_field(class_name, new_field_name).is_some() {
            return false;
        }
        match self.find_field_mut(class_name, field_name) {
            Some(model) => {
                model.field_name = new_field_name.to_string();
                true
            }
            None => false,
        }
    }

    pub fn change_field_type(&mut self, class_name: &str, field_name: &str, field_type: &str) -> bool {
        match self.find_field_mut(class_name, field_name) {
            Some(model) if model.field_type != field_type => {
                model.field_type = field_type.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn change_field_mode(&mut self, class_name: &str, field_name: &str, mode: ConfigMode) -> bool {
        match self.find_field_mut(class_name, field_name) {
            Some(model) if model.mode != mode => {
                model.mode = mode;
                true
            }
            _ => false,
        }
    }

    pub fn change_entity_mode(&mut self, class_name: &str, mode: ConfigMode) -> bool {
        match self
            .entities
            .iter_mut()
            .find(|m| !class_name.is_empty() && m.class_name == class_name)
        {
            Some(model) if model.mode != mode => {
                model.mode = mode;
                true
            }
            _ => false,
        }
    }

    /// Upsert `models`, then give every model lacking one an id.
    pub fn save(&mut self, models: Vec<ConfigModel>) -> Vec<ConfigModel> {
        let mut touched = Vec::with_capacity(models.len());
        for model in models {
            touched.push(self.upsert(model));
        }

        for entity in self.entities.iter_mut().filter(|m| m.id.is_none()) {
            self.next_id += 1;
            entity.id = Some(self.next_id);
        }
        for field in self.fields.iter_mut().filter(|m| m.id.is_none()) {
            self.next_id += 1;
            field.id = Some(self.next_id);
        }

        touched
            .into_iter()
            .filter_map(|slot| match slot {
                Slot::Entity(i) => self.entities.get(i).cloned().map(ConfigModel::from),
                Slot::Field(i) => self.fields.get(i).cloned().map(ConfigModel::from),
            })
            .collect()
    }

    fn upsert(&mut self, model: ConfigModel) -> Slot {
        match model {
            ConfigModel::Entity(model) => {
                let position = self.entities.iter().position(|m| match model.id {
                    Some(id) => m.id == Some(id),
                    None => !model.class_name.is_empty() && m.class_name == model.class_name,
                });
                match position {
                    Some(i) => {
                        let id = self.entities[i].id;
                        self.entities[i] = EntityConfigModel { id, ..model };
                        Slot::Entity(i)
                    }
                    None => {
                        self.entities.push(model);
                        Slot::Entity(self.entities.len() - 1)
                    }
                }
            }
            ConfigModel::Field(model) => {
                let position = self.fields.iter().position(|m| match model.id {
                    Some(id) => m.id == Some(id),
                    None => m.entity_class == model.entity_class && m.field_name == model.field_name,
                });
                match position {
                    Some(i) => {
                        let id = self.fields[i].id;
                        self.fields[i] = FieldConfigModel { id, ..model };
                        Slot::Field(i)
                    }
                    None => {
                        self.fields.push(model);
                        Slot::Field(self.fields.len() - 1)
                    }
                }
            }
        }
    }
}

enum Slot {
    Entity(usize),
    Field(usize),
}

/// Store keeping committed and working copies in memory.
///
/// Useful as a unit-of-work stand-in for a database: [`save`](ConfigModelStore::save)
/// commits the working copy, [`clear_cache`](ConfigModelStore::clear_cache)
/// rolls it back.
#[derive(Debug, Clone)]
pub struct InMemoryModelStore {
    committed: ModelDocument,
    working: ModelDocument,
    schema_ready: bool,
    checked: Option<bool>,
}

impl Default for InMemoryModelStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryModelStore {
    pub fn new() -> Self {
        Self {
            committed: ModelDocument::default(),
            working: ModelDocument::default(),
            schema_ready: true,
            checked: None,
        }
    }

    /// Simulate a missing (`false`) or present (`true`) schema.
    pub fn set_schema_ready(&mut self, ready: bool) {
        self.schema_ready = ready;
    }

    /// The last committed state.
    pub fn committed(&self) -> &ModelDocument {
        &self.committed
    }
}

impl ConfigModelStore for InMemoryModelStore {
    fn check_database(&mut self) -> Result<bool> {
        Ok(*self.checked.get_or_insert(self.schema_ready))
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
        let saved = self.working.save(models);
        self.committed = self.working.clone();
        Ok(saved)
    }

    fn clear_cache(&mut self) -> Result<()> {
        self.working = self.committed.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CLASS: &str = r"Acme\DemoBundle\Entity\Contact";

    fn store_with_contact() -> InMemoryModelStore {
        let mut store = InMemoryModelStore::new();
        store
            .create_entity_model(Some(CLASS), ConfigMode::Default)
            .unwrap();
        store
            .create_field_model(CLASS, "email", "string", ConfigMode::Default)
            .unwrap();
        store
            .create_field_model(CLASS, "secret", "string", ConfigMode::Hidden)
            .unwrap();
        store
    }

    #[test]
    fn created_models_are_visible_before_save() {
        let store = store_with_contact();

        assert!(store.find_entity_model(CLASS).unwrap().is_some());
        assert!(store.find_field_model(CLASS, "email").unwrap().is_some());
        assert!(store.committed().find_entity(CLASS).is_none());
    }

    #[test]
    fn save_assigns_ids_and_commits() {
        let mut store = store_with_contact();
        let entity = store.get_entity_model(CLASS).unwrap();

        let saved = store.save(vec![entity.into()]).unwrap();

        assert_eq!(saved.len(), 1);
        assert!(saved[0].id().is_some());
        assert!(store.get_field_model(CLASS, "email").unwrap().id.is_some());
        assert!(store.committed().find_field(CLASS, "email").is_some());
    }

    #[test]
    fn clear_cache_rolls_back_unsaved_changes() {
        let mut store = store_with_contact();
        store.save(Vec::new()).unwrap();
        store
            .create_field_model(CLASS, "phone", "string", ConfigMode::Default)
            .unwrap();

        store.clear_cache().unwrap();

        assert!(store.find_field_model(CLASS, "phone").unwrap().is_none());
        assert!(store.find_field_model(CLASS, "email").unwrap().is_some());
    }

    #[test]
    fn field_models_need_an_entity_model() {
        let mut store = InMemoryModelStore::new();
        let result = store.create_field_model(CLASS, "email", "string", ConfigMode::Default);
        assert!(matches!(result, Err(Error::ModelNotFound { .. })));
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut store = store_with_contact();
        assert!(matches!(
            store.create_entity_model(Some(CLASS), ConfigMode::Default),
            Err(Error::DuplicateModel { .. })
        ));
    }

    #[test]
    fn unnamed_entities_never_collide() {
        let mut store = InMemoryModelStore::new();
        store.create_entity_model(None, ConfigMode::Default).unwrap();
        store.create_entity_model(None, ConfigMode::Default).unwrap();

        assert!(store.find_entity_model("").unwrap().is_none());
        assert!(store.get_models(None, true).unwrap().is_empty());
    }

    #[test]
    fn get_models_skips_hidden_unless_asked() {
        let store = store_with_contact();

        let visible: Vec<_> = store
            .get_models(Some(CLASS), false)
            .unwrap()
            .iter()
            .map(|m| m.model_key())
            .collect();
        assert_eq!(visible, vec![format!("{CLASS}.email")]);
        assert_eq!(store.get_models(Some(CLASS), true).unwrap().len(), 2);
        assert_eq!(store.get_models(None, false).unwrap().len(), 1);
    }

    #[test]
    fn rename_refuses_taken_names() {
        let mut store = store_with_contact();

        assert!(!store.change_field_name(CLASS, "email", "secret").unwrap());
        assert!(!store.change_field_name(CLASS, "missing", "other").unwrap());
        assert!(store.change_field_name(CLASS, "email", "mail").unwrap());
        assert!(store.find_field_model(CLASS, "mail").unwrap().is_some());
        assert!(store.find_field_model(CLASS, "email").unwrap().is_none());
    }

    #[test]
    fn mode_and_type_changes_report_whether_anything_changed() {
        let mut store = store_with_contact();

        assert!(store.change_field_type(CLASS, "email", "text").unwrap());
        assert!(!store.change_field_type(CLASS, "email", "text").unwrap());
        assert!(store.change_field_mode(CLASS, "email", ConfigMode::Readonly).unwrap());
        assert!(store.change_entity_mode(CLASS, ConfigMode::Hidden).unwrap());
        assert!(!store.change_entity_mode(CLASS, ConfigMode::Hidden).unwrap());
        assert!(store.get_models(None, false).unwrap().is_empty());
    }

    #[test]
    fn schema_check_is_memoized_until_cleared() {
        let mut store = InMemoryModelStore::new();
        assert!(store.check_database().unwrap());

        store.set_schema_ready(false);
        assert!(store.check_database().unwrap());

        store.clear_check_database();
        assert!(!store.check_database().unwrap());
    }
}
