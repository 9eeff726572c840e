//! Scope-bound façade over the config manager

use entity_config_meta::{Config, ConfigId, PropertyConfigContainer, real_class_name};

use crate::manager::ConfigManager;
use crate::{Error, Result};

/// An object whose class takes configuration.
pub trait ConfigurableObject {
    fn class_name(&self) -> &str;
}

/// A collection whose elements share one class.
pub trait EntityCollection {
    fn element_class(&self) -> &str;
}

/// Anything a class name can be resolved from.
#[derive(Clone, Copy)]
pub enum ClassInput<'a> {
    Name(&'a str),
    Object(&'a dyn ConfigurableObject),
    Collection(&'a dyn EntityCollection),
    Objects(&'a [&'a dyn ConfigurableObject]),
    /// Input of another kind, described by its type name.
    Other(&'a str),
}

impl<'a> From<&'a str> for ClassInput<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a String> for ClassInput<'a> {
    fn from(name: &'a String) -> Self {
        Self::Name(name)
    }
}

impl std::fmt::Debug for ClassInput<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name(name) => f.debug_tuple("Name").field(name).finish(),
            Self::Object(object) => f.debug_tuple("Object").field(&object.class_name()).finish(),
            Self::Collection(collection) => f
                .debug_tuple("Collection")
                .field(&collection.element_class())
                .finish(),
            Self::Objects(objects) => f.debug_tuple("Objects").field(&objects.len()).finish(),
            Self::Other(kind) => f.debug_tuple("Other").field(kind).finish(),
        }
    }
}

/// Resolve the real class name of `input`; proxy prefixes are stripped.
pub fn get_class_name(input: ClassInput<'_>) -> Result<String> {
    let class_name = match input {
        ClassInput::Name(name) => name,
        ClassInput::Object(object) => object.class_name(),
        ClassInput::Collection(collection) => collection.element_class(),
        ClassInput::Objects(objects) => match objects.first() {
            Some(first) => first.class_name(),
            None => return Err(unresolvable("empty list")),
        },
        ClassInput::Other(kind) => return Err(unresolvable(kind)),
    };
    Ok(real_class_name(class_name).to_string())
}

fn unresolvable(given: &str) -> Error {
    Error::InvalidInput {
        message: format!(
            "class name expects an object, a collection, a list of entities or a string, \"{given}\" given"
        ),
    }
}

/// Config access bound to one scope.
///
/// Every call resolves its class input first, then delegates to the
/// manager with the provider's scope.
pub struct ConfigProvider<'m> {
    manager: &'m mut ConfigManager,
    scope: String,
}

impl<'m> ConfigProvider<'m> {
    pub(crate) fn new(manager: &'m mut ConfigManager, scope: &str) -> Self {
        Self {
            manager,
            scope: scope.to_string(),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn property_config(&self) -> Result<&PropertyConfigContainer> {
        self.manager.properties(&self.scope)
    }

    pub fn manager(&mut self) -> &mut ConfigManager {
        self.manager
    }

    /// Identifier in this scope; a field type not given is looked up.
    pub fn get_id(
        &mut self,
        class: Option<ClassInput<'_>>,
        field_name: Option<&str>,
        field_type: Option<&str>,
    ) -> Result<ConfigId> {
        let class_name = resolve(class)?;
        match (field_name.filter(|f| !f.is_empty()), field_type) {
            (Some(field), Some(field_type)) => Ok(ConfigId::field(
                self.scope.as_str(),
                class_name,
                field,
                Some(field_type.to_string()),
            )),
            (Some(field), None) => self.manager.get_id(&self.scope, &class_name, Some(field)),
            (None, _) => Ok(ConfigId::entity(self.scope.as_str(), class_name)),
        }
    }

    pub fn has_config(&mut self, class: ClassInput<'_>, field_name: Option<&str>) -> Result<bool> {
        let class_name = get_class_name(class)?;
        self.manager.has_config(&class_name, field_name)
    }

    pub fn has_config_by_id(&mut self, id: &ConfigId) -> Result<bool> {
        self.manager.has_config(id.class_name(), id.field_name())
    }

    /// Config of a class or field; a blank class gives a fresh config.
    pub fn get_config(
        &mut self,
        class: Option<ClassInput<'_>>,
        field_name: Option<&str>,
    ) -> Result<Config> {
        let class_name = resolve(class)?;
        match field_name.filter(|f| !f.is_empty()) {
            Some(field) => self
                .manager
                .get_field_config(&self.scope, &class_name, field),
            None if class_name.is_empty() => self.manager.create_entity_config(&self.scope),
            None => self.manager.get_entity_config(&self.scope, &class_name),
        }
    }

    /// Config of the class or field `id` names, read in this scope.
    pub fn get_config_by_id(&mut self, id: &ConfigId) -> Result<Config> {
        match id.field_name() {
            Some(field) => self
                .manager
                .get_field_config(&self.scope, id.class_name(), field),
            None if id.class_name().is_empty() => self.manager.create_entity_config(&self.scope),
            None => self.manager.get_entity_config(&self.scope, id.class_name()),
        }
    }

    pub fn get_ids(&mut self, class: Option<ClassInput<'_>>, with_hidden: bool) -> Result<Vec<ConfigId>> {
        let class_name = resolve(class)?;
        let class_name = Some(class_name.as_str()).filter(|c| !c.is_empty());
        self.manager.get_ids(&self.scope, class_name, with_hidden)
    }

    pub fn get_configs(&mut self, class: Option<ClassInput<'_>>, with_hidden: bool) -> Result<Vec<Config>> {
        let class_name = resolve(class)?;
        let class_name = Some(class_name.as_str()).filter(|c| !c.is_empty());
        self.manager
            .get_configs(&self.scope, class_name, with_hidden)
    }

    pub fn map<T, F>(&mut self, f: F, class: Option<ClassInput<'_>>, with_hidden: bool) -> Result<Vec<T>>
    where
        F: FnMut(Config) -> T,
    {
        Ok(self
            .get_configs(class, with_hidden)?
            .into_iter()
            .map(f)
            .collect())
    }

    pub fn filter<F>(
        &mut self,
        mut f: F,
        class: Option<ClassInput<'_>>,
        with_hidden: bool,
    ) -> Result<Vec<Config>>
    where
        F: FnMut(&Config) -> bool,
    {
        Ok(self
            .get_configs(class, with_hidden)?
            .into_iter()
            .filter(|config| f(config))
            .collect())
    }

    pub fn clear_cache(&mut self, class: ClassInput<'_>, field_name: Option<&str>) -> Result<()> {
        let id = self.get_id(Some(class), field_name, None)?;
        self.manager.clear_cache(&id)
    }

    pub fn persist(&mut self, config: Config) {
        self.manager.persist(config);
    }

    pub fn merge(&mut self, config: Config) -> Config {
        self.manager.merge(config)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.manager.flush()
    }
}

fn resolve(class: Option<ClassInput<'_>>) -> Result<String> {
    match class {
        Some(input) => get_class_name(input),
        None => Ok(String::new()),
    }
}
