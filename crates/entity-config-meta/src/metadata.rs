//! Metadata descriptors of configurable classes
//!
//! A [`MetadataSource`] answers, per class, whether it takes configuration,
//! its mode and the default values it declares for each scope. Descriptors
//! are plain data computed ahead of time; [`StaticMetadataSource`] keeps
//! them in memory and can load them from a TOML, JSON or YAML file:
//!
//! ```toml
//! [[entities]]
//! name = 'Acme\DemoBundle\Entity\Contact'
//! mode = "default"
//!
//! [entities.default_values.entity]
//! label = "Contact"
//!
//! [[entities.fields]]
//! name = "email"
//! type = "string"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use entity_config_fs::DocumentStore;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::mode::ConfigMode;
use crate::value::Values;

fn default_true() -> bool {
    true
}

/// Descriptor of one field of a configurable class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMetadata {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub mode: ConfigMode,
    /// Declared default values per scope.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub default_values: BTreeMap<String, Values>,
}

impl FieldMetadata {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            mode: ConfigMode::Default,
            default_values: BTreeMap::new(),
        }
    }

    pub fn with_default_values(mut self, scope: impl Into<String>, values: Values) -> Self {
        self.default_values.insert(scope.into(), values);
        self
    }
}

/// Descriptor of a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMetadata {
    pub name: String,
    #[serde(default = "default_true")]
    pub configurable: bool,
    #[serde(default)]
    pub mode: ConfigMode,
    /// Declared default values per scope.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub default_values: BTreeMap<String, Values>,
    /// Mapped fields, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldMetadata>,
}

impl EntityMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            configurable: true,
            mode: ConfigMode::Default,
            default_values: BTreeMap::new(),
            fields: Vec::new(),
        }
    }

    pub fn with_default_values(mut self, scope: impl Into<String>, values: Values) -> Self {
        self.default_values.insert(scope.into(), values);
        self
    }

    pub fn with_field(mut self, field: FieldMetadata) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_mode(mut self, mode: ConfigMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn not_configurable(mut self) -> Self {
        self.configurable = false;
        self
    }

    pub fn field(&self, field_name: &str) -> Option<&FieldMetadata> {
        self.fields.iter().find(|f| f.name == field_name)
    }
}

/// Provides class descriptors to the config manager.
pub trait MetadataSource {
    /// Descriptor of `class_name`, `None` for unknown classes.
    fn metadata_for_class(&self, class_name: &str) -> Option<EntityMetadata>;

    /// Every class the source knows about, configurable or not.
    fn class_names(&self) -> Vec<String>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MetadataDocument {
    #[serde(default)]
    entities: Vec<EntityMetadata>,
}

/// In-memory metadata source.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadataSource {
    entities: BTreeMap<String, EntityMetadata>,
}

impl StaticMetadataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load descriptors from a metadata file.
    pub fn load(path: &Path) -> Result<Self> {
        let document: MetadataDocument = DocumentStore::new().load(path)?;
        tracing::debug!(
            path = %path.display(),
            classes = document.entities.len(),
            "Loaded entity metadata"
        );
        Ok(document.entities.into_iter().collect())
    }

    /// Write the descriptors to a metadata file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let document = MetadataDocument {
            entities: self.entities.values().cloned().collect(),
        };
        DocumentStore::new().save(path, &document)?;
        Ok(())
    }

    pub fn insert(&mut self, metadata: EntityMetadata) {
        self.entities.insert(metadata.name.clone(), metadata);
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl FromIterator<EntityMetadata> for StaticMetadataSource {
    fn from_iter<I: IntoIterator<Item = EntityMetadata>>(iter: I) -> Self {
        let mut source = Self::new();
        for metadata in iter {
            source.insert(metadata);
        }
        source
    }
}

impl MetadataSource for StaticMetadataSource {
    fn metadata_for_class(&self, class_name: &str) -> Option<EntityMetadata> {
        self.entities.get(class_name).cloned()
    }

    fn class_names(&self) -> Vec<String> {
        self.entities.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    const METADATA: &str = r#"
[[entities]]
name = 'Acme\DemoBundle\Entity\Contact'
mode = "hidden"

[entities.default_values.entity]
label = "Contact"

[[entities.fields]]
name = "email"
type = "string"

[entities.fields.default_values.datagrid]
is_visible = true

[[entities.fields]]
name = "owner"
type = "ref-one"

[[entities]]
name = 'Acme\DemoBundle\Entity\Log'
configurable = false
"#;

    #[test]
    fn loads_descriptors_from_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metadata.toml");
        std::fs::write(&path, METADATA).unwrap();

        let source = StaticMetadataSource::load(&path).unwrap();
        assert_eq!(source.len(), 2);

        let contact = source
            .metadata_for_class(r"Acme\DemoBundle\Entity\Contact")
            .unwrap();
        assert!(contact.configurable);
        assert_eq!(contact.mode, ConfigMode::Hidden);
        assert_eq!(contact.default_values["entity"]["label"], json!("Contact"));

        let names: Vec<_> = contact.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["email", "owner"]);
        let email = contact.field("email").unwrap();
        assert_eq!(email.field_type, "string");
        assert_eq!(email.default_values["datagrid"]["is_visible"], json!(true));

        let log = source
            .metadata_for_class(r"Acme\DemoBundle\Entity\Log")
            .unwrap();
        assert!(!log.configurable);
    }

    #[test]
    fn unknown_classes_have_no_metadata() {
        let source = StaticMetadataSource::new();
        assert!(source.metadata_for_class("SomeUndefinedClass").is_none());
    }

    #[test]
    fn saved_file_loads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metadata.json");
        let source: StaticMetadataSource = [EntityMetadata::new(r"Acme\Entity\Demo")
            .with_field(FieldMetadata::new("id", "integer"))]
        .into_iter()
        .collect();

        source.save(&path).unwrap();
        let loaded = StaticMetadataSource::load(&path).unwrap();

        assert_eq!(loaded.class_names(), vec![r"Acme\Entity\Demo".to_string()]);
    }
}
