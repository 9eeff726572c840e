//! Durable config models of entities and fields

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use entity_config_meta::{ConfigMode, Values, index_string};
use serde::{Deserialize, Serialize};

/// A scoped value materialized for queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedValue {
    pub scope: String,
    pub code: String,
    pub value: String,
}

/// Per-scope values of a model plus their indexed side table.
///
/// An index entry exists iff its code was indexed when last written and the
/// value is still stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopedData {
    #[serde(default)]
    data: BTreeMap<String, Values>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    indexed_values: Vec<IndexedValue>,
}

impl ScopedData {
    /// Replace the values of `scope`.
    ///
    /// Codes in `values` are written and added to or removed from the index
    /// per `indexed`. Stored codes missing from `values`, or null there, are
    /// dropped together with their index entry. An emptied scope is removed.
    pub fn from_array(&mut self, scope: &str, values: &Values, indexed: &BTreeSet<String>) {
        let mut stored = self.data.remove(scope).unwrap_or_default();

        for (code, value) in values {
            stored.insert(code.clone(), value.clone());
            if indexed.contains(code) {
                self.add_to_index(scope, code, &index_string(value));
            } else {
                self.remove_from_index(scope, code);
            }
        }

        let obsolete: Vec<String> = stored
            .keys()
            .filter(|code| values.get(*code).is_none_or(|v| v.is_null()))
            .cloned()
            .collect();
        for code in obsolete {
            stored.shift_remove(&code);
            self.remove_from_index(scope, &code);
        }

        if !stored.is_empty() {
            self.data.insert(scope.to_string(), stored);
        }
    }

    /// Values of `scope`, empty when the scope holds nothing.
    pub fn to_array(&self, scope: &str) -> Values {
        self.data.get(scope).cloned().unwrap_or_default()
    }

    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn all(&self) -> &BTreeMap<String, Values> {
        &self.data
    }

    pub fn indexed_values(&self) -> &[IndexedValue] {
        &self.indexed_values
    }

    pub fn indexed_value(&self, scope: &str, code: &str) -> Option<&str> {
        self.indexed_values
            .iter()
            .find(|iv| iv.scope == scope && iv.code == code)
            .map(|iv| iv.value.as_str())
    }

    fn add_to_index(&mut self, scope: &str, code: &str, value: &str) {
        match self
            .indexed_values
            .iter_mut()
            .find(|iv| iv.scope == scope && iv.code == code)
        {
            Some(existing) => {
                if existing.value != value {
                    existing.value = value.to_string();
                }
            }
            None => self.indexed_values.push(IndexedValue {
                scope: scope.to_string(),
                code: code.to_string(),
                value: value.to_string(),
            }),
        }
    }

    fn remove_from_index(&mut self, scope: &str, code: &str) {
        self.indexed_values
            .retain(|iv| !(iv.scope == scope && iv.code == code));
    }
}

/// Durable record of a configurable class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityConfigModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub class_name: String,
    #[serde(default)]
    pub mode: ConfigMode,
    #[serde(flatten)]
    pub data: ScopedData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

impl EntityConfigModel {
    pub fn new(class_name: impl Into<String>, mode: ConfigMode) -> Self {
        Self {
            id: None,
            class_name: class_name.into(),
            mode,
            data: ScopedData::default(),
            created: None,
            updated: None,
        }
    }
}

/// Durable record of a field; owned by the entity model of `entity_class`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfigModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub entity_class: String,
    pub field_name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub mode: ConfigMode,
    #[serde(flatten)]
    pub data: ScopedData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

impl FieldConfigModel {
    pub fn new(
        entity_class: impl Into<String>,
        field_name: impl Into<String>,
        field_type: impl Into<String>,
        mode: ConfigMode,
    ) -> Self {
        Self {
            id: None,
            entity_class: entity_class.into(),
            field_name: field_name.into(),
            field_type: field_type.into(),
            mode,
            data: ScopedData::default(),
            created: None,
            updated: None,
        }
    }
}

/// Either kind of durable model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigModel {
    Entity(EntityConfigModel),
    Field(FieldConfigModel),
}

impl ConfigModel {
    pub fn id(&self) -> Option<u64> {
        match self {
            Self::Entity(m) => m.id,
            Self::Field(m) => m.id,
        }
    }

    pub fn class_name(&self) -> &str {
        match self {
            Self::Entity(m) => &m.class_name,
            Self::Field(m) => &m.entity_class,
        }
    }

    pub fn field_name(&self) -> Option<&str> {
        match self {
            Self::Entity(_) => None,
            Self::Field(m) => Some(&m.field_name),
        }
    }

    pub fn field_type(&self) -> Option<&str> {
        match self {
            Self::Entity(_) => None,
            Self::Field(m) => Some(&m.field_type),
        }
    }

    pub fn mode(&self) -> ConfigMode {
        match self {
            Self::Entity(m) => m.mode,
            Self::Field(m) => m.mode,
        }
    }

    /// `className[.fieldName]`
    pub fn model_key(&self) -> String {
        match self {
            Self::Entity(m) => m.class_name.clone(),
            Self::Field(m) => format!("{}.{}", m.entity_class, m.field_name),
        }
    }

    pub fn data(&self) -> &ScopedData {
        match self {
            Self::Entity(m) => &m.data,
            Self::Field(m) => &m.data,
        }
    }

    pub fn data_mut(&mut self) -> &mut ScopedData {
        match self {
            Self::Entity(m) => &mut m.data,
            Self::Field(m) => &mut m.data,
        }
    }

    pub fn to_array(&self, scope: &str) -> Values {
        self.data().to_array(scope)
    }

    pub fn from_array(&mut self, scope: &str, values: &Values, indexed: &BTreeSet<String>) {
        self.data_mut().from_array(scope, values, indexed);
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Entity(m) => m.created,
            Self::Field(m) => m.created,
        }
    }

    pub fn set_created(&mut self, at: DateTime<Utc>) {
        match self {
            Self::Entity(m) => m.created = Some(at),
            Self::Field(m) => m.created = Some(at),
        }
    }

    pub fn set_updated(&mut self, at: DateTime<Utc>) {
        match self {
            Self::Entity(m) => m.updated = Some(at),
            Self::Field(m) => m.updated = Some(at),
        }
    }
}

impl From<EntityConfigModel> for ConfigModel {
    fn from(model: EntityConfigModel) -> Self {
        Self::Entity(model)
    }
}

impl From<FieldConfigModel> for ConfigModel {
    fn from(model: FieldConfigModel) -> Self {
        Self::Field(model)
    }
}
