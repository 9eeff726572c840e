//! Declarative property rules of a config scope
//!
//! A scope definition file maps scope names to their rules:
//!
//! ```yaml
//! datagrid:
//!   field:
//!     items:
//!       is_visible:
//!         options:
//!           default_value: true
//!           indexed: true
//!           allowed_type: [string, integer]
//!         grid: { type: boolean }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use entity_config_fs::DocumentStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;
use crate::value::Values;

/// Level a property applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    Entity,
    Field,
}

/// Rule options of one property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub translatable: bool,
    #[serde(default)]
    pub indexed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auditable: Option<bool>,
    /// Field types the property applies to; all types when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_type: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_property: Option<Value>,
}

impl PropertyOptions {
    pub fn allows(&self, field_type: Option<&str>) -> bool {
        match (field_type, &self.allowed_type) {
            (Some(field_type), Some(allowed)) => allowed.iter().any(|t| t == field_type),
            _ => true,
        }
    }
}

/// One property of a scope, with its UI descriptors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyItem {
    #[serde(default)]
    pub options: PropertyOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct PropertySection {
    #[serde(default)]
    items: BTreeMap<String, PropertyItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    grid_action: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    layout_action: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    form: Option<Value>,
}

/// Property rules of one scope, for entity and field level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyConfigContainer {
    #[serde(default)]
    entity: PropertySection,
    #[serde(default)]
    field: PropertySection,
}

impl PropertyConfigContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every scope of a scope definition file.
    pub fn load_scopes(path: &Path) -> Result<BTreeMap<String, PropertyConfigContainer>> {
        let scopes: BTreeMap<String, PropertyConfigContainer> = DocumentStore::new().load(path)?;
        tracing::debug!(path = %path.display(), scopes = scopes.len(), "Loaded scope definitions");
        Ok(scopes)
    }

    /// Add or replace a property.
    pub fn with_item(
        mut self,
        property_type: PropertyType,
        code: impl Into<String>,
        options: PropertyOptions,
    ) -> Self {
        self.section_mut(property_type).items.insert(
            code.into(),
            PropertyItem {
                options,
                ..PropertyItem::default()
            },
        );
        self
    }

    pub fn items(&self, property_type: PropertyType) -> &BTreeMap<String, PropertyItem> {
        &self.section(property_type).items
    }

    /// Declared default values, skipping properties not allowed for `field_type`.
    pub fn default_values(&self, property_type: PropertyType, field_type: Option<&str>) -> Values {
        self.items(property_type)
            .iter()
            .filter(|(_, item)| item.options.allows(field_type))
            .filter_map(|(code, item)| {
                item.options
                    .default_value
                    .as_ref()
                    .map(|value| (code.clone(), value.clone()))
            })
            .collect()
    }

    /// Codes of properties whose empty values get a translation key.
    pub fn translatable_values(&self, property_type: PropertyType) -> Vec<String> {
        self.codes_where(property_type, |options| options.translatable)
    }

    /// Codes of properties materialized into the indexed side table.
    pub fn indexed_values(&self, property_type: PropertyType) -> BTreeSet<String> {
        self.codes_where(property_type, |options| options.indexed)
            .into_iter()
            .collect()
    }

    /// Codes of properties excluded from auditing.
    pub fn not_auditable_values(&self, property_type: PropertyType) -> Vec<String> {
        self.codes_where(property_type, |options| options.auditable == Some(false))
    }

    pub fn required_property_values(&self, property_type: PropertyType) -> BTreeMap<String, Value> {
        self.items(property_type)
            .iter()
            .filter_map(|(code, item)| {
                item.options
                    .required_property
                    .as_ref()
                    .map(|value| (code.clone(), value.clone()))
            })
            .collect()
    }

    pub fn grid_actions(&self, property_type: PropertyType) -> &[Value] {
        &self.section(property_type).grid_action
    }

    pub fn layout_actions(&self, property_type: PropertyType) -> &[Value] {
        &self.section(property_type).layout_action
    }

    pub fn form_config(&self, property_type: PropertyType) -> Option<&Value> {
        self.section(property_type).form.as_ref()
    }

    fn codes_where<F>(&self, property_type: PropertyType, predicate: F) -> Vec<String>
    where
        F: Fn(&PropertyOptions) -> bool,
    {
        self.items(property_type)
            .iter()
            .filter(|(_, item)| predicate(&item.options))
            .map(|(code, _)| code.clone())
            .collect()
    }

    fn section(&self, property_type: PropertyType) -> &PropertySection {
        match property_type {
            PropertyType::Entity => &self.entity,
            PropertyType::Field => &self.field,
        }
    }

    fn section_mut(&mut self, property_type: PropertyType) -> &mut PropertySection {
        match property_type {
            PropertyType::Entity => &mut self.entity,
            PropertyType::Field => &mut self.field,
        }
    }
}
