//! Identifiers of entity-level and field-level configs

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Identifies the config of an entity class within a scope.
///
/// An empty class name stands for a new entity that has no name yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityConfigId {
    scope: String,
    class_name: String,
}

impl EntityConfigId {
    pub fn new(scope: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            class_name: class_name.into(),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }
}

/// Identifies the config of one field of an entity class within a scope.
///
/// The field type travels with the id but takes no part in equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfigId {
    scope: String,
    class_name: String,
    field_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    field_type: Option<String>,
}

impl FieldConfigId {
    pub fn new(
        scope: impl Into<String>,
        class_name: impl Into<String>,
        field_name: impl Into<String>,
        field_type: Option<String>,
    ) -> Self {
        let field_name = field_name.into();
        debug_assert!(!field_name.is_empty(), "field config id needs a field name");
        Self {
            scope: scope.into(),
            class_name: class_name.into(),
            field_name,
            field_type,
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn field_type(&self) -> Option<&str> {
        self.field_type.as_deref()
    }
}

impl PartialEq for FieldConfigId {
    fn eq(&self, other: &Self) -> bool {
        self.scope == other.scope
            && self.class_name == other.class_name
            && self.field_name == other.field_name
    }
}

impl Eq for FieldConfigId {}

impl Hash for FieldConfigId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.scope.hash(state);
        self.class_name.hash(state);
        self.field_name.hash(state);
    }
}

/// Either kind of config identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigId {
    Entity(EntityConfigId),
    Field(FieldConfigId),
}

impl ConfigId {
    pub fn entity(scope: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self::Entity(EntityConfigId::new(scope, class_name))
    }

    pub fn field(
        scope: impl Into<String>,
        class_name: impl Into<String>,
        field_name: impl Into<String>,
        field_type: Option<String>,
    ) -> Self {
        Self::Field(FieldConfigId::new(scope, class_name, field_name, field_type))
    }

    pub fn scope(&self) -> &str {
        match self {
            Self::Entity(id) => id.scope(),
            Self::Field(id) => id.scope(),
        }
    }

    pub fn class_name(&self) -> &str {
        match self {
            Self::Entity(id) => id.class_name(),
            Self::Field(id) => id.class_name(),
        }
    }

    pub fn field_name(&self) -> Option<&str> {
        match self {
            Self::Entity(_) => None,
            Self::Field(id) => Some(id.field_name()),
        }
    }

    pub fn field_type(&self) -> Option<&str> {
        match self {
            Self::Entity(_) => None,
            Self::Field(id) => id.field_type(),
        }
    }

    pub fn is_field(&self) -> bool {
        matches!(self, Self::Field(_))
    }

    /// Canonical key `scope.className[.fieldName]`.
    ///
    /// Every cache, staging and change-set slot is addressed by this key.
    pub fn key(&self) -> String {
        match self {
            Self::Entity(id) => format!("{}.{}", id.scope, id.class_name),
            Self::Field(id) => format!("{}.{}.{}", id.scope, id.class_name, id.field_name),
        }
    }

    /// Key of the durable model behind this id: `className[.fieldName]`.
    pub fn model_key(&self) -> String {
        match self {
            Self::Entity(id) => id.class_name.clone(),
            Self::Field(id) => format!("{}.{}", id.class_name, id.field_name),
        }
    }

    /// The same id in another scope.
    pub fn with_scope(&self, scope: impl Into<String>) -> Self {
        match self {
            Self::Entity(id) => Self::entity(scope, id.class_name.clone()),
            Self::Field(id) => Self::field(
                scope,
                id.class_name.clone(),
                id.field_name.clone(),
                id.field_type.clone(),
            ),
        }
    }
}

impl fmt::Display for ConfigId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl From<EntityConfigId> for ConfigId {
    fn from(id: EntityConfigId) -> Self {
        Self::Entity(id)
    }
}

impl From<FieldConfigId> for ConfigId {
    fn from(id: FieldConfigId) -> Self {
        Self::Field(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const CLASS: &str = r"Acme\DemoBundle\Entity\Contact";

    #[test]
    fn keys_follow_scope_class_field_order() {
        assert_eq!(
            ConfigId::entity("entity", CLASS).key(),
            r"entity.Acme\DemoBundle\Entity\Contact"
        );
        assert_eq!(
            ConfigId::field("extend", CLASS, "email", Some("string".into())).key(),
            r"extend.Acme\DemoBundle\Entity\Contact.email"
        );
    }

    #[test]
    fn field_type_does_not_affect_identity() {
        let typed = ConfigId::field("entity", CLASS, "email", Some("string".into()));
        let untyped = ConfigId::field("entity", CLASS, "email", None);

        assert_eq!(typed, untyped);
        let set: HashSet<_> = [typed, untyped].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn entity_and_field_ids_never_compare_equal() {
        assert_ne!(
            ConfigId::entity("entity", CLASS),
            ConfigId::field("entity", CLASS, "id", None)
        );
    }

    #[test]
    fn model_key_drops_the_scope() {
        let id = ConfigId::field("datagrid", CLASS, "email", None);
        assert_eq!(id.model_key(), r"Acme\DemoBundle\Entity\Contact.email");
        assert_eq!(id.with_scope("entity").model_key(), id.model_key());
    }

    #[test]
    fn serialized_form_keeps_the_kind() {
        let id = ConfigId::field("entity", CLASS, "email", Some("string".into()));
        let json = serde_json::to_string(&id).unwrap();
        assert!(json.contains(r#""kind":"field""#));

        let back: ConfigId = serde_json::from_str(&json).unwrap();
        assert_eq!(back.field_type(), Some("string"));
    }
}
