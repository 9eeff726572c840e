//! Mutable key-value config bound to a [`ConfigId`]

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::ConfigId;
use crate::value::{Values, is_truthy, loose_eq};
use crate::{Error, Result};

/// Scoped configuration values of one entity or field.
///
/// `Clone` is a deep copy, used to snapshot the state a change set is
/// measured against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    id: ConfigId,
    #[serde(default)]
    values: Values,
}

impl Config {
    pub fn new(id: ConfigId) -> Self {
        Self {
            id,
            values: Values::new(),
        }
    }

    pub fn with_values(id: ConfigId, values: Values) -> Self {
        Self { id, values }
    }

    pub fn id(&self) -> &ConfigId {
        &self.id
    }

    /// Value of `code`, `None` when absent or null.
    pub fn get(&self, code: &str) -> Option<&Value> {
        self.values.get(code).filter(|v| !v.is_null())
    }

    /// Value of `code`, or `default` when absent or null.
    pub fn get_or(&self, code: &str, default: Value) -> Value {
        self.get(code).cloned().unwrap_or(default)
    }

    /// Value of `code`, failing when it is absent or null.
    pub fn get_strict(&self, code: &str) -> Result<&Value> {
        self.get(code).ok_or_else(|| Error::ValueNotFound {
            code: code.to_string(),
            class_name: self.id.class_name().to_string(),
            scope: self.id.scope().to_string(),
        })
    }

    pub fn set(&mut self, code: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(code.into(), value.into());
        self
    }

    pub fn remove(&mut self, code: &str) -> Option<Value> {
        self.values.shift_remove(code)
    }

    /// Whether `code` holds a non-null value.
    pub fn has(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// Boolean coercion of the value of `code`.
    pub fn is(&self, code: &str) -> bool {
        self.get(code).is_some_and(is_truthy)
    }

    /// Whether the value of `code` loosely equals `value`.
    pub fn is_value(&self, code: &str, value: &Value) -> bool {
        self.get(code).is_some_and(|v| loose_eq(v, value))
    }

    /// Whether the value of `code` is one of `values`.
    pub fn in_list(&self, code: &str, values: &[Value], strict: bool) -> bool {
        match self.get(code) {
            Some(current) => values
                .iter()
                .any(|v| if strict { v == current } else { loose_eq(v, current) }),
            None => false,
        }
    }

    pub fn all(&self) -> &Values {
        &self.values
    }

    /// Values accepted by `filter`.
    pub fn all_filtered<F>(&self, filter: F) -> Values
    where
        F: Fn(&str, &Value) -> bool,
    {
        self.values
            .iter()
            .filter(|(code, value)| filter(code, value))
            .map(|(code, value)| (code.clone(), value.clone()))
            .collect()
    }

    pub fn set_values(&mut self, values: Values) -> &mut Self {
        self.values = values;
        self
    }

    pub fn into_values(self) -> Values {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn config() -> Config {
        let mut config = Config::new(ConfigId::entity("entity", r"Acme\Entity\Demo"));
        config
            .set("label", "Demo")
            .set("enabled", true)
            .set("count", 0)
            .set("owner", "Custom")
            .set("empty", Value::Null);
        config
    }

    #[test]
    fn null_values_count_as_absent() {
        let config = config();
        assert!(config.has("label"));
        assert!(!config.has("empty"));
        assert!(!config.has("missing"));
        assert_eq!(config.get("empty"), None);
        assert_eq!(config.get_or("empty", json!("fallback")), json!("fallback"));
    }

    #[test]
    fn strict_get_reports_scope_and_class() {
        let err = config().get_strict("missing").unwrap_err();
        assert_eq!(
            err.to_string(),
            r"Config 'missing' for class 'Acme\Entity\Demo' in scope 'entity' is not found"
        );
    }

    #[test]
    fn is_coerces_to_bool() {
        let config = config();
        assert!(config.is("enabled"));
        assert!(!config.is("count"));
        assert!(!config.is("missing"));
    }

    #[test]
    fn value_checks_use_loose_equality_unless_strict() {
        let config = config();
        assert!(config.is_value("owner", &json!("Custom")));
        assert!(config.is_value("enabled", &json!(1)));
        assert!(config.in_list("count", &[json!("0"), json!(5)], false));
        assert!(!config.in_list("count", &[json!("0"), json!(5)], true));
        assert!(config.in_list("count", &[json!(0)], true));
    }

    #[test]
    fn filtered_values_keep_only_accepted_codes() {
        let filtered = config().all_filtered(|code, _| code.starts_with('e'));
        let codes: Vec<_> = filtered.keys().cloned().collect();
        assert_eq!(codes, vec!["enabled".to_string(), "empty".to_string()]);
    }

    #[test]
    fn values_keep_insertion_order() {
        let mut config = Config::new(ConfigId::entity("entity", r"Acme\Entity\Demo"));
        config
            .set("zeta", 1)
            .set("alpha", 2)
            .set("mid", 3)
            .set("beta", 4);
        config.remove("alpha");

        let codes: Vec<&str> = config.all().keys().map(String::as_str).collect();
        assert_eq!(codes, vec!["zeta", "mid", "beta"]);
    }

    #[test]
    fn clone_is_a_deep_snapshot() {
        let original = config();
        let mut changed = original.clone();
        changed.set("label", "Changed");

        assert_eq!(original.get("label"), Some(&json!("Demo")));
        assert_eq!(changed.get("label"), Some(&json!("Changed")));
    }
}
