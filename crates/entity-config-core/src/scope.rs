//! Registry of config scopes

use std::collections::HashMap;

use entity_config_meta::PropertyConfigContainer;

/// A registered scope and its property rules.
#[derive(Debug, Clone)]
pub struct ScopeRegistration {
    pub name: String,
    pub properties: PropertyConfigContainer,
}

/// Scopes known to the config manager.
///
/// Scopes are visited in registration order whenever defaults are seeded,
/// so listing preserves that order rather than sorting.
#[derive(Debug, Clone, Default)]
pub struct ScopeRegistry {
    order: Vec<String>,
    scopes: HashMap<String, ScopeRegistration>,
}

impl ScopeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scope, replacing the rules of an existing one in place.
    pub fn register(&mut self, name: impl Into<String>, properties: PropertyConfigContainer) {
        let name = name.into();
        if !self.scopes.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.scopes.insert(
            name.clone(),
            ScopeRegistration { name, properties },
        );
    }

    /// Get a registration by scope name.
    pub fn get(&self, name: &str) -> Option<&ScopeRegistration> {
        self.scopes.get(name)
    }

    /// Check if a scope is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.scopes.contains_key(name)
    }

    /// Get the number of registered scopes.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// List scope names in registration order.
    pub fn list(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Owned scope names, for loops that mutate the manager.
    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScopeRegistration> {
        self.order.iter().filter_map(|name| self.scopes.get(name))
    }
}
