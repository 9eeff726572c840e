//! Ordered staging area of configs awaiting flush

use std::collections::HashMap;

use entity_config_meta::Config;

/// Configs staged for persistence, keyed by canonical key.
///
/// Iteration follows first-staging order. Re-staging a key replaces the
/// config but keeps its position.
#[derive(Debug, Clone, Default)]
pub(crate) struct PendingConfigs {
    order: Vec<String>,
    configs: HashMap<String, Config>,
}

impl PendingConfigs {
    pub fn insert(&mut self, config: Config) {
        let key = config.id().key();
        if !self.configs.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.configs.insert(key, config);
    }

    pub fn get(&self, key: &str) -> Option<&Config> {
        self.configs.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.configs.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Config> {
        let config = self.configs.remove(key)?;
        self.order.retain(|k| k != key);
        Some(config)
    }

    /// Swap the config staged under `old_key` for `config`, keeping the slot.
    pub fn replace(&mut self, old_key: &str, config: Config) -> bool {
        let Some(slot) = self.order.iter().position(|k| k == old_key) else {
            return false;
        };
        self.configs.remove(old_key);
        let key = config.id().key();
        if key != old_key && self.configs.contains_key(&key) {
            self.order.remove(slot);
        } else {
            self.order[slot] = key.clone();
        }
        self.configs.insert(key, config);
        true
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Config> {
        self.order.iter().filter_map(|key| self.configs.get(key))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
