//! Lifecycle events of the config manager
//!
//! Listeners subscribe to one [`ConfigEventKind`] and receive the manager
//! itself, so they can read and stage configs while the event is handled.
//! A listener that fails aborts the dispatch and the operation that raised
//! it.

use std::fmt;

use entity_config_meta::Config;
use entity_config_model::ConfigModel;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::manager::ConfigManager;

/// Kinds of lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigEventKind {
    /// A class model and its default configs were created
    CreateEntity,
    /// A field model and its default configs were created
    CreateField,
    /// Defaults were merged into the configs of a class
    UpdateEntity,
    /// Defaults were merged into the configs of a field
    UpdateField,
    /// A field was renamed in the store
    RenameField,
    /// A staged config is about to be written to its model
    PrePersistConfig,
    /// Models were committed to the store
    PostFlush,
}

impl fmt::Display for ConfigEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateEntity => write!(f, "create-entity"),
            Self::CreateField => write!(f, "create-field"),
            Self::UpdateEntity => write!(f, "update-entity"),
            Self::UpdateField => write!(f, "update-field"),
            Self::RenameField => write!(f, "rename-field"),
            Self::PrePersistConfig => write!(f, "pre-persist-config"),
            Self::PostFlush => write!(f, "post-flush"),
        }
    }
}

impl ConfigEventKind {
    /// Parse an event kind from its kebab-case name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "create-entity" => Some(Self::CreateEntity),
            "create-field" => Some(Self::CreateField),
            "update-entity" => Some(Self::UpdateEntity),
            "update-field" => Some(Self::UpdateField),
            "rename-field" => Some(Self::RenameField),
            "pre-persist-config" => Some(Self::PrePersistConfig),
            "post-flush" => Some(Self::PostFlush),
            _ => None,
        }
    }

    /// List all valid event names
    pub fn all_names() -> &'static [&'static str] {
        &[
            "create-entity",
            "create-field",
            "update-entity",
            "update-field",
            "rename-field",
            "pre-persist-config",
            "post-flush",
        ]
    }
}

/// An event raised by the config manager.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigEvent {
    CreateEntity {
        class_name: String,
    },
    CreateField {
        class_name: String,
        field_name: String,
    },
    UpdateEntity {
        class_name: String,
    },
    UpdateField {
        class_name: String,
        field_name: String,
    },
    RenameField {
        class_name: String,
        field_name: String,
        new_field_name: String,
    },
    PrePersistConfig {
        config: Config,
    },
    PostFlush {
        models: Vec<ConfigModel>,
    },
}

impl ConfigEvent {
    pub fn kind(&self) -> ConfigEventKind {
        match self {
            Self::CreateEntity { .. } => ConfigEventKind::CreateEntity,
            Self::CreateField { .. } => ConfigEventKind::CreateField,
            Self::UpdateEntity { .. } => ConfigEventKind::UpdateEntity,
            Self::UpdateField { .. } => ConfigEventKind::UpdateField,
            Self::RenameField { .. } => ConfigEventKind::RenameField,
            Self::PrePersistConfig { .. } => ConfigEventKind::PrePersistConfig,
            Self::PostFlush { .. } => ConfigEventKind::PostFlush,
        }
    }

    /// Class the event is about, if it concerns a single class.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Self::CreateEntity { class_name }
            | Self::CreateField { class_name, .. }
            | Self::UpdateEntity { class_name }
            | Self::UpdateField { class_name, .. }
            | Self::RenameField { class_name, .. } => Some(class_name),
            Self::PrePersistConfig { config } => Some(config.id().class_name()),
            Self::PostFlush { .. } => None,
        }
    }
}

/// Receives lifecycle events.
pub trait ConfigListener {
    fn on_event(&mut self, event: &ConfigEvent, manager: &mut ConfigManager) -> Result<()>;
}

impl<F> ConfigListener for F
where
    F: FnMut(&ConfigEvent, &mut ConfigManager) -> Result<()>,
{
    fn on_event(&mut self, event: &ConfigEvent, manager: &mut ConfigManager) -> Result<()> {
        self(event, manager)
    }
}

type Subscription = (ConfigEventKind, Box<dyn ConfigListener>);

/// Listeners keyed by the event kind they subscribed to.
///
/// While an event is dispatched the listeners are lent out to it, so events
/// raised from inside a listener reach no listener.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: Vec<Subscription>,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, kind: ConfigEventKind, listener: Box<dyn ConfigListener>) {
        self.listeners.push((kind, listener));
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn has_listeners(&self, kind: ConfigEventKind) -> bool {
        self.listeners.iter().any(|(k, _)| *k == kind)
    }

    pub(crate) fn lend(&mut self) -> Vec<Subscription> {
        std::mem::take(&mut self.listeners)
    }

    /// Put lent listeners back ahead of any subscribed in the meantime.
    pub(crate) fn restore(&mut self, mut listeners: Vec<Subscription>) {
        listeners.append(&mut self.listeners);
        self.listeners = listeners;
    }
}

/// Run the listeners of `event`'s kind in subscription order.
pub(crate) fn dispatch(manager: &mut ConfigManager, event: &ConfigEvent) -> Result<()> {
    let kind = event.kind();
    if !manager.dispatcher().has_listeners(kind) {
        return Ok(());
    }

    tracing::debug!(event = %kind, "Dispatching config event");
    let mut listeners = manager.dispatcher_mut().lend();
    let result = listeners
        .iter_mut()
        .filter(|(k, _)| *k == kind)
        .try_for_each(|(_, listener)| listener.on_event(event, manager));
    manager.dispatcher_mut().restore(listeners);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for name in ConfigEventKind::all_names() {
            let kind = ConfigEventKind::parse(name).unwrap();
            assert_eq!(kind.to_string(), *name);
        }
        assert_eq!(ConfigEventKind::parse("pre-flush"), None);
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&ConfigEventKind::PrePersistConfig).unwrap();
        assert_eq!(json, "\"pre-persist-config\"");
    }

    #[test]
    fn events_know_their_kind_and_class() {
        let event = ConfigEvent::RenameField {
            class_name: "Acme\\Demo".into(),
            field_name: "name".into(),
            new_field_name: "title".into(),
        };
        assert_eq!(event.kind(), ConfigEventKind::RenameField);
        assert_eq!(event.class_name(), Some("Acme\\Demo"));
        assert_eq!(ConfigEvent::PostFlush { models: vec![] }.class_name(), None);
    }

    #[test]
    fn restore_keeps_listeners_added_meanwhile() {
        let mut dispatcher = EventDispatcher::new();
        dispatcher.subscribe(
            ConfigEventKind::PostFlush,
            Box::new(|_: &ConfigEvent, _: &mut ConfigManager| Ok::<(), crate::Error>(())),
        );

        let lent = dispatcher.lend();
        assert!(dispatcher.is_empty());
        dispatcher.subscribe(
            ConfigEventKind::CreateEntity,
            Box::new(|_: &ConfigEvent, _: &mut ConfigManager| Ok::<(), crate::Error>(())),
        );
        dispatcher.restore(lent);

        assert_eq!(dispatcher.len(), 2);
        assert!(dispatcher.has_listeners(ConfigEventKind::PostFlush));
        assert!(dispatcher.has_listeners(ConfigEventKind::CreateEntity));
    }
}
