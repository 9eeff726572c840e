//! Entity configuration engine
//!
//! [`ConfigManager`] loads per-scope configs of classes and fields through a
//! two-tier cache, stages edits, computes change sets and flushes them to a
//! durable model store, raising lifecycle events along the way.
//! [`ConfigProvider`] is the scope-bound façade most callers use.
//!
//! ```no_run
//! use entity_config_core::{EntityConfigSettings, Result};
//! use std::path::Path;
//!
//! fn relabel() -> Result<()> {
//!     let settings = EntityConfigSettings::load(Path::new("entity-config.toml"))?;
//!     let mut manager = settings.build_manager()?;
//!
//!     let mut provider = manager.get_provider("entity")?;
//!     let mut config = provider.get_config(Some(r"Acme\DemoBundle\Entity\Contact".into()), None)?;
//!     config.set("label", "Contact");
//!     provider.persist(config);
//!     provider.flush()
//! }
//! ```

mod defaults;
pub mod error;
pub mod event;
pub mod manager;
mod pending;
pub mod provider;
pub mod scope;
pub mod settings;
pub mod warmer;

pub use error::{Error, Result};
pub use event::{ConfigEvent, ConfigEventKind, ConfigListener, EventDispatcher};
pub use manager::{ConfigManager, EXTEND_SCOPE, MAX_FLUSH_PASSES, OWNER_CUSTOM};
pub use provider::{ClassInput, ConfigProvider, ConfigurableObject, EntityCollection, get_class_name};
pub use scope::{ScopeRegistration, ScopeRegistry};
pub use settings::{DEFAULT_SETTINGS_FILE, EntityConfigSettings};
pub use warmer::{ConfigCacheWarmer, WarmUpStats};

pub use entity_config_cache::ConfigCache;
pub use entity_config_meta::{ChangeSet, Config, ConfigId, ConfigMode, Value, Values};
