//! Durable models of the entity configuration engine
//!
//! [`EntityConfigModel`] and [`FieldConfigModel`] hold per-scope values plus
//! an indexed side table kept consistent by [`ScopedData::from_array`].
//! [`ConfigModelStore`] is the contract the config manager persists through;
//! [`InMemoryModelStore`] and [`FileModelStore`] implement it.

pub mod error;
pub mod file_store;
pub mod model;
pub mod store;

pub use error::{Error, Result};
pub use file_store::FileModelStore;
pub use model::{ConfigModel, EntityConfigModel, FieldConfigModel, IndexedValue, ScopedData};
pub use store::{ConfigModelStore, InMemoryModelStore, ModelDocument};

pub use entity_config_meta::ConfigMode;
