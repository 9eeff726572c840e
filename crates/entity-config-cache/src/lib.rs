//! Caching layer of the entity configuration engine
//!
//! [`ConfigCache`] keeps configs and "is configurable" flags in a process
//! map in front of a pluggable [`CacheProvider`]. Two providers ship here:
//! [`MemoryCacheProvider`] and [`FileCacheProvider`].

pub mod cache;
pub mod error;
pub mod provider;

pub use cache::{CachedField, ConfigCache};
pub use error::{Error, Result};
pub use provider::{CacheProvider, FileCacheProvider, MemoryCacheProvider};
