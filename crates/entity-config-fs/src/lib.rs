//! File I/O primitives for the entity configuration stores
//!
//! Provides the two things every file-backed collaborator needs:
//!
//! - [`io`]: atomic, advisory-locked writes and tolerant reads/removals
//! - [`DocumentStore`]: serde documents loaded and saved as TOML, JSON or YAML,
//!   with the format picked from the file extension

pub mod document;
pub mod error;
pub mod io;

pub use document::{DocumentFormat, DocumentStore};
pub use error::{Error, Result};
