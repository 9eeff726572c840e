//! Shared test utilities for the entity-config workspace.
//!
//! A dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`fixtures`]: demo scopes, entity metadata and in-memory collaborators
//! - [`project`]: [`TestProject`] writing a settings file with its
//!   metadata and scope definitions to a temporary directory

pub mod fixtures;
pub mod project;

pub use project::TestProject;
