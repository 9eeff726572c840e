//! Update command: sync config models with entity metadata

use std::path::Path;

use colored::Colorize;
use entity_config_core::ConfigManager;
use entity_config_meta::EntityMetadata;
use regex::Regex;

use super::open_manager;
use crate::error::Result;

/// Counts of models touched by an update.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub created: usize,
    pub updated: usize,
}

/// Run the update command
pub fn run_update(settings_path: &Path, force: bool, filter: Option<&str>) -> Result<()> {
    let filter = filter.map(Regex::new).transpose()?;
    let mut manager = open_manager(settings_path)?;

    let summary = update_models(&mut manager, force, filter.as_ref())?;
    manager.clear_configurable_cache()?;
    manager.flush()?;

    println!(
        "{} {} created, {} updated{}",
        "OK".green().bold(),
        summary.created,
        summary.updated,
        if force { " (forced)" } else { "" }
    );
    Ok(())
}

/// Create or update the models of every configurable class in metadata.
pub fn update_models(
    manager: &mut ConfigManager,
    force: bool,
    filter: Option<&Regex>,
) -> Result<UpdateSummary> {
    let classes: Vec<EntityMetadata> = manager
        .metadata_source()
        .class_names()
        .iter()
        .filter(|class_name| filter.is_none_or(|re| re.is_match(class_name)))
        .filter_map(|class_name| manager.get_entity_metadata(class_name))
        .collect();

    let mut summary = UpdateSummary::default();
    for metadata in classes {
        let class_name = metadata.name.as_str();
        if manager.has_config_entity_model(class_name)? {
            manager.update_config_entity_model(class_name, force)?;
            summary.updated += 1;
        } else {
            manager.create_config_entity_model(Some(class_name), None)?;
            summary.created += 1;
        }

        for field in &metadata.fields {
            if manager.has_config_field_model(class_name, &field.name)? {
                manager.update_config_field_model(class_name, &field.name, force)?;
                summary.updated += 1;
            } else {
                manager.create_config_field_model(class_name, &field.name, &field.field_type, None)?;
                summary.created += 1;
            }
        }
        tracing::debug!(class = %class_name, fields = metadata.fields.len(), "Updated class configs");
    }
    Ok(summary)
}
