//! Init command implementation

use std::path::Path;

use colored::Colorize;

use super::load_settings;
use crate::error::Result;

/// Run the init command
pub fn run_init(settings_path: &Path) -> Result<()> {
    let settings = load_settings(settings_path)?;
    let mut store = settings.open_store()?;

    let created = store
        .initialize()
        .map_err(entity_config_core::Error::from)?;
    if created {
        println!(
            "{} Created model store at {}",
            "OK".green().bold(),
            store.path().display()
        );
    } else {
        println!(
            "{} Model store already exists at {}",
            "=".dimmed(),
            store.path().display()
        );
    }
    Ok(())
}
