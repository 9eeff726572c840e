//! Command implementations for entity-config-cli

use std::path::Path;

use entity_config_core::{ConfigManager, EntityConfigSettings};

use crate::error::{CliError, Result};

pub mod cache;
pub mod init;
pub mod list;
pub mod show;
pub mod update;

pub use cache::run_cache_clear;
pub use init::run_init;
pub use list::run_list;
pub use show::run_show;
pub use update::run_update;

fn load_settings(settings_path: &Path) -> Result<EntityConfigSettings> {
    if !settings_path.exists() {
        return Err(CliError::user(format!(
            "Settings file not found: {}",
            settings_path.display()
        )));
    }
    Ok(EntityConfigSettings::load(settings_path)?)
}

/// Manager over an initialized store.
fn open_manager(settings_path: &Path) -> Result<ConfigManager> {
    let settings = load_settings(settings_path)?;
    let mut manager = settings.build_manager()?;
    if !manager.check_database()? {
        return Err(CliError::user(format!(
            "Model store {} is not initialized. Run `entity-config init` first",
            settings.store_path().display()
        )));
    }
    Ok(manager)
}
