//! Cache maintenance command

use std::path::Path;

use colored::Colorize;
use entity_config_core::ConfigCacheWarmer;

use super::load_settings;
use crate::error::Result;

/// Run the cache-clear command
pub fn run_cache_clear(settings_path: &Path, warm: bool) -> Result<()> {
    let mut manager = load_settings(settings_path)?.build_manager()?;

    manager.clear_cache_all()?;
    manager.clear_configurable_cache()?;
    println!("{} Cleared config cache", "OK".green().bold());

    if warm {
        let stats = ConfigCacheWarmer::new(&mut manager).warm_up()?;
        println!(
            "{} Warmed up {} entities, {} fields ({} not configurable)",
            "OK".green().bold(),
            stats.entities,
            stats.fields,
            stats.non_configurable
        );
    }
    Ok(())
}
