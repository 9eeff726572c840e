//! List command: config ids of a scope

use std::path::Path;

use colored::Colorize;

use super::open_manager;
use crate::error::{CliError, Result};

/// Run the list command
pub fn run_list(
    settings_path: &Path,
    scope: Option<&str>,
    class_name: Option<&str>,
    with_hidden: bool,
    json: bool,
) -> Result<()> {
    let mut manager = open_manager(settings_path)?;
    let scope = match scope {
        Some(scope) => scope.to_string(),
        None => manager
            .get_providers()
            .into_iter()
            .next()
            .ok_or_else(|| CliError::user("No scopes are configured"))?,
    };
    // Validates the scope
    manager.properties(&scope)?;

    let ids = manager.get_ids(&scope, class_name, with_hidden)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ids)?);
        return Ok(());
    }

    let heading = match class_name {
        Some(class_name) => format!("Fields of {class_name}"),
        None => "Entities".to_string(),
    };
    println!("{} ({})", heading.bold(), scope.cyan());
    if ids.is_empty() {
        println!("  {}", "None".dimmed());
    }
    for id in &ids {
        match (id.field_name(), id.field_type()) {
            (Some(field), Some(field_type)) => {
                println!("  {:<24} {}", field.green(), field_type.dimmed());
            }
            (Some(field), None) => println!("  {}", field.green()),
            (None, _) => println!("  {}", id.class_name().green()),
        }
    }
    Ok(())
}
