//! Show command: config values of a class or field

use std::path::Path;

use colored::Colorize;
use entity_config_core::Values;
use serde_json::{Map, Value};

use super::open_manager;
use crate::error::Result;

/// Run the show command
pub fn run_show(
    settings_path: &Path,
    class_name: &str,
    field_name: Option<&str>,
    scope: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut manager = open_manager(settings_path)?;
    let scopes = match scope {
        Some(scope) => {
            manager.properties(scope)?;
            vec![scope.to_string()]
        }
        None => manager.get_providers(),
    };

    let mut configs: Vec<(String, Values)> = Vec::with_capacity(scopes.len());
    for scope in scopes {
        let config = match field_name {
            Some(field) => manager.get_field_config(&scope, class_name, field)?,
            None => manager.get_entity_config(&scope, class_name)?,
        };
        configs.push((scope, config.into_values()));
    }

    if json {
        let document: Map<String, Value> = configs
            .into_iter()
            .map(|(scope, values)| (scope, Value::Object(values)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    match field_name {
        Some(field) => println!("{}::{}", class_name.bold(), field.bold()),
        None => println!("{}", class_name.bold()),
    }
    for (scope, values) in configs {
        println!();
        println!("{}:", scope.cyan().bold());
        if values.is_empty() {
            println!("  {}", "(empty)".dimmed());
        }
        for (code, value) in &values {
            println!("  {:<20} {}", code, value);
        }
    }
    Ok(())
}
