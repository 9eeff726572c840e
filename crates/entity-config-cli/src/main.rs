//! Entity config CLI
//!
//! The command-line interface for maintaining entity configuration.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: {}", "warning".yellow().bold(), e);
    }
    tracing::debug!(settings = %cli.settings.display(), "Starting entity-config");

    match cli.command {
        Some(cmd) => execute_command(&cli.settings, cmd),
        None => {
            println!("{} Entity config CLI", "entity-config".green().bold());
            println!();
            println!("Run {} for available commands.", "entity-config --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(settings: &std::path::Path, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init => commands::run_init(settings),
        Commands::Update { force, filter } => {
            commands::run_update(settings, force, filter.as_deref())
        }
        Commands::CacheClear { warm } => commands::run_cache_clear(settings, warm),
        Commands::List {
            scope,
            class,
            with_hidden,
            json,
        } => commands::run_list(
            settings,
            scope.as_deref(),
            class.as_deref(),
            with_hidden,
            json,
        ),
        Commands::Show {
            class,
            field,
            scope,
            json,
        } => commands::run_show(settings, &class, field.as_deref(), scope.as_deref(), json),
    }
}
