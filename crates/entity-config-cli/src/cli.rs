//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Entity config - manage per-scope configuration of entities and fields
#[derive(Parser, Debug)]
#[command(name = "entity-config")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file
    #[arg(
        short,
        long,
        global = true,
        env = "ENTITY_CONFIG_SETTINGS",
        default_value = "entity-config.toml"
    )]
    pub settings: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create the model store file
    Init,

    /// Create or refresh config models from entity metadata
    ///
    /// Every configurable class and field described by metadata gets a
    /// model; existing models receive defaults they are missing.
    ///
    /// Examples:
    ///   entity-config update                      # Add missing defaults
    ///   entity-config update --force              # Reset values to defaults
    ///   entity-config update --filter 'Contact$'  # Only matching classes
    Update {
        /// Overwrite values that differ from defaults (custom classes excepted)
        #[arg(long)]
        force: bool,

        /// Only classes whose name matches this regular expression
        #[arg(long)]
        filter: Option<String>,
    },

    /// Drop cached configs and configurable flags
    CacheClear {
        /// Warm the cache up again afterwards
        #[arg(long)]
        warm: bool,
    },

    /// List config ids
    List {
        /// Scope to list (defaults to the first registered scope)
        #[arg(long)]
        scope: Option<String>,

        /// List the fields of this class instead of classes
        #[arg(long)]
        class: Option<String>,

        /// Include hidden models
        #[arg(long)]
        with_hidden: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show config values of a class or field
    Show {
        /// Class name
        class: String,

        /// Field name
        #[arg(long)]
        field: Option<String>,

        /// Only this scope (defaults to every scope)
        #[arg(long)]
        scope: Option<String>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}
