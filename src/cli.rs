//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for `filmeto-crew`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Filmeto Crew - crew member and soul resolution for Filmeto projects
///
/// Materializes role templates into a project's crew directory, assigns a
/// soul to each member, and lists the crew in importance order.
#[derive(Parser, Debug)]
#[command(name = "filmeto-crew")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, env = "FILMETO_CONFIG", global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create missing crew member files for a project
    Init {
        /// Project directory
        project: PathBuf,
    },

    /// List a project's crew in importance order
    List {
        /// Project directory
        project: PathBuf,

        /// Rank by the language's role templates instead of the canonical roles
        #[arg(long)]
        dynamic: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one crew member
    Show {
        /// Project directory
        project: PathBuf,

        /// Member name
        name: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List crew titles with display names and ranks
    Titles {
        /// Display language (defaults to the configured language)
        #[arg(short, long)]
        language: Option<String>,

        /// Rank by the language's role templates instead of the canonical roles
        #[arg(long)]
        dynamic: bool,
    },

    /// List available souls
    Souls {
        /// Only souls with this skill
        #[arg(long)]
        skill: Option<String>,

        /// Show one soul in full
        #[arg(long, conflicts_with = "skill")]
        name: Option<String>,
    },

    /// Display version and build information
    Version,

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the current configuration
    Show,

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate the configuration
    Validate,
}
