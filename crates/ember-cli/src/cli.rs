//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Ember - Weekly reflections on your journal
#[derive(Parser)]
#[command(name = "ember")]
#[command(about = "Weekly insight generation for journal entries", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Insight config file (defaults to the data-directory override, then built-in)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show mood statistics, trends, and themes for the current window
    Stats {
        /// JSON file with an array of journal entries
        #[arg(short, long)]
        entries: PathBuf,

        /// Reference time (RFC 3339), defaults to now
        #[arg(long)]
        now: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render the prompt that would be sent, without calling the provider
    Prompt {
        /// JSON file with an array of journal entries
        #[arg(short, long)]
        entries: PathBuf,

        /// Reference time (RFC 3339), defaults to now
        #[arg(long)]
        now: Option<String>,
    },

    /// Generate the weekly insight
    ///
    /// Reads the provider credential from EMBER_API_KEY.
    Insight {
        /// JSON file with an array of journal entries
        #[arg(short, long)]
        entries: PathBuf,

        /// Reference time (RFC 3339), defaults to now
        #[arg(long)]
        now: Option<String>,

        /// Print the unvalidated provider output instead
        #[arg(long)]
        raw: bool,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the active configuration
    Config,
}
