//! Ember CLI - Weekly journal insights
//!
//! Usage:
//!   ember stats --entries entries.json      Mood stats, trends, and themes
//!   ember prompt --entries entries.json     Preview the rendered prompt
//!   ember insight --entries entries.json    Generate the weekly insight
//!   ember config                            Show the active configuration

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Stats { entries, now, json } => {
            let pipeline = commands::build_pipeline(config);
            let entries = commands::load_entries(&entries)?;
            let now = commands::parse_now(now.as_deref())?;
            commands::cmd_stats(&pipeline, &entries, now, json)
        }
        Commands::Prompt { entries, now } => {
            let pipeline = commands::build_pipeline(config);
            let entries = commands::load_entries(&entries)?;
            let now = commands::parse_now(now.as_deref())?;
            commands::cmd_prompt(&pipeline, &entries, now)
        }
        Commands::Insight {
            entries,
            now,
            raw,
            json,
        } => {
            let pipeline = commands::build_pipeline(config);
            let entries = commands::load_entries(&entries)?;
            let now = commands::parse_now(now.as_deref())?;
            let credential = commands::credential_from_env();
            commands::cmd_insight(&pipeline, &entries, now, credential.as_deref(), raw, json)
                .await
        }
        Commands::Config => commands::cmd_config(&config),
    }
}
