//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (config, entries, `--now`, credential, pipeline)
//! - `insight` - Weekly insight generation
//! - `prompt` - Prompt preview and config display
//! - `stats` - Mood statistics, trends, and themes

pub mod core;
pub mod insight;
pub mod prompt;
pub mod stats;

// Re-export command functions for main.rs
pub use self::core::*;
pub use insight::*;
pub use prompt::*;
pub use stats::*;
