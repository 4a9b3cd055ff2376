//! Command implementations for the dbmd CLI
//!
//! Each command module handles the CLI interface and delegates to
//! dbmd-core for the actual work.

pub mod preview;
pub mod render;

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use dbmd_core::Settings;

/// Output format for `dbmd render`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// A complete HTML preview page
    Html,
    /// A markdown document with results in place of the SQL fences
    Markdown,
}

/// Load settings for `document`, then apply the command-line override.
pub fn load_settings(
    config: Option<&Path>,
    document: &Path,
    db_type: Option<String>,
) -> Result<Settings> {
    let settings = Settings::load(config, Some(document)).context("Failed to load settings")?;
    Ok(settings.with_default_database_type(db_type))
}
