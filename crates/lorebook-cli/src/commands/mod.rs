//! CLI command implementations.

pub mod config;
pub mod ingest;
pub mod init;
pub mod search;
pub mod stats;

use anyhow::{Context, Result};
use lorebook_config::{AppPaths, Config};
use lorebook_db::Database;
use std::path::PathBuf;
use tracing::debug;

/// Get the application paths.
pub fn get_paths() -> Result<AppPaths> {
    AppPaths::new().context("Failed to determine application directories")
}

/// Load the configuration and apply its display settings.
pub fn load_config() -> Result<Config> {
    let config = Config::load().context("Failed to load config")?;
    if !config.ui.color {
        colored::control::set_override(false);
    }
    Ok(config)
}

/// Expand `~` in a user-supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Resolve the database file: command line, then config, then the default location.
pub fn database_path(override_path: Option<&str>, config: &Config) -> Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(expand_path(path));
    }
    if let Some(path) = &config.general.database {
        return Ok(expand_path(path));
    }

    let paths = get_paths()?;
    match &config.general.data_dir {
        Some(dir) => Ok(paths.with_data_dir(expand_path(dir)).database_file),
        None => Ok(paths.database_file),
    }
}

/// Open the store for writing, creating it if needed.
pub fn open_database(override_path: Option<&str>, config: &Config) -> Result<Database> {
    let path = database_path(override_path, config)?;
    debug!("Using database {}", path.display());
    Database::open(&path).with_context(|| format!("Failed to open database {}", path.display()))
}

/// Open an existing store for reading.
pub fn get_database(override_path: Option<&str>, config: &Config) -> Result<Database> {
    let path = database_path(override_path, config)?;

    if !path.exists() {
        anyhow::bail!(
            "No knowledge store at {}. Run 'lorebook init' or an ingest command first.",
            path.display()
        );
    }

    Database::open(&path).context("Failed to open database")
}

/// Format a file size in human-readable form.
pub fn format_size(bytes: i64) -> String {
    const KB: i64 = 1024;
    const MB: i64 = KB * 1024;
    const GB: i64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Truncate a string to a maximum number of characters.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
