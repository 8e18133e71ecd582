//! Application paths management.

use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// File name of the knowledge store inside the data directory.
pub const DATABASE_FILE_NAME: &str = "lorebook.db";

/// Manages all application paths following platform conventions.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub config_file: PathBuf,
    pub database_file: PathBuf,
}

impl AppPaths {
    /// Create paths using platform-specific directories.
    pub fn new() -> Option<Self> {
        let proj_dirs = ProjectDirs::from("com", "lorebook", "lorebook")?;

        let config_dir = proj_dirs.config_dir().to_path_buf();
        let data_dir = proj_dirs.data_dir().to_path_buf();

        Some(Self {
            config_file: config_dir.join("config.toml"),
            database_file: data_dir.join(DATABASE_FILE_NAME),
            config_dir,
            data_dir,
        })
    }

    /// Point the data directory (and the database inside it) somewhere else.
    pub fn with_data_dir(mut self, data_dir: impl AsRef<Path>) -> Self {
        self.data_dir = data_dir.as_ref().to_path_buf();
        self.database_file = self.data_dir.join(DATABASE_FILE_NAME);
        self
    }

    /// Create all necessary directories.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }

    /// Check if lorebook has been initialized.
    pub fn is_initialized(&self) -> bool {
        self.config_file.exists() && self.database_file.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_paths_creation() {
        let paths = AppPaths::new();
        assert!(paths.is_some());

        let paths = paths.unwrap();
        assert!(paths.config_file.to_string_lossy().contains("config.toml"));
        assert!(paths.database_file.to_string_lossy().contains("lorebook.db"));
    }

    #[test]
    fn test_with_data_dir_moves_database() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::new().unwrap().with_data_dir(dir.path());

        assert_eq!(paths.database_file, dir.path().join(DATABASE_FILE_NAME));
        assert!(!paths.is_initialized());
    }
}
