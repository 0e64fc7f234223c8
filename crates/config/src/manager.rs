//! Configuration manager - resolves where library data lives

use crate::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Environment variable naming the data directory
pub const DATA_DIR_ENV: &str = "BOOKLEND_DATA_DIR";

/// Main configuration manager
pub struct ConfigManager {
    data_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a manager using `BOOKLEND_DATA_DIR`, or the platform data
    /// directory when unset
    ///
    /// - Linux: `~/.local/share/booklend/`
    /// - macOS: `~/Library/Application Support/booklend/`
    /// - Windows: `%APPDATA%\booklend\data\`
    pub fn new() -> ConfigResult<Self> {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
            log::debug!("Using data directory from {}", DATA_DIR_ENV);
            return Self::with_directory(PathBuf::from(dir));
        }
        let data_dir = Self::default_data_dir()?;
        Self::with_directory(data_dir)
    }

    /// Creates a manager for a custom data directory
    pub fn with_directory(data_dir: PathBuf) -> ConfigResult<Self> {
        if data_dir.as_os_str().is_empty() {
            return Err(ConfigError::PathResolutionError {
                reason: "Data directory path is empty".to_string(),
            });
        }
        Ok(Self { data_dir })
    }

    fn default_data_dir() -> ConfigResult<PathBuf> {
        ProjectDirs::from("", "", "booklend")
            .map(|proj_dirs| proj_dirs.data_dir().to_path_buf())
            .ok_or_else(|| ConfigError::PathResolutionError {
                reason: "Could not determine user data directory".to_string(),
            })
    }

    /// Returns the directory holding the library stores
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
