//! Configuration management for heicwatch.
//!
//! Configuration is loaded from the platform config directory with defaults
//! for every missing value. CLI flags are applied on top by the binary.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for heicwatch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Watch mode settings
    pub watch: WatchConfig,

    /// Batch mode settings
    pub batch: BatchConfig,

    /// Source and target extensions
    pub conversion: ConversionConfig,

    /// External decoder settings
    pub decoder: DecoderConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/com.heicwatch.heicwatch/config.toml
    /// - Linux: ~/.config/heicwatch/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\heicwatch\config\config.toml
    ///
    /// Falls back to ~/.heicwatch/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "heicwatch", "heicwatch")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".heicwatch").join("config.toml")
            })
    }

    /// Resolved log directory (with ~ expansion). Empty means the temp dir.
    pub fn log_dir(&self) -> PathBuf {
        if self.logging.dir.as_os_str().is_empty() {
            return std::env::temp_dir();
        }
        let path_str = self.logging.dir.to_string_lossy();
        PathBuf::from(shellexpand::tilde(&path_str).into_owned())
    }

    /// Resolved decoder program, if one is configured.
    pub fn decoder_program(&self) -> Option<PathBuf> {
        if self.decoder.program.as_os_str().is_empty() {
            return None;
        }
        let path_str = self.decoder.program.to_string_lossy();
        Some(PathBuf::from(shellexpand::tilde(&path_str).into_owned()))
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
