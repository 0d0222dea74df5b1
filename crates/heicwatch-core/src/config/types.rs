//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Watch mode settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Number of worker threads draining the event queue
    pub workers: usize,

    /// Capacity of the event queue between the watcher and the workers.
    /// When full, the watcher callback blocks until a worker frees a slot.
    pub buffer_size: usize,

    /// Also watch subdirectories of the input directory
    pub recursive: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            workers: 8,
            buffer_size: 1024,
            recursive: false,
        }
    }
}

/// Batch mode settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum number of conversions running at once
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

/// Source/target naming shared by both modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Extension of files to pick up (case-insensitive, leading dot optional)
    pub source_extension: String,

    /// Extension appended to output files; also selects the encoder
    pub target_extension: String,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            source_extension: "heic".to_string(),
            target_extension: "png".to_string(),
        }
    }
}

/// External HEIC decoder settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Explicit decoder executable. Empty means search `PATH`.
    pub program: PathBuf,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,

    /// Log format (pretty, json)
    pub format: String,

    /// Also write logs to a dated file
    pub file: bool,

    /// Directory for the dated log file. Empty means the system temp dir.
    pub dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: true,
            dir: PathBuf::new(),
        }
    }
}
