//! Error types for the heicwatch conversion pipeline.
//!
//! Errors are split by concern so callers can tell fatal startup failures
//! (configuration, watcher initialization, directory traversal) apart from
//! per-file failures (decode, encode) that are logged and skipped.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for heicwatch operations.
#[derive(Error, Debug)]
pub enum HeicwatchError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Filesystem watcher errors
    #[error("Watch error: {0}")]
    Watch(#[from] WatchError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while discovering or converting files.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Source file could not be read or is not a decodable HEIC image
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Destination could not be written or the raster encoder failed
    #[error("Encode error for {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// Directory traversal failed (batch mode)
    #[error("Cannot walk {path}: {message}")]
    Walk { path: PathBuf, message: String },

    /// No external HEIC decoder could be located
    #[error("HEIC decoder not found (tried: {tool})")]
    ToolNotFound { tool: String },

    /// A conversion task aborted before producing a result
    #[error("Conversion task for {path} aborted: {message}")]
    Task { path: PathBuf, message: String },
}

impl PipelineError {
    /// The file this error refers to, when there is one.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            PipelineError::Decode { path, .. }
            | PipelineError::Encode { path, .. }
            | PipelineError::Walk { path, .. }
            | PipelineError::Task { path, .. } => Some(path),
            PipelineError::ToolNotFound { .. } => None,
        }
    }
}

/// Filesystem watcher errors.
#[derive(Error, Debug)]
pub enum WatchError {
    /// The watcher could not be created or attached to the input directory
    #[error("Cannot watch {path}: {message}")]
    Init { path: PathBuf, message: String },

    /// Transient error reported by the running watcher
    #[error("Watcher reported: {0}")]
    Source(String),
}

/// Convenience type alias for heicwatch results.
pub type Result<T> = std::result::Result<T, HeicwatchError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_mentions_path() {
        let err = PipelineError::Decode {
            path: PathBuf::from("/in/photo.heic"),
            message: "not a HEIF file".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/in/photo.heic"));
        assert!(msg.contains("not a HEIF file"));
        assert_eq!(err.path(), Some(&PathBuf::from("/in/photo.heic")));
    }

    #[test]
    fn test_tool_not_found_has_no_path() {
        let err = PipelineError::ToolNotFound {
            tool: "heif-dec, heif-convert".to_string(),
        };
        assert!(err.path().is_none());
        assert!(err.to_string().contains("heif-dec"));
    }

    #[test]
    fn test_top_level_wraps_watch_error() {
        let err: HeicwatchError = WatchError::Init {
            path: PathBuf::from("/missing"),
            message: "No such file or directory".to_string(),
        }
        .into();
        assert!(err.to_string().starts_with("Watch error:"));
    }
}
