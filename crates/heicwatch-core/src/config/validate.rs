//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::types::{normalize_extension, TargetFormat};

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watch.workers == 0 {
            return Err(ConfigError::ValidationError(
                "watch.workers must be > 0".into(),
            ));
        }
        if self.watch.buffer_size == 0 {
            return Err(ConfigError::ValidationError(
                "watch.buffer_size must be > 0".into(),
            ));
        }
        if self.batch.concurrency == 0 {
            return Err(ConfigError::ValidationError(
                "batch.concurrency must be > 0".into(),
            ));
        }
        if normalize_extension(&self.conversion.source_extension).is_empty() {
            return Err(ConfigError::ValidationError(
                "conversion.source_extension must not be empty".into(),
            ));
        }
        if TargetFormat::from_extension(&self.conversion.target_extension).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "conversion.target_extension '{}' is not supported (use png, jpg or jpeg)",
                self.conversion.target_extension
            )));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::ValidationError(format!(
                "logging.format '{}' must be 'pretty' or 'json'",
                self.logging.format
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let mut config = Config::default();
        config.watch.workers = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("watch.workers"));
    }

    #[test]
    fn test_validate_rejects_zero_buffer() {
        let mut config = Config::default();
        config.watch.buffer_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("buffer_size"));
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.batch.concurrency = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("batch.concurrency"));
    }

    #[test]
    fn test_validate_rejects_blank_source_extension() {
        let mut config = Config::default();
        config.conversion.source_extension = ".".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("source_extension"));
    }

    #[test]
    fn test_validate_rejects_unknown_target() {
        let mut config = Config::default();
        config.conversion.target_extension = "gif".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("'gif'"));

        config.conversion.target_extension = "JPEG".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("logging.format"));
    }
}
