//! Shared setup for `watch` and `batch`: directory checks and converter creation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use heicwatch_core::{Config, Convert, Converter, HeifCliDecoder, ImageEncoder};

/// Expand a leading `~` in a path given on the command line.
pub fn expand_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).into_owned())
}

/// Fail unless `path` is an existing directory.
pub fn require_dir(path: &Path, role: &str) -> anyhow::Result<()> {
    if !path.exists() {
        anyhow::bail!(
            "{role} directory does not exist: {:?}\n\n  Hint: Create it first or check the path.",
            path
        );
    }
    if !path.is_dir() {
        anyhow::bail!("{role} path is not a directory: {:?}", path);
    }
    Ok(())
}

/// Locate the HEIC decoder and assemble the shared converter.
pub fn build_converter(config: &Config) -> anyhow::Result<Arc<dyn Convert>> {
    let decoder = HeifCliDecoder::locate(config.decoder_program()).map_err(|e| {
        anyhow::anyhow!(
            "{e}\n\n  Hint: Install libheif's command line tools \
             (`apt install libheif-examples` or `brew install libheif`), \
             or set `decoder.program` in the config file."
        )
    })?;
    tracing::info!(decoder = %decoder.program().display(), "using HEIC decoder");

    Ok(Arc::new(Converter::new(
        Box::new(decoder),
        Box::new(ImageEncoder),
    )))
}

/// Apply shared CLI overrides for the conversion section, then validate.
pub fn apply_conversion_overrides(
    config: &mut Config,
    target_extension: Option<&str>,
    source_extension: Option<&str>,
) -> anyhow::Result<()> {
    if let Some(ext) = target_extension {
        config.conversion.target_extension = ext.trim_start_matches('.').to_string();
    }
    if let Some(ext) = source_extension {
        config.conversion.source_extension = ext.to_string();
    }
    config.validate()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_leaves_plain_paths_alone() {
        assert_eq!(expand_path(Path::new("./in")), PathBuf::from("./in"));
        assert!(!expand_path(Path::new("~/in")).starts_with("~"));
    }

    #[test]
    fn test_require_dir_accepts_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(require_dir(dir.path(), "Input").is_ok());
    }

    #[test]
    fn test_require_dir_rejects_missing_and_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let err = require_dir(&missing, "Input").unwrap_err();
        assert!(err.to_string().contains("does not exist"));

        let file = dir.path().join("file.txt");
        std::fs::write(&file, b"x").unwrap();
        let err = require_dir(&file, "Output").unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let mut config = Config::default();
        apply_conversion_overrides(&mut config, Some(".jpg"), Some("HEIF")).unwrap();
        assert_eq!(config.conversion.target_extension, "jpg");
        assert_eq!(config.conversion.source_extension, "HEIF");
    }

    #[test]
    fn test_unsupported_target_is_rejected() {
        let mut config = Config::default();
        assert!(apply_conversion_overrides(&mut config, Some("gif"), None).is_err());
    }

    #[test]
    fn test_missing_decoder_program_fails() {
        let mut config = Config::default();
        config.decoder.program = "/definitely/not/a/heif-decoder".into();
        let err = build_converter(&config).err().unwrap();
        assert!(err.to_string().contains("Hint"));
    }
}
