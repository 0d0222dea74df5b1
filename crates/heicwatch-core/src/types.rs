//! Core data types shared by the converter, the watch pool and the batch runner.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, PipelineResult};

/// Output encodings the converter can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Png,
    Jpeg,
}

impl TargetFormat {
    /// Resolve a target extension (`png`, `jpg`, `jpeg`; case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match normalize_extension(ext).as_str() {
            "png" => Some(TargetFormat::Png),
            "jpg" | "jpeg" => Some(TargetFormat::Jpeg),
            _ => None,
        }
    }

    /// The matching `image` crate format.
    pub fn image_format(self) -> image::ImageFormat {
        match self {
            TargetFormat::Png => image::ImageFormat::Png,
            TargetFormat::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

impl std::fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetFormat::Png => write!(f, "png"),
            TargetFormat::Jpeg => write!(f, "jpeg"),
        }
    }
}

/// Lowercase an extension and strip any leading dots (`".HEIC"` -> `"heic"`).
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// Check whether `path` has the given (already normalized) extension.
pub fn has_extension(path: &Path, normalized_ext: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase() == normalized_ext)
        .unwrap_or(false)
}

/// One file to convert. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    /// File to decode
    pub source_path: PathBuf,
    /// Directory receiving the output file
    pub output_dir: PathBuf,
    /// Extension appended to the output file name
    pub target_extension: String,
}

impl ConversionJob {
    pub fn new(
        source_path: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        target_extension: impl Into<String>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            output_dir: output_dir.into(),
            target_extension: target_extension.into(),
        }
    }

    /// Destination path: `<output_dir>/<source stem>.<target_extension>`.
    pub fn output_path(&self) -> Option<PathBuf> {
        output_path_for(&self.source_path, &self.output_dir, &self.target_extension)
    }
}

/// Derive the output path for a source file name.
///
/// Only the last extension is stripped, so `a.tar.heic` becomes `a.tar.png`.
/// Returns `None` when the source has no file name.
pub fn output_path_for(source: &Path, output_dir: &Path, target_extension: &str) -> Option<PathBuf> {
    let stem = source.file_stem()?;
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(target_extension.trim_start_matches('.'));
    Some(output_dir.join(name))
}

/// Outcome of a single conversion: the written file, or why it failed.
pub type ConversionResult = PipelineResult<PathBuf>;

/// Kind of filesystem change reported by the watch source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchEventKind {
    Create,
    Write,
    Remove,
    Rename,
    Other,
}

impl From<&notify::EventKind> for WatchEventKind {
    fn from(kind: &notify::EventKind) -> Self {
        use notify::event::ModifyKind;
        use notify::EventKind;

        match kind {
            EventKind::Create(_) => WatchEventKind::Create,
            EventKind::Modify(ModifyKind::Name(_)) => WatchEventKind::Rename,
            EventKind::Modify(_) => WatchEventKind::Write,
            EventKind::Remove(_) => WatchEventKind::Remove,
            EventKind::Access(_) | EventKind::Any | EventKind::Other => WatchEventKind::Other,
        }
    }
}

/// A single filesystem change for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub path: PathBuf,
    pub kind: WatchEventKind,
}

impl WatchEvent {
    pub fn new(path: impl Into<PathBuf>, kind: WatchEventKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Split a `notify` event into one `WatchEvent` per affected path.
    pub fn from_notify(event: notify::Event) -> Vec<Self> {
        let kind = WatchEventKind::from(&event.kind);
        event
            .paths
            .into_iter()
            .map(|path| WatchEvent { path, kind })
            .collect()
    }
}

/// Settings for one watch-mode run. Fixed at startup.
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// Number of workers (> 0)
    pub concurrency: usize,
    /// Directory receiving converted files
    pub output_dir: PathBuf,
    /// Extension appended to output files
    pub target_extension: String,
}

impl WorkerPoolConfig {
    pub fn new(
        concurrency: usize,
        output_dir: impl Into<PathBuf>,
        target_extension: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        if concurrency == 0 {
            return Err(ConfigError::ValidationError(
                "worker count must be > 0".into(),
            ));
        }
        let target_extension = target_extension.into();
        if TargetFormat::from_extension(&target_extension).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "unsupported target extension '{target_extension}'"
            )));
        }
        Ok(Self {
            concurrency,
            output_dir: output_dir.into(),
            target_extension,
        })
    }

    /// Build the job for a source file seen by a worker.
    pub fn job_for(&self, source_path: impl Into<PathBuf>) -> ConversionJob {
        ConversionJob::new(source_path, &self.output_dir, &self.target_extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};

    #[test]
    fn test_target_format_from_extension() {
        assert_eq!(TargetFormat::from_extension("png"), Some(TargetFormat::Png));
        assert_eq!(TargetFormat::from_extension(".PNG"), Some(TargetFormat::Png));
        assert_eq!(TargetFormat::from_extension("jpg"), Some(TargetFormat::Jpeg));
        assert_eq!(TargetFormat::from_extension("Jpeg"), Some(TargetFormat::Jpeg));
        assert_eq!(TargetFormat::from_extension("webp"), None);
        assert_eq!(TargetFormat::from_extension(""), None);
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension(".HEIC"), "heic");
        assert_eq!(normalize_extension("heic"), "heic");
        assert_eq!(normalize_extension(" Heif "), "heif");
        assert_eq!(normalize_extension("."), "");
    }

    #[test]
    fn test_output_path_strips_source_extension() {
        let job = ConversionJob::new("/in/photo.HEIC", "/out", "png");
        assert_eq!(job.output_path(), Some(PathBuf::from("/out/photo.png")));
    }

    #[test]
    fn test_output_path_strips_only_last_extension() {
        let path = output_path_for(Path::new("/in/trip.2024.heic"), Path::new("/out"), "jpg");
        assert_eq!(path, Some(PathBuf::from("/out/trip.2024.jpg")));
    }

    #[test]
    fn test_output_path_ignores_leading_dot_in_target() {
        let path = output_path_for(Path::new("a.heic"), Path::new("/out"), ".png");
        assert_eq!(path, Some(PathBuf::from("/out/a.png")));
    }

    #[test]
    fn test_output_path_no_file_name() {
        assert_eq!(output_path_for(Path::new("/"), Path::new("/out"), "png"), None);
    }

    #[test]
    fn test_event_kind_mapping() {
        use notify::EventKind;

        assert_eq!(
            WatchEventKind::from(&EventKind::Create(CreateKind::File)),
            WatchEventKind::Create
        );
        assert_eq!(
            WatchEventKind::from(&EventKind::Modify(ModifyKind::Any)),
            WatchEventKind::Write
        );
        assert_eq!(
            WatchEventKind::from(&EventKind::Modify(ModifyKind::Name(RenameMode::To))),
            WatchEventKind::Rename
        );
        assert_eq!(
            WatchEventKind::from(&EventKind::Remove(RemoveKind::File)),
            WatchEventKind::Remove
        );
        assert_eq!(WatchEventKind::from(&EventKind::Any), WatchEventKind::Other);
    }

    #[test]
    fn test_from_notify_splits_paths() {
        let event = notify::Event::new(notify::EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/in/a.heic"))
            .add_path(PathBuf::from("/in/b.heic"));

        let events = WatchEvent::from_notify(event);
        assert_eq!(
            events,
            vec![
                WatchEvent::new("/in/a.heic", WatchEventKind::Create),
                WatchEvent::new("/in/b.heic", WatchEventKind::Create),
            ]
        );
    }

    #[test]
    fn test_worker_pool_config_rejects_zero() {
        assert!(WorkerPoolConfig::new(0, "/out", "png").is_err());
        assert!(WorkerPoolConfig::new(1, "/out", "tiff").is_err());

        let config = WorkerPoolConfig::new(3, "/out", "png").unwrap();
        let job = config.job_for("/in/x.heic");
        assert_eq!(job.output_path(), Some(PathBuf::from("/out/x.png")));
    }
}
