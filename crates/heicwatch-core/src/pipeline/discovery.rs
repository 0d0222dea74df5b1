//! Source file discovery for batch mode.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{has_extension, normalize_extension};

/// Finds files with the source extension under a directory.
pub struct FileDiscovery {
    source_extension: String,
}

impl FileDiscovery {
    /// Create a discovery for the given source extension.
    pub fn new(source_extension: &str) -> Self {
        Self {
            source_extension: normalize_extension(source_extension),
        }
    }

    /// Recursively list every regular file with the source extension.
    ///
    /// Any traversal error aborts discovery: a partial listing would silently
    /// skip files. Results are sorted by path.
    pub fn discover(&self, root: &Path) -> PipelineResult<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root).follow_links(true) {
            let entry = entry.map_err(|e| PipelineError::Walk {
                path: e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf()),
                message: e.to_string(),
            })?;

            if entry.file_type().is_file() && has_extension(entry.path(), &self.source_extension) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        Ok(files)
    }
}
