//! HEIC decoding through the external libheif command line decoder.
//!
//! libheif ships `heif-dec` (called `heif-convert` before 1.17). The decoder
//! writes an intermediate PNG into a scratch directory, which is then loaded
//! into memory. The scratch directory is removed when decoding returns.

use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{PipelineError, PipelineResult};

/// Executable names searched on `PATH`, in order.
pub const DECODER_CANDIDATES: [&str; 2] = ["heif-dec", "heif-convert"];

const DECODED_FILE: &str = "decoded.png";

/// Decodes HEIC input into an in-memory raster.
pub trait HeicDecoder: Send + Sync {
    /// Decode the file at `path`.
    fn decode_file(&self, path: &Path) -> PipelineResult<DynamicImage>;

    /// Decode an in-memory buffer. `origin` is only used in error messages.
    fn decode_bytes(&self, bytes: &[u8], origin: &Path) -> PipelineResult<DynamicImage>;
}

/// [`HeicDecoder`] backed by the `heif-dec` / `heif-convert` executable.
#[derive(Debug, Clone)]
pub struct HeifCliDecoder {
    program: PathBuf,
}

impl HeifCliDecoder {
    /// Use a specific decoder executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Use `program` if given, otherwise search `PATH` for a known decoder.
    pub fn locate(program: Option<PathBuf>) -> PipelineResult<Self> {
        if let Some(program) = program {
            return which::which(&program)
                .map(Self::new)
                .map_err(|_| PipelineError::ToolNotFound {
                    tool: program.display().to_string(),
                });
        }

        DECODER_CANDIDATES
            .iter()
            .find_map(|name| which::which(name).ok())
            .map(Self::new)
            .ok_or_else(|| PipelineError::ToolNotFound {
                tool: DECODER_CANDIDATES.join(", "),
            })
    }

    /// Path of the decoder executable.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run the decoder on `input`, writing a PNG into a fresh scratch dir.
    fn run(&self, input: &Path, origin: &Path) -> PipelineResult<DynamicImage> {
        let scratch = tempfile::tempdir().map_err(|e| PipelineError::Decode {
            path: origin.to_path_buf(),
            message: format!("Cannot create scratch directory: {e}"),
        })?;
        let decoded_png = scratch.path().join(DECODED_FILE);

        let output = Command::new(&self.program)
            .arg(input)
            .arg(&decoded_png)
            .output()
            .map_err(|e| PipelineError::Decode {
                path: origin.to_path_buf(),
                message: format!("Failed to run {}: {e}", self.program.display()),
            })?;

        if !output.status.success() {
            return Err(PipelineError::Decode {
                path: origin.to_path_buf(),
                message: format!(
                    "{} exited with {}: {}",
                    self.program.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        let decoded = decoded_output(scratch.path()).ok_or_else(|| PipelineError::Decode {
            path: origin.to_path_buf(),
            message: format!(
                "Cannot load decoder output: {} wrote no image",
                self.program.display()
            ),
        })?;

        image::open(&decoded).map_err(|e| PipelineError::Decode {
            path: origin.to_path_buf(),
            message: format!("Cannot load decoder output: {e}"),
        })
    }
}

/// Find the raster the decoder wrote into `scratch`.
///
/// A file with several top-level images is written as `decoded-1.png`,
/// `decoded-2.png`, ...; the first one is the primary image.
fn decoded_output(scratch: &Path) -> Option<PathBuf> {
    let single = scratch.join(DECODED_FILE);
    if single.is_file() {
        return Some(single);
    }

    std::fs::read_dir(scratch)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let index = entry
                .file_name()
                .to_str()?
                .strip_prefix("decoded-")?
                .strip_suffix(".png")?
                .parse::<u32>()
                .ok()?;
            Some((index, entry.path()))
        })
        .min_by_key(|(index, _)| *index)
        .map(|(_, path)| path)
}

impl HeicDecoder for HeifCliDecoder {
    fn decode_file(&self, path: &Path) -> PipelineResult<DynamicImage> {
        if !path.is_file() {
            return Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: "Not a readable file".to_string(),
            });
        }
        self.run(path, path)
    }

    fn decode_bytes(&self, bytes: &[u8], origin: &Path) -> PipelineResult<DynamicImage> {
        let spool = tempfile::Builder::new()
            .prefix("heicwatch-")
            .suffix(".heic")
            .tempfile()
            .map_err(|e| PipelineError::Decode {
                path: origin.to_path_buf(),
                message: format!("Cannot spool input: {e}"),
            })?;
        std::fs::write(spool.path(), bytes).map_err(|e| PipelineError::Decode {
            path: origin.to_path_buf(),
            message: format!("Cannot spool input: {e}"),
        })?;
        self.run(spool.path(), origin)
    }
}
