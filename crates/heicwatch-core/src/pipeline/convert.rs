//! Single-file conversion: decode, stage the encoded output, publish it.
//!
//! Encoded bytes go to a staging file inside the output directory and are
//! renamed onto the destination only after encoding succeeded. A failed
//! conversion therefore never leaves a partial or empty file behind, and two
//! conversions racing for the same destination resolve to last-writer-wins
//! with a complete file either way.

use image::DynamicImage;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};
use crate::types::{output_path_for, ConversionJob, ConversionResult, TargetFormat};

use super::decode::HeicDecoder;
use super::encode::RasterEncoder;

/// Anything that can turn a [`ConversionJob`] into a [`ConversionResult`].
///
/// This is the seam the worker pool and the batch task group run against.
pub trait Convert: Send + Sync {
    fn convert(&self, job: &ConversionJob) -> ConversionResult;
}

/// Converter built from a decoder and an encoder collaborator.
pub struct Converter {
    decoder: Box<dyn HeicDecoder>,
    encoder: Box<dyn RasterEncoder>,
}

impl Converter {
    pub fn new(decoder: Box<dyn HeicDecoder>, encoder: Box<dyn RasterEncoder>) -> Self {
        Self { decoder, encoder }
    }

    /// Convert an in-memory HEIC buffer named `file_name` into `output_dir`.
    pub fn convert_bytes(
        &self,
        bytes: &[u8],
        file_name: &Path,
        output_dir: &Path,
        target_extension: &str,
    ) -> ConversionResult {
        let destination = destination(file_name, output_dir, target_extension)?;
        let format = target_format(&destination, target_extension)?;
        let image = self.decoder.decode_bytes(bytes, file_name)?;
        self.publish(&image, &destination, format)
    }

    /// Encode `image` into a staging file next to `destination`, then rename.
    fn publish(
        &self,
        image: &DynamicImage,
        destination: &Path,
        format: TargetFormat,
    ) -> ConversionResult {
        let encode_err = |message: String| PipelineError::Encode {
            path: destination.to_path_buf(),
            message,
        };

        let staging_dir = destination.parent().unwrap_or_else(|| Path::new("."));
        let mut builder = tempfile::Builder::new();
        builder.prefix(".heicwatch-").suffix(".part");
        // Staging files default to 0600; outputs get the usual umask-based mode.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o666));
        }
        let mut staged = builder
            .tempfile_in(staging_dir)
            .map_err(|e| encode_err(format!("Cannot create output file: {e}")))?;

        // On error `staged` is dropped here, which closes and deletes it.
        self.encoder
            .encode(image, staged.as_file_mut(), format)
            .map_err(|e| encode_err(e.to_string()))?;

        staged
            .persist(destination)
            .map_err(|e| encode_err(format!("Cannot move output into place: {}", e.error)))?;

        Ok(destination.to_path_buf())
    }
}

impl Convert for Converter {
    fn convert(&self, job: &ConversionJob) -> ConversionResult {
        let destination = destination(&job.source_path, &job.output_dir, &job.target_extension)?;
        let format = target_format(&destination, &job.target_extension)?;

        let image = self.decoder.decode_file(&job.source_path)?;
        tracing::trace!(
            source = %job.source_path.display(),
            width = image.width(),
            height = image.height(),
            "decoded"
        );

        self.publish(&image, &destination, format)
    }
}

fn destination(source: &Path, output_dir: &Path, target_extension: &str) -> PipelineResult<PathBuf> {
    output_path_for(source, output_dir, target_extension).ok_or_else(|| PipelineError::Decode {
        path: source.to_path_buf(),
        message: "Source path has no file name".to_string(),
    })
}

fn target_format(destination: &Path, target_extension: &str) -> PipelineResult<TargetFormat> {
    TargetFormat::from_extension(target_extension).ok_or_else(|| PipelineError::Encode {
        path: destination.to_path_buf(),
        message: format!("Unsupported target extension '{target_extension}'"),
    })
}
