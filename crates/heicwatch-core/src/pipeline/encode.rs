//! Raster encoding into the requested output format.

use image::{DynamicImage, ImageResult};
use std::fs::File;
use std::io::{BufWriter, Write};

use crate::types::TargetFormat;

/// Encodes a decoded raster into an open destination file.
pub trait RasterEncoder: Send + Sync {
    fn encode(&self, image: &DynamicImage, dest: &mut File, format: TargetFormat)
        -> ImageResult<()>;
}

/// [`RasterEncoder`] using the `image` crate's PNG and JPEG encoders.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageEncoder;

impl RasterEncoder for ImageEncoder {
    fn encode(
        &self,
        image: &DynamicImage,
        dest: &mut File,
        format: TargetFormat,
    ) -> ImageResult<()> {
        let mut writer = BufWriter::new(dest);
        match format {
            // JPEG has no alpha channel.
            TargetFormat::Jpeg if image.color().has_alpha() => {
                DynamicImage::ImageRgb8(image.to_rgb8())
                    .write_to(&mut writer, format.image_format())?;
            }
            _ => image.write_to(&mut writer, format.image_format())?,
        }
        writer.flush()?;
        Ok(())
    }
}
