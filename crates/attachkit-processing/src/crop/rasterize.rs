//! Rasterize a crop region to JPEG.

use std::io::Cursor;

use anyhow::{bail, Context};
use bytes::Bytes;
use image::GenericImageView;

use super::PixelRect;

/// Decode `data`, cut out `region` (clamped into the image a final time),
/// and encode the result as JPEG at the given quality.
pub fn crop_to_jpeg(data: &[u8], region: PixelRect, quality: u8) -> Result<Bytes, anyhow::Error> {
    let cursor = Cursor::new(data);
    let img = image::ImageReader::new(cursor)
        .with_guessed_format()
        .context("Failed to sniff image format")?
        .decode()
        .context("Failed to decode image")?;

    let (img_w, img_h) = img.dimensions();
    let x = region.x.min(img_w);
    let y = region.y.min(img_h);
    let width = region.width.min(img_w - x);
    let height = region.height.min(img_h - y);
    if width == 0 || height == 0 {
        bail!("Empty crop region");
    }

    tracing::debug!(x, y, width, height, "rasterizing crop region");

    // JPEG has no alpha channel; flatten before encoding.
    let cropped = img.crop_imm(x, y, width, height).to_rgb8();

    let mut buffer = Vec::new();
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(Cursor::new(&mut buffer), quality);
    cropped
        .write_with_encoder(encoder)
        .context("JPEG encoding failed")?;

    Ok(Bytes::from(buffer))
}
