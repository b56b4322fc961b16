//! Bitmap converter (PNG/JPG -> .cbmp)

use anyhow::{Context, Result};
use image::GenericImageView;
use legacy_common::{Platform, write_bitmap};
use std::path::Path;

use crate::quantize::MedianCut;

/// Convert an image file to in-memory bitmap bytes
pub fn convert_image_to_memory(input: &Path, platform: Platform) -> Result<Vec<u8>> {
    let img = image::open(input).with_context(|| format!("Failed to load image: {:?}", input))?;
    let (width, height) = img.dimensions();

    let pixels: Vec<[u8; 4]> = img.to_rgba8().pixels().map(|p| p.0).collect();
    let bytes = write_bitmap(width, height, &pixels, platform, &MedianCut)
        .with_context(|| format!("Failed to encode bitmap: {:?}", input))?;
    Ok(bytes)
}

/// Convert an image file to a bitmap for `platform`
pub fn convert_image(input: &Path, output: &Path, platform: Platform) -> Result<()> {
    let bytes = convert_image_to_memory(input, platform)?;
    std::fs::write(output, &bytes)
        .with_context(|| format!("Failed to write output: {:?}", output))?;

    tracing::info!("Converted bitmap ({}): {} bytes", platform, bytes.len());
    Ok(())
}
