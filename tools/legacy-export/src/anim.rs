//! Animation strip converter (directory of PNG frames -> .anm)
//!
//! Frames are read in file name order (`0001.png`, `0002.png`, ...). All
//! frames share one palette quantized from their visible pixels.

use anyhow::{Context, Result, bail};
use image::GenericImageView;
use legacy_common::formats::{STRIP_FRAME_HEIGHT, STRIP_FRAME_WIDTH, STRIP_PALETTE_COLORS};
use legacy_common::{Platform, Quantizer, Rgb, write_animation_strip};
use std::path::{Path, PathBuf};

use crate::quantize::MedianCut;

/// Sorted frame image paths in `dir`
fn frame_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("Failed to read frames: {:?}", dir))?
    {
        let path = entry?.path();
        let is_png = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("png"));
        if is_png {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn load_frame(path: &Path) -> Result<Vec<[u8; 4]>> {
    let img = image::open(path).with_context(|| format!("Failed to load frame: {:?}", path))?;
    let (width, height) = img.dimensions();
    if width as usize != STRIP_FRAME_WIDTH || height as usize != STRIP_FRAME_HEIGHT {
        bail!(
            "Frame {:?} is {}x{}, expected {}x{}",
            path,
            width,
            height,
            STRIP_FRAME_WIDTH,
            STRIP_FRAME_HEIGHT
        );
    }
    Ok(img.to_rgba8().pixels().map(|p| p.0).collect())
}

/// Convert a frame directory to in-memory strip bytes
///
/// `limit` keeps only the first frames.
pub fn convert_strip_to_memory(
    input: &Path,
    platform: Platform,
    limit: Option<usize>,
) -> Result<Vec<u8>> {
    let mut paths = frame_paths(input)?;
    if let Some(limit) = limit {
        paths.truncate(limit);
    }
    if paths.is_empty() {
        bail!("No PNG frames found in {:?}", input);
    }

    let frames = paths
        .iter()
        .map(|p| load_frame(p))
        .collect::<Result<Vec<_>>>()?;

    let visible: Vec<Rgb> = frames
        .iter()
        .flatten()
        .filter(|p| p[3] != 0)
        .map(|p| [p[0], p[1], p[2]])
        .collect();
    let palette = MedianCut.quantize(&visible, STRIP_PALETTE_COLORS);

    let bytes = write_animation_strip(&frames, &palette, platform)
        .with_context(|| format!("Failed to encode animation strip: {:?}", input))?;
    tracing::debug!(
        "strip {:?}: {} frames, {} palette colours",
        input,
        frames.len(),
        palette.len()
    );
    Ok(bytes)
}

/// Convert a frame directory to an animation strip for `platform`
pub fn convert_strip(
    input: &Path,
    output: &Path,
    platform: Platform,
    limit: Option<usize>,
) -> Result<()> {
    let bytes = convert_strip_to_memory(input, platform, limit)?;
    std::fs::write(output, &bytes)
        .with_context(|| format!("Failed to write output: {:?}", output))?;

    tracing::info!(
        "Converted animation strip ({}): {} bytes",
        platform,
        bytes.len()
    );
    Ok(())
}
