//! Font converter (glyph table TOML + sheet image -> .pfnt)
//!
//! ```toml
//! sheet = "glyphs.png"    # relative to this file, 256 pixels wide
//!
//! [[glyphs]]
//! code = "A"              # or a byte value, e.g. 65
//! width = 8
//! height = 10
//! left = 0
//! top = 0
//! x_advance = 9
//! ```

use anyhow::{Context, Result, bail};
use image::GenericImageView;
use legacy_common::{Glyph, Platform, write_font};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Font description file
#[derive(Debug, Deserialize)]
pub struct FontDescription {
    pub sheet: PathBuf,
    #[serde(default)]
    pub glyphs: Vec<GlyphEntry>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum GlyphCode {
    Byte(u8),
    Char(char),
}

impl GlyphCode {
    fn byte(self) -> Result<u8> {
        match self {
            GlyphCode::Byte(b) => Ok(b),
            GlyphCode::Char(c) => u8::try_from(c)
                .map_err(|_| anyhow::anyhow!("Glyph {:?} is outside the 8-bit character set", c)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GlyphEntry {
    pub code: GlyphCode,
    pub width: u8,
    pub height: u8,
    pub left: u8,
    pub top: u8,
    pub x_advance: u8,
    #[serde(default)]
    pub offset_x: i8,
    #[serde(default)]
    pub offset_y: i8,
}

impl GlyphEntry {
    fn to_glyph(&self) -> Result<Glyph> {
        Ok(Glyph {
            code: self.code.byte()?,
            width: self.width,
            height: self.height,
            left: self.left,
            top: self.top,
            x_advance: self.x_advance,
            offset_x: self.offset_x,
            offset_y: self.offset_y,
        })
    }
}

fn sheet_ink(img: &image::DynamicImage) -> Vec<u8> {
    img.to_rgba8().pixels().map(|p| p.0[0]).collect()
}

/// Convert a font description to in-memory font bytes
pub fn convert_font_to_memory(input: &Path, platform: Platform) -> Result<Vec<u8>> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read font description: {:?}", input))?;
    let description: FontDescription = toml::from_str(&content)
        .with_context(|| format!("Failed to parse font description: {:?}", input))?;

    let glyphs = description
        .glyphs
        .iter()
        .map(GlyphEntry::to_glyph)
        .collect::<Result<Vec<_>>>()?;

    let sheet_path = input
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(&description.sheet);
    let img = image::open(&sheet_path)
        .with_context(|| format!("Failed to load glyph sheet: {:?}", sheet_path))?;
    let (width, height) = img.dimensions();
    if height > u16::MAX as u32 {
        bail!("Glyph sheet {:?} is too tall ({} rows)", sheet_path, height);
    }

    // Ink is read from the first channel only
    let sheet = sheet_ink(&img);
    let bytes = write_font(&glyphs, width, height, &sheet, platform)
        .with_context(|| format!("Failed to encode font: {:?}", input))?;
    Ok(bytes)
}

/// Convert a font description to a font for `platform`
pub fn convert_font(input: &Path, output: &Path, platform: Platform) -> Result<()> {
    let bytes = convert_font_to_memory(input, platform)?;
    std::fs::write(output, &bytes)
        .with_context(|| format!("Failed to write output: {:?}", output))?;

    tracing::info!("Converted font ({}): {} bytes", platform, bytes.len());
    Ok(())
}
