//! Bitmap font binary format (.pfnt)
//!
//! # Layout
//! ```text
//! 0x00: magic u32 = 0x50544E46
//! 0x04: file_size u32
//! 0x08: version u16 = 100
//! 0x0A: glyph_count u16
//! 0x0C: platform_number u32     (9 on Playstation, 8 otherwise)
//! 0x10: reserved u16
//! 0x12: line_spacing u8 = 10
//! 0x13: reserved u8
//! 0x14: glyph_offset u32 = 0x20
//! 0x18: reserved u32
//! 0x1C: image_header_offset u32
//! 0x20: glyphs (11 bytes each), padded with 0xAD to a 16-byte boundary
//! var:  image header (16 bytes)
//! var:  image, 4 bits per pixel, two pixels per byte
//! ```
//!
//! The glyph sheet is one channel: any non-zero pixel is ink.

use crate::platform::{Payload, Platform};

pub const FONT_MAGIC: u32 = 0x5054_4E46;
pub const FONT_VERSION: u16 = 100;

/// Required glyph sheet width
pub const FONT_SHEET_WIDTH: u32 = 256;

const START_HEADER_SIZE: usize = 0x20;
const GLYPH_SIZE: usize = 0xB;
const IMAGE_HEADER_SIZE: usize = 0x10;
const LINE_SPACING: u8 = 10;
const GLYPH_PADDING: u8 = 0xAD;
const IMAGE_BPP_CODE: u16 = 3;
const IMAGE_TRAILER: u16 = 0x1A3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FontError {
    #[error("glyph sheet is {0} pixels wide, the format requires 256")]
    SheetWidth(u32),

    #[error("glyph sheet holds {got} pixels, expected {expected}")]
    PixelCount { got: usize, expected: usize },

    #[error("{0} glyphs do not fit the 16-bit glyph count")]
    TooManyGlyphs(usize),
}

/// Placement of one character on the glyph sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Glyph {
    pub code: u8,
    pub width: u8,
    pub height: u8,
    pub left: u8,
    pub top: u8,
    pub x_advance: u8,
    pub offset_x: i8,
    pub offset_y: i8,
}

impl Glyph {
    fn write(&self, out: &mut Payload) {
        out.u8(self.code)
            .u8(0)
            .u8(self.width)
            .u8(self.height)
            .u8(self.left)
            .u8(0)
            .u8(self.top)
            .u8(0)
            .u8(self.x_advance)
            .i8(self.offset_x)
            .i8(self.offset_y);
    }
}

fn platform_number(platform: Platform) -> u32 {
    match platform {
        Platform::Playstation => 9,
        Platform::Windows | Platform::Macintosh => 8,
    }
}

fn align16(value: usize) -> usize {
    (value + 0xF) & !0xF
}

/// Encode a font from its glyph table and one-channel glyph sheet
///
/// Glyphs are written in the order given.
pub fn write_font(
    glyphs: &[Glyph],
    width: u32,
    height: u32,
    sheet: &[u8],
    platform: Platform,
) -> Result<Vec<u8>, FontError> {
    if width != FONT_SHEET_WIDTH {
        return Err(FontError::SheetWidth(width));
    }
    let expected = (width * height) as usize;
    if sheet.len() != expected {
        return Err(FontError::PixelCount {
            got: sheet.len(),
            expected,
        });
    }
    let glyph_count =
        u16::try_from(glyphs.len()).map_err(|_| FontError::TooManyGlyphs(glyphs.len()))?;

    let image_header_offset = align16(GLYPH_SIZE * glyphs.len() + START_HEADER_SIZE);
    let image_size = (width as usize / 2) * height as usize;
    let file_size = image_header_offset + IMAGE_HEADER_SIZE + image_size;

    let mut out = Payload::with_capacity(platform.endian(), file_size);
    out.u32(FONT_MAGIC)
        .u32(file_size as u32)
        .u16(FONT_VERSION)
        .u16(glyph_count)
        .u32(platform_number(platform))
        .u16(0)
        .u8(LINE_SPACING)
        .u8(0)
        .u32(START_HEADER_SIZE as u32)
        .u32(0)
        .u32(image_header_offset as u32);

    for glyph in glyphs {
        glyph.write(&mut out);
    }
    let padding = image_header_offset - out.len();
    out.fill(GLYPH_PADDING, padding);

    out.u8(b'@')
        .u8(0)
        .u8(0)
        .u8(0)
        .u16(width as u16)
        .u16(height as u16)
        .u32(0)
        .u16(IMAGE_BPP_CODE)
        .u16(IMAGE_TRAILER);

    for row in sheet.chunks(width as usize) {
        for pair in row.chunks(2) {
            let mut byte = 0u8;
            if pair[0] != 0 {
                byte |= 0xF0;
            }
            if pair.get(1).is_some_and(|&p| p != 0) {
                byte |= 0x0F;
            }
            out.u8(byte);
        }
    }

    tracing::debug!(
        "encoded font: {} glyphs, {}x{} sheet, {} bytes",
        glyphs.len(),
        width,
        height,
        out.len()
    );
    Ok(out.into_bytes())
}
