//! Bitmap binary format (.cbmp)
//!
//! 256×256 textures, chunked like models. The Playstation build stores
//! palette indices, the PC builds store direct 15-bit colour plus palettes.
//!
//! # Chunks
//! ```text
//! Playstation:  CCB  header, PDAT indices (1 byte/pixel), PLUT palette
//! PC targets:   CCB  header, LkUp lookup, PX16 colours (2 bytes/pixel), PLUT palette
//! ```
//!
//! Index and palette slot 0 are the transparent colour, so stored indices
//! are palette index + 1.

use crate::chunk::{ChunkWriter, Tag};
use crate::color::{pack_pc_color, pc_rgb, playstation_rgb, unit};
use crate::platform::{Payload, Platform};
use crate::quantize::{Palette, Quantizer, Rgb};

pub const BITMAP_HEADER_TAG: Tag = Tag::new(b"CCB ");
pub const BITMAP_INDEX_TAG: Tag = Tag::new(b"PDAT");
pub const BITMAP_COLOR_TAG: Tag = Tag::new(b"PX16");
pub const BITMAP_LOOKUP_TAG: Tag = Tag::new(b"LkUp");
pub const BITMAP_PALETTE_TAG: Tag = Tag::new(b"PLUT");

/// Width and height of every bitmap
pub const BITMAP_DIMENSION: u32 = 256;

/// Palette slots available after the transparent slot
pub const PALETTE_COLORS: usize = 255;

/// Fixed header words
const HEADER_FLAG_WORD: u32 = 0x0100_0000;
const HEADER_BITFIELD: u8 = 0xB7;
const HEADER_TRAILER: [u32; 3] = [0x00DE_BEEF, 0x000B_BEEF, 0x000A_BEEF];
const HEADER_TRAILER_BYTES: [u8; 4] = [1, 2, 3, 4];

/// Opaque black is reserved for transparency on PC, so it is nudged to a
/// dark red
const PC_BLACK_SUBSTITUTE: f32 = 33.0 / 255.0;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BitmapError {
    #[error("bitmap is {width}x{height}, expected 256x256")]
    Dimensions { width: u32, height: u32 },

    #[error("pixel buffer holds {got} pixels, expected {expected}")]
    PixelCount { got: usize, expected: usize },

    #[error("bitmap has no visible pixels")]
    NoVisiblePixels,
}

/// Encode an RGBA bitmap for `platform`
pub fn write_bitmap(
    width: u32,
    height: u32,
    rgba: &[[u8; 4]],
    platform: Platform,
    quantizer: &dyn Quantizer,
) -> Result<Vec<u8>, BitmapError> {
    if width != BITMAP_DIMENSION || height != BITMAP_DIMENSION {
        return Err(BitmapError::Dimensions { width, height });
    }
    let expected = (width * height) as usize;
    if rgba.len() != expected {
        return Err(BitmapError::PixelCount {
            got: rgba.len(),
            expected,
        });
    }

    let mut writer = ChunkWriter::new(platform.endian());

    let mut header = writer.payload();
    write_header(&mut header);
    writer.chunk(BITMAP_HEADER_TAG, header.as_bytes());

    match platform {
        Platform::Playstation => write_playstation(&mut writer, rgba, quantizer),
        Platform::Windows | Platform::Macintosh => write_pc(&mut writer, rgba, quantizer)?,
    }

    let (bytes, _warnings) = writer.finish();
    Ok(bytes)
}

fn write_header(out: &mut Payload) {
    for word in [
        0,
        0,
        0,
        HEADER_FLAG_WORD,
        0,
        HEADER_FLAG_WORD,
        HEADER_FLAG_WORD,
        0,
        HEADER_FLAG_WORD,
        8,
    ] {
        out.u32(word);
    }
    out.u16(0).u8(HEADER_BITFIELD).u8(0).u32(0).u32(0);
    out.u32(HEADER_TRAILER[0])
        .bytes(&HEADER_TRAILER_BYTES)
        .u32(HEADER_TRAILER[1])
        .u32(HEADER_TRAILER[2]);
}

fn rgb(pixel: [u8; 4]) -> Rgb {
    [pixel[0], pixel[1], pixel[2]]
}

fn write_playstation(writer: &mut ChunkWriter, rgba: &[[u8; 4]], quantizer: &dyn Quantizer) {
    let colors: Vec<Rgb> = rgba.iter().copied().map(rgb).collect();
    let palette = quantizer.quantize(&colors, PALETTE_COLORS);

    let mut indices = writer.payload();
    for &pixel in rgba {
        if pixel[3] == 0 {
            indices.u8(0);
        } else {
            indices.u8((palette.nearest(rgb(pixel)) + 1) as u8);
        }
    }
    writer.chunk(BITMAP_INDEX_TAG, indices.as_bytes());

    let mut plut = writer.payload();
    write_palette_header(&mut plut);
    let mut written = 0;
    for &color in palette.colors().iter().take(PALETTE_COLORS) {
        plut.u16(playstation_rgb(color, false));
        written += 1;
    }
    fill_palette(&mut plut, written);
    writer.chunk(BITMAP_PALETTE_TAG, plut.as_bytes());
}

fn write_pc(
    writer: &mut ChunkWriter,
    rgba: &[[u8; 4]],
    quantizer: &dyn Quantizer,
) -> Result<(), BitmapError> {
    let (semi, opaque) = split_palettes(rgba, quantizer)?;

    // Lookup table
    let semi_size = semi.len().min(PALETTE_COLORS - 1) as u8;
    let mut lookup = writer.payload();
    lookup
        .fill(semi_size + 1, 256)
        .fill(0xFF, 256)
        .fill(0, 256)
        .fill(semi_size, 256);
    writer.chunk(BITMAP_LOOKUP_TAG, lookup.as_bytes());

    // Direct colour
    let mut pixels = writer.payload();
    for &[r, g, b, a] in rgba {
        let packed = match a {
            0 => 0,
            255 if [r, g, b] == [0, 0, 0] => pack_pc_color(PC_BLACK_SUBSTITUTE, 0.0, 0.0, false),
            255 => pack_pc_color(unit(r), unit(g), unit(b), false),
            _ => pack_pc_color(unit(r), unit(g), unit(b), true),
        };
        pixels.u16(packed);
    }
    writer.chunk(BITMAP_COLOR_TAG, pixels.as_bytes());

    // Palette: semi-transparent colours first
    let mut plut = writer.payload();
    write_palette_header(&mut plut);
    let mut written = 0;
    for (palette, semi_transparent) in [(&semi, true), (&opaque, false)] {
        for &color in palette.colors() {
            if written == PALETTE_COLORS {
                break;
            }
            plut.u16(pc_rgb(color, semi_transparent));
            written += 1;
        }
    }
    fill_palette(&mut plut, written);
    writer.chunk(BITMAP_PALETTE_TAG, plut.as_bytes());

    Ok(())
}

/// Quantize semi-transparent and opaque pixels separately, sharing the 255
/// palette slots by how many visible pixels fall in each group
fn split_palettes(
    rgba: &[[u8; 4]],
    quantizer: &dyn Quantizer,
) -> Result<(Palette, Palette), BitmapError> {
    let mut semi = Vec::new();
    let mut opaque = Vec::new();
    for &pixel in rgba {
        match pixel[3] {
            0 => {}
            255 => {
                let color = rgb(pixel);
                opaque.push(if color == [0, 0, 0] { [0, 0, 1] } else { color });
            }
            _ => semi.push(rgb(pixel)),
        }
    }

    let (semi_slots, opaque_slots) = share_slots(semi.len(), opaque.len())?;
    tracing::debug!(
        "bitmap palette split: {} semi-transparent slots, {} opaque slots",
        semi_slots,
        opaque_slots
    );

    let quantize = |pixels: &[Rgb], slots: usize| {
        if pixels.is_empty() || slots == 0 {
            Palette::default()
        } else {
            quantizer.quantize(pixels, slots)
        }
    };
    Ok((
        quantize(semi.as_slice(), semi_slots),
        quantize(opaque.as_slice(), opaque_slots),
    ))
}

/// Rounding remainder goes to the smaller share
fn share_slots(semi: usize, opaque: usize) -> Result<(usize, usize), BitmapError> {
    let visible = semi + opaque;
    if visible == 0 {
        return Err(BitmapError::NoVisiblePixels);
    }

    let mut semi_slots = semi * PALETTE_COLORS / visible;
    let mut opaque_slots = opaque * PALETTE_COLORS / visible;
    let remainder = PALETTE_COLORS - (semi_slots + opaque_slots);
    if opaque_slots > semi_slots {
        semi_slots += remainder;
    } else {
        opaque_slots += remainder;
    }
    Ok((semi_slots, opaque_slots))
}

fn write_palette_header(out: &mut Payload) {
    out.u32(0).u32(0x100).u32(0);
    // Slot 0: transparent
    out.u16(0);
}

/// Pad unused palette slots with magenta
fn fill_palette(out: &mut Payload, written: usize) {
    for _ in written..PALETTE_COLORS {
        out.u16(pack_pc_color(1.0, 0.0, 1.0, false));
    }
}
