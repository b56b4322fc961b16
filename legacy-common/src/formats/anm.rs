//! Frame animation strip binary format (.anm)
//!
//! Small full-motion sprites (64×48) sharing one palette.
//!
//! # Layout
//! ```text
//! 0x000: frame_count u32
//! 0x004: palette u16 × 256     (PC colour layout, entry 0 = unseen purple)
//! 0x204: frames, 64 × 48 bytes each
//! ```
//!
//! Each frame is stored as 12 interleaved passes of 4 scan lines: pass `s`
//! holds rows `s, s + 12, s + 24, s + 36`. Transparent pixels are 0, every
//! other pixel is its palette index + 1.

use crate::color::{pack_pc_color, pc_rgb};
use crate::platform::{Payload, Platform};
use crate::quantize::Palette;

pub const STRIP_FRAME_WIDTH: usize = 64;
pub const STRIP_FRAME_HEIGHT: usize = 48;

/// Palette entries after the reserved first entry
pub const STRIP_PALETTE_COLORS: usize = 255;

const SCAN_LINES_PER_PASS: usize = 4;
const PASSES: usize = STRIP_FRAME_HEIGHT / SCAN_LINES_PER_PASS;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnimationStripError {
    #[error("frame {frame} holds {got} pixels, expected 64x48 = {expected}")]
    FrameSize {
        frame: usize,
        got: usize,
        expected: usize,
    },

    #[error("animation strip has no frames")]
    NoFrames,
}

/// Encode RGBA frames (64×48 each) against a shared palette
pub fn write_animation_strip(
    frames: &[Vec<[u8; 4]>],
    palette: &Palette,
    platform: Platform,
) -> Result<Vec<u8>, AnimationStripError> {
    if frames.is_empty() {
        return Err(AnimationStripError::NoFrames);
    }
    let expected = STRIP_FRAME_WIDTH * STRIP_FRAME_HEIGHT;
    if let Some((frame, pixels)) = frames.iter().enumerate().find(|(_, f)| f.len() != expected) {
        return Err(AnimationStripError::FrameSize {
            frame,
            got: pixels.len(),
            expected,
        });
    }
    if palette.len() > STRIP_PALETTE_COLORS {
        tracing::warn!(
            "palette has {} colours, only the first {} are stored",
            palette.len(),
            STRIP_PALETTE_COLORS
        );
    }

    let mut out = Payload::with_capacity(platform.endian(), 4 + 512 + frames.len() * expected);
    out.u32(frames.len() as u32);

    // Unseen
    out.u16(pack_pc_color(0.5, 0.0, 0.5, false));
    for slot in 0..STRIP_PALETTE_COLORS {
        let color = palette.colors().get(slot).copied().unwrap_or([0, 0, 0]);
        out.u16(pc_rgb(color, false));
    }

    for frame in frames {
        for pass in 0..PASSES {
            for line in 0..SCAN_LINES_PER_PASS {
                let y = PASSES * line + pass;
                for pixel in &frame[y * STRIP_FRAME_WIDTH..(y + 1) * STRIP_FRAME_WIDTH] {
                    if pixel[3] == 0 {
                        out.u8(0);
                    } else {
                        let index = palette
                            .nearest([pixel[0], pixel[1], pixel[2]])
                            .min(STRIP_PALETTE_COLORS - 1);
                        out.u8(index as u8 + 1);
                    }
                }
            }
        }
    }

    Ok(out.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_row_colors() -> Vec<[u8; 4]> {
        // Row y is drawn with palette colour y % 2, rows past 40 transparent
        (0..STRIP_FRAME_WIDTH * STRIP_FRAME_HEIGHT)
            .map(|i| {
                let y = i / STRIP_FRAME_WIDTH;
                if y >= 40 {
                    [0, 0, 0, 0]
                } else if y % 2 == 0 {
                    [255, 0, 0, 255]
                } else {
                    [0, 0, 255, 255]
                }
            })
            .collect()
    }

    #[test]
    fn test_layout() {
        let palette = Palette::new(vec![[255, 0, 0], [0, 0, 255]]);
        let frames = vec![frame_with_row_colors(); 2];
        let bytes = write_animation_strip(&frames, &palette, Platform::Windows).unwrap();

        assert_eq!(bytes.len(), 4 + 512 + 2 * 64 * 48);
        assert_eq!(&bytes[0..4], &[2, 0, 0, 0]);
        assert_eq!(
            u16::from_le_bytes([bytes[4], bytes[5]]),
            pack_pc_color(0.5, 0.0, 0.5, false)
        );
        assert_eq!(u16::from_le_bytes([bytes[6], bytes[7]]), 31 << 10);
    }

    #[test]
    fn test_scan_line_interleave() {
        let palette = Palette::new(vec![[255, 0, 0], [0, 0, 255]]);
        let bytes =
            write_animation_strip(&[frame_with_row_colors()], &palette, Platform::Macintosh)
                .unwrap();
        let frame = &bytes[4 + 512..];

        // Pass 0 holds rows 0, 12, 24, 36 (all even -> red -> index 1)
        assert!(frame[0..256].iter().all(|&b| b == 1));
        // Pass 1 holds rows 1, 13, 25, 37 (all odd -> blue -> index 2)
        assert!(frame[256..512].iter().all(|&b| b == 2));
        // Pass 4's last line is row 40: transparent
        let pass4_last = 4 * 256 + 3 * 64;
        assert!(frame[pass4_last..pass4_last + 64].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_big_endian_header() {
        let palette = Palette::new(vec![[0, 0, 0]]);
        let frame = vec![[0, 0, 0, 0]; 64 * 48];
        let bytes = write_animation_strip(&[frame], &palette, Platform::Macintosh).unwrap();
        assert_eq!(&bytes[0..4], &[0, 0, 0, 1]);
    }

    #[test]
    fn test_frame_size_checked() {
        let palette = Palette::default();
        let frames = vec![vec![[0u8; 4]; 64 * 48], vec![[0u8; 4]; 10]];
        assert_eq!(
            write_animation_strip(&frames, &palette, Platform::Windows),
            Err(AnimationStripError::FrameSize {
                frame: 1,
                got: 10,
                expected: 64 * 48
            })
        );
        assert_eq!(
            write_animation_strip(&[], &palette, Platform::Windows),
            Err(AnimationStripError::NoFrames)
        );
    }
}
