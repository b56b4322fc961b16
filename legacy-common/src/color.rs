//! 15-bit colour packing
//!
//! Colours are five bits per channel plus a semi-transparency bit:
//!
//! ```text
//! PC layout:          [15] stp  [14..10] red   [9..5] green  [4..0] blue
//! Playstation layout: [15] stp  [14..10] blue  [9..5] green  [4..0] red
//! ```
//!
//! Channels are given as fractions in `0.0..=1.0` and truncated to five
//! bits (`min(v * 32, 31)`).

/// Convert a normalized channel into five bits
pub fn channel_bits(value: f32) -> u16 {
    ((value.max(0.0) * 32.0) as u16).min(31)
}

/// Convert an 8-bit channel into a fraction in `0.0..=1.0`
pub fn unit(value: u8) -> f32 {
    value as f32 / 255.0
}

/// Pack a colour in the PC layout (red in the high bits)
pub fn pack_pc_color(red: f32, green: f32, blue: f32, semi_transparent: bool) -> u16 {
    channel_bits(blue)
        | (channel_bits(green) << 5)
        | (channel_bits(red) << 10)
        | ((semi_transparent as u16) << 15)
}

/// Pack a colour in the Playstation layout (red in the low bits)
pub fn pack_playstation_color(red: f32, green: f32, blue: f32, semi_transparent: bool) -> u16 {
    channel_bits(red)
        | (channel_bits(green) << 5)
        | (channel_bits(blue) << 10)
        | ((semi_transparent as u16) << 15)
}

/// Pack an 8-bit RGB triple in the PC layout
pub fn pc_rgb(rgb: [u8; 3], semi_transparent: bool) -> u16 {
    pack_pc_color(unit(rgb[0]), unit(rgb[1]), unit(rgb[2]), semi_transparent)
}

/// Pack an 8-bit RGB triple in the Playstation layout
pub fn playstation_rgb(rgb: [u8; 3], semi_transparent: bool) -> u16 {
    pack_playstation_color(unit(rgb[0]), unit(rgb[1]), unit(rgb[2]), semi_transparent)
}
