//! Shared types and binary formats for the legacy mission runtime
//!
//! This crate provides the write-side of every asset format consumed by the
//! runtime and is shared between:
//! - `legacy-export` (asset pipeline CLI)
//! - scene generators that build models in code
//!
//! # Modules
//!
//! - [`platform`] - Target platforms, byte order and the payload writer
//! - [`chunk`] - Tagged, length-prefixed chunk framing
//! - [`color`] - 15-bit colour packing for both colour layouts
//! - [`quantize`] - Palette quantization interface
//! - [`formats`] - Model (`.cobj`), bitmap (`.cbmp`), font (`.pfnt`) and
//!   animation strip (`.anm`) writers

pub mod chunk;
pub mod color;
pub mod formats;
pub mod platform;
pub mod quantize;

// Re-export the pieces every exporter touches
pub use chunk::{AlignmentWarning, ChunkWriter, Tag, frame_chunk};
pub use color::{pack_pc_color, pack_playstation_color};
pub use platform::{Endian, Payload, Platform, PlatformParseError};
pub use quantize::{Palette, Quantizer, Rgb};

// Re-export commonly used format items
pub use formats::{
    // Model types
    AnimationTiming,
    BoundingBox,
    ChildAttachment,
    EncodedModel,
    FaceType,
    Model,
    ModelError,
    Polygon,
    PolygonKind,
    Primitive,
    Star,
    StarAnimation,
    // Other formats
    AnimationStripError,
    BitmapError,
    FontError,
    Glyph,
    write_animation_strip,
    write_bitmap,
    write_font,
};
