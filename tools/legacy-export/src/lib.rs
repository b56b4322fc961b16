//! legacy-export library
//!
//! Provides asset conversion functions for use by other tools (e.g. scene
//! generators that want the encoded bytes without touching the filesystem).

pub mod anim;
pub mod bitmap;
pub mod font;
pub mod manifest;
pub mod model;
pub mod quantize;
pub mod scene;

// Re-export the shared format crate
pub use legacy_common::Platform;
pub use legacy_common::formats::{ANIMATION_EXT, BITMAP_EXT, FONT_EXT, MODEL_EXT};

// Re-export key conversion entry points
pub use anim::{convert_strip, convert_strip_to_memory};
pub use bitmap::{convert_image, convert_image_to_memory};
pub use font::{FontDescription, convert_font, convert_font_to_memory};
pub use model::{convert_scene, convert_scene_to_memory};
pub use quantize::MedianCut;
pub use scene::{Scene, load_scene};
