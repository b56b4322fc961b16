//! Legacy runtime binary asset formats
//!
//! All formats are write-only. Byte order follows the target [`Platform`];
//! chunked formats are framed with [`crate::chunk`].
//!
//! [`Platform`]: crate::platform::Platform

pub mod anm;
pub mod cbmp;
pub mod cobj;
pub mod pfnt;

pub use anm::*;
pub use cbmp::*;
pub use cobj::*;
pub use pfnt::*;

/// File extension for object models
pub const MODEL_EXT: &str = "cobj";

/// File extension for bitmaps
pub const BITMAP_EXT: &str = "cbmp";

/// File extension for bitmap fonts
pub const FONT_EXT: &str = "pfnt";

/// File extension for frame animation strips
pub const ANIMATION_EXT: &str = "anm";
