//! Tagged, length-prefixed chunk framing
//!
//! # Layout
//! ```text
//! 0x00: tag u32          (four ASCII characters, read as a big-endian number)
//! 0x04: total_length u32 (payload length + 8)
//! 0x08: payload
//! ```
//!
//! Both header words are written in the target byte order, so on the
//! little-endian platforms the tag characters appear reversed in the file.
//! The payload is copied verbatim.
//!
//! Every chunk must be a multiple of 4 bytes long. The framer never pads:
//! a misaligned chunk is reported as an [`AlignmentWarning`] and written as is.

use std::fmt;

use crate::platform::{Endian, Payload};

/// Size of the tag + length header in bytes
pub const CHUNK_HEADER_SIZE: usize = 8;

/// Four-character chunk identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    pub const fn new(chars: &[u8; 4]) -> Self {
        Self(*chars)
    }

    /// Numeric value written into the chunk header
    pub const fn value(self) -> u32 {
        u32::from_be_bytes(self.0)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &c in &self.0 {
            if c.is_ascii_graphic() || c == b' ' {
                write!(f, "{}", c as char)?;
            } else {
                write!(f, "\\x{:02x}", c)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag(\"{}\")", self)
    }
}

/// A chunk whose total length is not a multiple of 4
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentWarning {
    pub tag: Tag,
    pub length: usize,
}

impl fmt::Display for AlignmentWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "chunk '{}' is {} bytes long, which is not a multiple of 4",
            self.tag, self.length
        )
    }
}

/// Frame `payload` with `tag` and its total length
///
/// Returns the framed bytes and, when the result is misaligned, the
/// diagnostic describing it.
pub fn frame_chunk(tag: Tag, endian: Endian, payload: &[u8]) -> (Vec<u8>, Option<AlignmentWarning>) {
    let length = payload.len() + CHUNK_HEADER_SIZE;

    let mut out = Payload::with_capacity(endian, length);
    out.u32(tag.value()).u32(length as u32).bytes(payload);

    let warning = if length % 4 != 0 {
        let warning = AlignmentWarning { tag, length };
        tracing::warn!("{}", warning);
        Some(warning)
    } else {
        None
    };

    (out.into_bytes(), warning)
}

/// Accumulates framed chunks into one resource and collects diagnostics
#[derive(Debug)]
pub struct ChunkWriter {
    endian: Endian,
    bytes: Vec<u8>,
    warnings: Vec<AlignmentWarning>,
}

impl ChunkWriter {
    pub fn new(endian: Endian) -> Self {
        Self {
            endian,
            bytes: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Start a payload in this writer's byte order
    pub fn payload(&self) -> Payload {
        Payload::new(self.endian)
    }

    /// Frame and append one chunk
    pub fn chunk(&mut self, tag: Tag, payload: &[u8]) {
        let (framed, warning) = frame_chunk(tag, self.endian, payload);
        tracing::debug!("chunk '{}': {} bytes", tag, framed.len());
        self.bytes.extend_from_slice(&framed);
        self.warnings.extend(warning);
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn warnings(&self) -> &[AlignmentWarning] {
        &self.warnings
    }

    /// Consume the writer, returning the resource bytes and any diagnostics
    pub fn finish(self) -> (Vec<u8>, Vec<AlignmentWarning>) {
        (self.bytes, self.warnings)
    }
}
