//! Target platforms and byte-order aware payload writing
//!
//! The runtime shipped on three platforms. The two PC-class targets read
//! little-endian data, the Macintosh build reads big-endian data. Every
//! multi-byte field in every format goes through [`Payload`] so the byte
//! order is decided in exactly one place.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Byte order of multi-byte fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endian {
    Little,
    Big,
}

/// Platform an asset is exported for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Playstation = 0,
    Windows = 1,
    Macintosh = 2,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Playstation, Platform::Windows, Platform::Macintosh];

    /// Byte order used by this platform's loader
    pub fn endian(self) -> Endian {
        match self {
            Platform::Playstation | Platform::Windows => Endian::Little,
            Platform::Macintosh => Endian::Big,
        }
    }

    /// Numeric platform tag stored in model headers
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Whether polygon opcodes are bit-rotated for this platform
    pub fn rotates_opcodes(self) -> bool {
        self == Platform::Macintosh
    }

    pub fn name(self) -> &'static str {
        match self {
            Platform::Playstation => "playstation",
            Platform::Windows => "windows",
            Platform::Macintosh => "macintosh",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a platform name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform '{0}' (expected playstation, windows or macintosh)")]
pub struct PlatformParseError(pub String);

impl FromStr for Platform {
    type Err = PlatformParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ps1" | "psx" | "playstation" => Ok(Platform::Playstation),
            "win" | "pc" | "windows" => Ok(Platform::Windows),
            "mac" | "macintosh" => Ok(Platform::Macintosh),
            _ => Err(PlatformParseError(s.to_string())),
        }
    }
}

/// Growable byte buffer that writes multi-byte fields in a fixed byte order
#[derive(Debug, Clone)]
pub struct Payload {
    bytes: Vec<u8>,
    endian: Endian,
}

impl Payload {
    pub fn new(endian: Endian) -> Self {
        Self {
            bytes: Vec::new(),
            endian,
        }
    }

    pub fn with_capacity(endian: Endian, capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            endian,
        }
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn u8(&mut self, value: u8) -> &mut Self {
        self.bytes.push(value);
        self
    }

    pub fn i8(&mut self, value: i8) -> &mut Self {
        self.bytes.push(value as u8);
        self
    }

    pub fn bytes(&mut self, values: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(values);
        self
    }

    pub fn u16(&mut self, value: u16) -> &mut Self {
        let mut buf = [0u8; 2];
        match self.endian {
            Endian::Little => LittleEndian::write_u16(&mut buf, value),
            Endian::Big => BigEndian::write_u16(&mut buf, value),
        }
        self.bytes(&buf)
    }

    pub fn i16(&mut self, value: i16) -> &mut Self {
        let mut buf = [0u8; 2];
        match self.endian {
            Endian::Little => LittleEndian::write_i16(&mut buf, value),
            Endian::Big => BigEndian::write_i16(&mut buf, value),
        }
        self.bytes(&buf)
    }

    pub fn u32(&mut self, value: u32) -> &mut Self {
        let mut buf = [0u8; 4];
        match self.endian {
            Endian::Little => LittleEndian::write_u32(&mut buf, value),
            Endian::Big => BigEndian::write_u32(&mut buf, value),
        }
        self.bytes(&buf)
    }

    /// Append `count` copies of `value`
    pub fn fill(&mut self, value: u8, count: usize) -> &mut Self {
        self.bytes.resize(self.bytes.len() + count, value);
        self
    }
}
