//! Renderable primitives and their opcode encoding
//!
//! # Record layout (12 bytes)
//! ```text
//! 0x00: opcode u8 × 2
//! 0x02: face_reference u16  (face type byte offset, or star vertex count)
//! 0x04: vertex slots u8 × 4
//! 0x08: normal slots u8 × 4
//! ```
//!
//! Two quirks of the runtime's decoder are part of the format and must stay:
//! every non-triangle polygon shares the low opcode `4` in the first byte, and
//! the Macintosh build expects the second opcode byte bit-rotated (see
//! [`rotate_opcode`]).

use super::error::ModelError;
use crate::platform::Payload;

/// Size of one encoded primitive record
pub const PRIMITIVE_SIZE: usize = 12;

/// Opcode pair written for every star
pub const STAR_OPCODE: [u8; 2] = [0x0B, 0x08];

/// Kind tag of a star in the second opcode byte
pub const STAR_KIND_TAG: u8 = 0;

/// Material bitfield of a freshly created polygon
pub const DEFAULT_MATERIAL: u8 = 0b0100;

/// Largest 5-bit material bitfield
pub const MAX_MATERIAL: u8 = 0b1_1111;

/// Marks an unused vertex or normal slot
pub const UNUSED_SLOT: u8 = 0xFF;

/// Conversion between star speed units and seconds
const STAR_SECONDS_PER_UNIT: f32 = 0.1515188;
const STAR_SECONDS_OFFSET: f32 = 0.1040618;

/// Polygon kinds that reference a face type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolygonKind {
    Triangle = 3,
    Quad = 4,
    Billboard = 5,
    Line = 7,
}

impl PolygonKind {
    /// Numeric kind tag written into the second opcode byte
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Low bits of the first opcode byte
    pub fn low_opcode(self) -> u8 {
        match self {
            PolygonKind::Triangle => 3,
            PolygonKind::Quad | PolygonKind::Billboard | PolygonKind::Line => 4,
        }
    }

    pub fn supports_reflection(self) -> bool {
        matches!(self, PolygonKind::Triangle | PolygonKind::Quad)
    }
}

/// Macintosh permutation of the second opcode byte
pub fn rotate_opcode(value: u8) -> u8 {
    ((value & 0xF0) >> 4) | ((value & 0x0E) << 3) | ((value & 0x01) << 7)
}

/// Oscillation applied to a star
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarAnimation {
    pub color: [u8; 3],
    pub speed_units: u8,
}

impl StarAnimation {
    pub fn new(color: [u8; 3], speed_units: u8) -> Self {
        Self { color, speed_units }
    }

    /// Build from a period in seconds, clamped to the encodable range
    pub fn from_seconds(color: [u8; 3], seconds: f32) -> Self {
        let units = ((seconds - STAR_SECONDS_OFFSET) / STAR_SECONDS_PER_UNIT).round();
        if !(0.0..=255.0).contains(&units) {
            tracing::warn!(
                "star speed of {}s is outside the encodable range, clamping",
                seconds
            );
        }
        Self {
            color,
            speed_units: units.clamp(0.0, 255.0) as u8,
        }
    }

    pub fn seconds(&self) -> f32 {
        STAR_SECONDS_PER_UNIT * self.speed_units as f32 + STAR_SECONDS_OFFSET
    }
}

/// Point sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Star {
    /// Stored in the face reference field
    pub vertex_count: u16,
    pub vertices: [u8; 4],
    pub normals: [u8; 4],
    pub animation: Option<StarAnimation>,
}

impl Star {
    pub fn new(vertex_count: u16) -> Self {
        Self {
            vertex_count,
            vertices: [UNUSED_SLOT; 4],
            normals: [UNUSED_SLOT; 4],
            animation: None,
        }
    }

    pub fn with_vertices(mut self, vertices: [u8; 4]) -> Self {
        self.vertices = vertices;
        self
    }

    pub fn with_normals(mut self, normals: [u8; 4]) -> Self {
        self.normals = normals;
        self
    }

    pub fn with_animation(mut self, animation: StarAnimation) -> Self {
        self.animation = Some(animation);
        self
    }
}

/// Triangle, quad, billboard or line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Polygon {
    kind: PolygonKind,
    textured: bool,
    reflective: bool,
    material: u8,
    /// Index into the model's face type table
    pub face_type: usize,
    pub vertices: [u8; 4],
    pub normals: [u8; 4],
}

impl Polygon {
    pub fn new(kind: PolygonKind, face_type: usize) -> Self {
        Self {
            kind,
            textured: false,
            reflective: false,
            material: DEFAULT_MATERIAL,
            face_type,
            vertices: [UNUSED_SLOT; 4],
            normals: [UNUSED_SLOT; 4],
        }
    }

    pub fn kind(&self) -> PolygonKind {
        self.kind
    }

    pub fn textured(&self) -> bool {
        self.textured
    }

    pub fn set_textured(&mut self, textured: bool) {
        self.textured = textured;
    }

    pub fn reflective(&self) -> bool {
        self.reflective
    }

    /// Billboards and lines reject reflection
    pub fn set_reflective(&mut self, reflective: bool) -> Result<(), ModelError> {
        if reflective && !self.kind.supports_reflection() {
            return Err(ModelError::ReflectiveNotAllowed(self.kind));
        }
        self.reflective = reflective;
        Ok(())
    }

    pub fn material(&self) -> u8 {
        self.material
    }

    pub fn set_material(&mut self, material: u8) -> Result<(), ModelError> {
        if material > MAX_MATERIAL {
            return Err(ModelError::MaterialOutOfRange(material));
        }
        self.material = material;
        Ok(())
    }

    pub fn with_vertices(mut self, vertices: [u8; 4]) -> Self {
        self.vertices = vertices;
        self
    }

    pub fn with_normals(mut self, normals: [u8; 4]) -> Self {
        self.normals = normals;
        self
    }

    fn opcode(&self, rotate: bool) -> [u8; 2] {
        let mut first = self.material << 3;
        if self.textured {
            first |= 0x80;
        }
        first |= self.kind.low_opcode();

        let mut second = self.kind.tag();
        if self.reflective {
            second |= 0x80;
        }
        if rotate {
            second = rotate_opcode(second);
        }

        [first, second]
    }
}

/// One renderable primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Star(Star),
    Polygon(Polygon),
}

impl Primitive {
    pub fn is_reflective(&self) -> bool {
        match self {
            Primitive::Star(_) => false,
            Primitive::Polygon(polygon) => polygon.reflective,
        }
    }

    /// Numeric kind tag (star = 0)
    pub fn kind_tag(&self) -> u8 {
        match self {
            Primitive::Star(_) => STAR_KIND_TAG,
            Primitive::Polygon(polygon) => polygon.kind.tag(),
        }
    }

    /// Opcode pair, bit-rotated when `rotate` is set
    pub fn opcode(&self, rotate: bool) -> [u8; 2] {
        match self {
            Primitive::Star(_) => STAR_OPCODE,
            Primitive::Polygon(polygon) => polygon.opcode(rotate),
        }
    }

    pub fn vertices(&self) -> [u8; 4] {
        match self {
            Primitive::Star(star) => star.vertices,
            Primitive::Polygon(polygon) => polygon.vertices,
        }
    }

    pub fn normals(&self) -> [u8; 4] {
        match self {
            Primitive::Star(star) => star.normals,
            Primitive::Polygon(polygon) => polygon.normals,
        }
    }

    /// Write one record; `face_reference` is the resolved face type offset
    /// for polygons and is ignored for stars
    pub fn write(&self, out: &mut Payload, rotate: bool, face_reference: u16) {
        let reference = match self {
            Primitive::Star(star) => star.vertex_count,
            Primitive::Polygon(_) => face_reference,
        };
        out.bytes(&self.opcode(rotate))
            .u16(reference)
            .bytes(&self.vertices())
            .bytes(&self.normals());
    }
}

impl From<Star> for Primitive {
    fn from(star: Star) -> Self {
        Primitive::Star(star)
    }
}

impl From<Polygon> for Primitive {
    fn from(polygon: Polygon) -> Self {
        Primitive::Polygon(polygon)
    }
}
