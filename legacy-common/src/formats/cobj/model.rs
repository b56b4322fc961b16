//! Object model (.cobj) assembly
//!
//! # Chunk order
//! ```text
//! 4DGI  header
//! 3DTL  face types
//! 3DQL  primitives
//! 3DAL  star animations        (only if a star is animated)
//! 3DRF  position buffer ids per frame
//! 3DRF  normal buffer ids per frame
//! 3DRF  length buffer ids per frame
//! 4DVL  position buffers       (one chunk per buffer)
//! 4DNL  normal buffers         (one chunk per buffer)
//! 3DRL  length buffers         (one chunk per buffer)
//! 3DBB  bounding boxes         (one record per frame)
//! AnmD  animation timing       (only if there is more than one frame)
//! ```
//!
//! # Header payload (52 bytes)
//! ```text
//! 0x00: version u32 = 1
//! 0x04: frame_count u16
//! 0x06: platform u8
//! 0x07: flags u8
//! 0x08: reserved u32 × 3
//! 0x14: constants u32 × 5
//! 0x28: child_vertex u8 × 4  (0xFF = unused)
//! 0x2C: constants u32 × 2
//! ```

use bitflags::bitflags;

use super::bounds::BoundingBox;
use super::buffers::{
    BufferCategory, BufferTables, LengthBuffer, MAX_FRAMES, NormalBuffer, PositionBuffer,
};
use super::child::{ChildAttachment, MAX_CHILD_ATTACHMENTS, resolve_child_vertices};
use super::error::ModelError;
use super::face_type::{FaceType, FaceTypeTable};
use super::primitive::Primitive;
use crate::chunk::{AlignmentWarning, ChunkWriter, Tag};
use crate::platform::{Payload, Platform};

pub const HEADER_TAG: Tag = Tag::new(b"4DGI");
pub const FACE_TYPE_TAG: Tag = Tag::new(b"3DTL");
pub const PRIMITIVE_TAG: Tag = Tag::new(b"3DQL");
pub const STAR_ANIMATION_TAG: Tag = Tag::new(b"3DAL");
pub const FRAME_TABLE_TAG: Tag = Tag::new(b"3DRF");
pub const POSITION_TAG: Tag = Tag::new(b"4DVL");
pub const NORMAL_TAG: Tag = Tag::new(b"4DNL");
pub const LENGTH_TAG: Tag = Tag::new(b"3DRL");
pub const BOUNDING_BOX_TAG: Tag = Tag::new(b"3DBB");
pub const ANIMATION_TAG: Tag = Tag::new(b"AnmD");

/// Leading header word
pub const HEADER_VERSION: u32 = 1;

/// Fixed words following the reserved block
const HEADER_CONSTANTS: [u32; 5] = [0x0000_0001, 0x0000_0000, 0x0000_0000, 0x0000_1000, 0x0000_0000];

/// Fixed words following the child vertex indices
const HEADER_TRAILER: [u32; 2] = [0x0000_0000, 0x0000_0001];

/// Leading word of the primitive table
const PRIMITIVE_TABLE_VERSION: u32 = 1;

/// Playback modes of the two timing records
const TIMING_MODE_LOOP: u16 = 1;
const TIMING_MODE_HOLD: u16 = 0;

bitflags! {
    /// Header scene flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HeaderFlags: u8 {
        const ALWAYS = 0b0000_0010;
        const ANIMATED = 0b0000_0100;
        const ENVIRONMENT_MAP = 0b0000_1000;
        const SEMI_TRANSPARENT_ENVIRONMENT_MAP = 0b0001_0000;
    }
}

/// Frame pacing written to the animation chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationTiming {
    /// Runtime ticks each frame stays on screen
    pub ticks_per_frame: u16,
}

impl Default for AnimationTiming {
    fn default() -> Self {
        Self { ticks_per_frame: 2 }
    }
}

/// Result of a successful encode
#[derive(Debug, Clone)]
pub struct EncodedModel {
    pub bytes: Vec<u8>,
    /// Chunks written with a length that is not a multiple of 4
    pub warnings: Vec<AlignmentWarning>,
}

/// Complete scene description of one object model
#[derive(Debug, Clone, Default)]
pub struct Model {
    face_types: FaceTypeTable,
    primitives: Vec<Primitive>,
    buffers: BufferTables,
    attachments: Vec<ChildAttachment>,
    pub semi_transparent_environment_map: bool,
    pub timing: AnimationTiming,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a face type, returning the index primitives refer to
    pub fn add_face_type(&mut self, face_type: FaceType) -> usize {
        self.face_types.push(face_type)
    }

    pub fn face_types(&self) -> &FaceTypeTable {
        &self.face_types
    }

    /// Append a primitive, returning its index
    pub fn add_primitive(&mut self, primitive: impl Into<Primitive>) -> usize {
        self.primitives.push(primitive.into());
        self.primitives.len() - 1
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Whether any primitive is reflective
    pub fn has_environment_map(&self) -> bool {
        self.primitives.iter().any(Primitive::is_reflective)
    }

    /// Allocate `frame_count` frames with fresh buffers of the given sizes
    pub fn allocate_frames(
        &mut self,
        frame_count: usize,
        position_count: usize,
        normal_count: usize,
        length_count: usize,
    ) -> Result<(), ModelError> {
        self.buffers
            .allocate_frames(frame_count, position_count, normal_count, length_count)
    }

    pub fn frame_count(&self) -> usize {
        self.buffers.frame_count()
    }

    pub fn buffers(&self) -> &BufferTables {
        &self.buffers
    }

    pub fn positions(&self, frame: usize) -> Result<&PositionBuffer, ModelError> {
        self.buffers.positions_of(frame)
    }

    pub fn positions_mut(&mut self, frame: usize) -> Result<&mut PositionBuffer, ModelError> {
        self.buffers.positions_of_mut(frame)
    }

    pub fn normals_mut(&mut self, frame: usize) -> Result<&mut NormalBuffer, ModelError> {
        self.buffers.normals_of_mut(frame)
    }

    pub fn lengths_mut(&mut self, frame: usize) -> Result<&mut LengthBuffer, ModelError> {
        self.buffers.lengths_of_mut(frame)
    }

    /// Register a child attachment point; frames must already be allocated
    pub fn add_child_attachment(&mut self, attachment: ChildAttachment) -> Result<usize, ModelError> {
        let frames = self.frame_count();
        if frames == 0 {
            return Err(ModelError::NoFrames);
        }
        if attachment.positions().len() != frames {
            return Err(ModelError::AttachmentFrameMismatch {
                got: attachment.positions().len(),
                frames,
            });
        }
        if self.attachments.len() == MAX_CHILD_ATTACHMENTS {
            return Err(ModelError::TooManyAttachments {
                limit: MAX_CHILD_ATTACHMENTS,
            });
        }
        self.attachments.push(attachment);
        Ok(self.attachments.len() - 1)
    }

    pub fn child_attachments(&self) -> &[ChildAttachment] {
        &self.attachments
    }

    /// Resolve attachment points to position indices, appending as needed
    pub fn resolve_child_vertices(&mut self) -> Result<[u8; MAX_CHILD_ATTACHMENTS], ModelError> {
        resolve_child_vertices(&mut self.buffers, &self.attachments)
    }

    /// Bounding box of every frame, in frame order
    pub fn bounding_boxes(&self) -> Result<Vec<BoundingBox>, ModelError> {
        (0..self.frame_count())
            .map(|frame| Ok(BoundingBox::from_positions(self.positions(frame)?.as_slice())))
            .collect()
    }

    pub fn header_flags(&self) -> HeaderFlags {
        let mut flags = HeaderFlags::ALWAYS;
        if self.has_environment_map() {
            flags |= HeaderFlags::ENVIRONMENT_MAP;
            if self.semi_transparent_environment_map {
                flags |= HeaderFlags::SEMI_TRANSPARENT_ENVIRONMENT_MAP;
            }
        }
        if self.frame_count() > 1 {
            flags |= HeaderFlags::ANIMATED;
        }
        flags
    }

    /// Face reference of every primitive: the face type byte offset for
    /// polygons, 0 for stars (which store their vertex count instead)
    fn face_references(&self) -> Result<Vec<u16>, ModelError> {
        let offsets = self.face_types.offsets();
        self.primitives
            .iter()
            .enumerate()
            .map(|(i, primitive)| match primitive {
                Primitive::Star(_) => Ok(0),
                Primitive::Polygon(polygon) => {
                    let offset = *offsets.get(polygon.face_type).ok_or(
                        ModelError::FaceTypeOutOfRange {
                            primitive: i,
                            face_type: polygon.face_type,
                            count: offsets.len(),
                        },
                    )?;
                    u16::try_from(offset).map_err(|_| ModelError::FaceTypeOffsetOverflow {
                        face_type: polygon.face_type,
                        offset,
                    })
                }
            })
            .collect()
    }

    /// Assemble the complete resource for `platform`
    ///
    /// Resolving child vertices may grow the position buffers; bounding boxes
    /// and face offsets are recomputed from the resulting contents. On error
    /// nothing is returned and the model is left as it was.
    pub fn encode(&mut self, platform: Platform) -> Result<EncodedModel, ModelError> {
        let frame_count =
            u16::try_from(self.frame_count()).map_err(|_| ModelError::TooManyFrames {
                requested: self.frame_count(),
                limit: MAX_FRAMES,
            })?;
        let face_references = self.face_references()?;

        // Resolve against a copy, committed once nothing else can fail
        let mut buffers = self.buffers.clone();
        let child_vertices = resolve_child_vertices(&mut buffers, &self.attachments)?;
        buffers.validate()?;

        let mut writer = ChunkWriter::new(platform.endian());
        let stars = self.star_animation_payload(&writer)?;

        self.buffers = buffers;
        let bounding_boxes = self.bounding_boxes()?;

        // Header
        let mut header = writer.payload();
        header
            .u32(HEADER_VERSION)
            .u16(frame_count)
            .u8(platform.tag())
            .u8(self.header_flags().bits());
        for _ in 0..3 {
            header.u32(0);
        }
        for word in HEADER_CONSTANTS {
            header.u32(word);
        }
        header.bytes(&child_vertices);
        for word in HEADER_TRAILER {
            header.u32(word);
        }
        writer.chunk(HEADER_TAG, header.as_bytes());

        // Face types
        let mut face_types = writer.payload();
        self.face_types.write(&mut face_types);
        writer.chunk(FACE_TYPE_TAG, face_types.as_bytes());

        // Primitives
        let rotate = platform.rotates_opcodes();
        let mut primitives = writer.payload();
        primitives
            .u32(PRIMITIVE_TABLE_VERSION)
            .u32(self.primitives.len() as u32);
        for (primitive, &reference) in self.primitives.iter().zip(&face_references) {
            primitive.write(&mut primitives, rotate, reference);
        }
        writer.chunk(PRIMITIVE_TAG, primitives.as_bytes());

        // Star animations
        if let Some(stars) = stars {
            writer.chunk(STAR_ANIMATION_TAG, stars.as_bytes());
        }

        // Frame tables
        for category in [
            BufferCategory::Position,
            BufferCategory::Normal,
            BufferCategory::Length,
        ] {
            let mut table = writer.payload();
            self.buffers.write_frame_table(category, &mut table);
            writer.chunk(FRAME_TABLE_TAG, table.as_bytes());
        }

        // Buffers
        for (id, buffer) in self.buffers.positions.iter() {
            let mut payload = writer.payload();
            buffer.write(id.raw(), &mut payload);
            writer.chunk(POSITION_TAG, payload.as_bytes());
        }
        for (id, buffer) in self.buffers.normals.iter() {
            let mut payload = writer.payload();
            buffer.write(id.raw(), &mut payload);
            writer.chunk(NORMAL_TAG, payload.as_bytes());
        }
        for (id, buffer) in self.buffers.lengths.iter() {
            let mut payload = writer.payload();
            buffer.write(id.raw(), &mut payload);
            writer.chunk(LENGTH_TAG, payload.as_bytes());
        }

        // Bounding boxes
        let mut boxes = writer.payload();
        boxes.u32(bounding_boxes.len() as u32);
        for bbox in &bounding_boxes {
            bbox.write(&mut boxes);
        }
        writer.chunk(BOUNDING_BOX_TAG, boxes.as_bytes());

        // Animation timing
        if frame_count > 1 {
            let mut timing = writer.payload();
            self.write_timing(&mut timing, frame_count - 1);
            writer.chunk(ANIMATION_TAG, timing.as_bytes());
        }

        let (bytes, warnings) = writer.finish();
        tracing::debug!(
            "encoded model for {}: {} bytes, {} frames, {} primitives",
            platform,
            bytes.len(),
            self.frame_count(),
            self.primitives.len()
        );
        Ok(EncodedModel { bytes, warnings })
    }

    /// Entries: primitive index, speed, first three vertex slots, colour
    fn star_animation_payload(&self, writer: &ChunkWriter) -> Result<Option<Payload>, ModelError> {
        let mut entries = Vec::new();
        for (i, primitive) in self.primitives.iter().enumerate() {
            let Primitive::Star(star) = primitive else {
                continue;
            };
            if let Some(animation) = star.animation {
                let index = u8::try_from(i).map_err(|_| ModelError::StarIndexOverflow(i))?;
                entries.push((index, star.vertices, animation));
            }
        }
        if entries.is_empty() {
            return Ok(None);
        }

        let mut payload = writer.payload();
        payload.u32(entries.len() as u32);
        for (index, vertices, animation) in entries {
            payload
                .u8(index)
                .u8(animation.speed_units)
                .bytes(&vertices[..3])
                .bytes(&animation.color);
        }
        Ok(Some(payload))
    }

    /// Two records, both looping over frames `0..=frame_count - 1`
    fn write_timing(&self, out: &mut Payload, last_frame: u16) {
        out.u32(2);
        for mode in [TIMING_MODE_LOOP, TIMING_MODE_HOLD] {
            out.u16(0)
                .u16(last_frame)
                .u16(self.timing.ticks_per_frame)
                .u16(mode);
        }
    }
}
