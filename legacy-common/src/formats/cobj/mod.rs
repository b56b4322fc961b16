//! Object model binary format (.cobj)
//!
//! A model is a chunked resource (see [`crate::chunk`]) describing polygon
//! geometry with per-frame vertex animation. Build a [`Model`], fill its
//! buffers, then call [`Model::encode`] once per target platform.

mod bounds;
mod buffers;
mod child;
mod error;
mod face_type;
mod model;
mod primitive;

pub use bounds::{BOUNDING_BOX_SIZE, BoundingBox};
pub use buffers::{
    Arena, BufferCategory, BufferId, BufferTables, DEFAULT_NORMAL, FrameRecord, GeometryBuffer,
    GeometryKind, LengthBuffer, MAX_FRAMES, MAX_POSITIONS, NormalBuffer, NormalKind, PositionBuffer,
    PositionKind,
};
pub use child::{ChildAttachment, MAX_CHILD_ATTACHMENTS, NO_CHILD_VERTEX, resolve_child_vertices};
pub use error::ModelError;
pub use face_type::{
    FACE_TYPE_BASE_SIZE, FACE_TYPE_TEXTURED_SIZE, FaceType, FaceTypeFlags, FaceTypeTable,
};
pub use model::{
    ANIMATION_TAG, AnimationTiming, BOUNDING_BOX_TAG, EncodedModel, FACE_TYPE_TAG,
    FRAME_TABLE_TAG, HEADER_TAG, HEADER_VERSION, HeaderFlags, LENGTH_TAG, Model, NORMAL_TAG,
    POSITION_TAG, PRIMITIVE_TAG, STAR_ANIMATION_TAG,
};
pub use primitive::{
    DEFAULT_MATERIAL, MAX_MATERIAL, PRIMITIVE_SIZE, Polygon, PolygonKind, Primitive, STAR_OPCODE,
    Star, StarAnimation, UNUSED_SLOT, rotate_opcode,
};
