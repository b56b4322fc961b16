use super::buffers::BufferCategory;
use super::primitive::PolygonKind;

/// Errors raised while building or encoding a model
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Reflective surfaces only exist on triangles and quads
    #[error("{0:?} primitives cannot be reflective")]
    ReflectiveNotAllowed(PolygonKind),

    /// Material bitfield must fit in 5 bits
    #[error("material bitfield {0} does not fit in 5 bits (0-31)")]
    MaterialOutOfRange(u8),

    /// Primitive references a face type that does not exist
    #[error("primitive {primitive} references face type {face_type}, but only {count} are defined")]
    FaceTypeOutOfRange {
        primitive: usize,
        face_type: usize,
        count: usize,
    },

    /// Face type byte offset no longer fits the 16-bit reference field
    #[error("face type {face_type} sits at byte offset {offset}, beyond the 16-bit reference range")]
    FaceTypeOffsetOverflow { face_type: usize, offset: usize },

    /// Animated star sits past the 8-bit primitive index range
    #[error("animated star at primitive index {0} cannot be addressed with one byte")]
    StarIndexOverflow(usize),

    /// Position buffer would hold more entries than a byte index can address
    #[error("position buffer would grow to {requested} entries (limit {limit})")]
    Capacity { requested: usize, limit: usize },

    /// Frame count must fit the 16-bit header field
    #[error("model would have {requested} frames (limit {limit})")]
    TooManyFrames { requested: usize, limit: usize },

    /// Header only has room for four child vertices
    #[error("at most {limit} child attachment points are supported")]
    TooManyAttachments { limit: usize },

    /// Attachment points need exactly one position per frame
    #[error("attachment point has {got} positions but the model has {frames} frames")]
    AttachmentFrameMismatch { got: usize, frames: usize },

    /// Frames were allocated twice, or attachments were added before frames
    #[error("frames are already allocated")]
    FramesAlreadyAllocated,

    /// Encoding needs at least one frame
    #[error("model has no frames")]
    NoFrames,

    /// A frame's buffer disagrees in length with frame 0
    #[error("{category} buffer of frame {frame} has {got} entries, expected {expected}")]
    BufferLengthMismatch {
        category: BufferCategory,
        frame: usize,
        expected: usize,
        got: usize,
    },

    /// Frame index past the allocated frames
    #[error("frame {frame} does not exist (model has {frames} frames)")]
    FrameOutOfRange { frame: usize, frames: usize },

    /// Buffer slot past the buffer's fixed capacity
    #[error("{category} slot {index} is out of range (buffer holds {len})")]
    SlotOutOfRange {
        category: BufferCategory,
        index: usize,
        len: usize,
    },
}
