//! Per-frame geometry buffers and the frame indirection tables
//!
//! Each animation frame binds one position, one normal and one length
//! buffer. Buffers live in per-category arenas and are referred to by typed
//! identifiers; the numeric identifier (starting at 1, 0 is reserved) is
//! what the frame tables store in the file.

use std::fmt;
use std::marker::PhantomData;

use super::error::ModelError;
use crate::platform::Payload;

/// Position buffers are indexed by a single byte
pub const MAX_POSITIONS: usize = 256;

/// Frame count is stored as a u16
pub const MAX_FRAMES: usize = u16::MAX as usize;

/// Placeholder normal of unit length along X
pub const DEFAULT_NORMAL: [i16; 3] = [4096, 0, 0];

/// Buffer category, used for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferCategory {
    Position,
    Normal,
    Length,
}

impl fmt::Display for BufferCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BufferCategory::Position => "position",
            BufferCategory::Normal => "normal",
            BufferCategory::Length => "length",
        })
    }
}

/// Typed identifier of a buffer inside an [`Arena`]
pub struct BufferId<T> {
    raw: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> BufferId<T> {
    fn from_index(index: usize) -> Self {
        Self {
            raw: index as u32 + 1,
            _marker: PhantomData,
        }
    }

    /// Numeric identifier written to the file (never 0)
    pub fn raw(self) -> u32 {
        self.raw
    }

    fn index(self) -> usize {
        self.raw as usize - 1
    }
}

impl<T> Clone for BufferId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for BufferId<T> {}

impl<T> PartialEq for BufferId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for BufferId<T> {}

impl<T> fmt::Debug for BufferId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BufferId({})", self.raw)
    }
}

/// Insertion-ordered storage handing out typed identifiers
#[derive(Debug, Clone)]
pub struct Arena<T> {
    items: Vec<T>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Arena<T> {
    pub fn alloc(&mut self, item: T) -> BufferId<T> {
        self.items.push(item);
        BufferId::from_index(self.items.len() - 1)
    }

    pub fn get(&self, id: BufferId<T>) -> &T {
        &self.items[id.index()]
    }

    pub fn get_mut(&mut self, id: BufferId<T>) -> &mut T {
        &mut self.items[id.index()]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BufferId<T>, &T)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (BufferId::from_index(i), item))
    }
}

/// Category marker for [`GeometryBuffer`]
pub trait GeometryKind {
    const CATEGORY: BufferCategory;
    const DEFAULT: [i16; 3];
}

#[derive(Debug, Clone, Copy)]
pub enum PositionKind {}

#[derive(Debug, Clone, Copy)]
pub enum NormalKind {}

impl GeometryKind for PositionKind {
    const CATEGORY: BufferCategory = BufferCategory::Position;
    const DEFAULT: [i16; 3] = [0, 0, 0];
}

impl GeometryKind for NormalKind {
    const CATEGORY: BufferCategory = BufferCategory::Normal;
    const DEFAULT: [i16; 3] = DEFAULT_NORMAL;
}

/// Fixed-capacity buffer of 3-component vectors
///
/// Entries are written as `x, y, z, 0` (four `i16`, 8 bytes each).
#[derive(Debug, Clone)]
pub struct GeometryBuffer<K> {
    entries: Vec<[i16; 3]>,
    _kind: PhantomData<K>,
}

pub type PositionBuffer = GeometryBuffer<PositionKind>;
pub type NormalBuffer = GeometryBuffer<NormalKind>;

impl<K: GeometryKind> GeometryBuffer<K> {
    pub fn new(len: usize) -> Self {
        Self {
            entries: vec![K::DEFAULT; len],
            _kind: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[[i16; 3]] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<[i16; 3]> {
        self.entries.get(index).copied()
    }

    pub fn set(&mut self, index: usize, value: [i16; 3]) -> Result<(), ModelError> {
        let len = self.entries.len();
        let slot = self.entries.get_mut(index).ok_or(ModelError::SlotOutOfRange {
            category: K::CATEGORY,
            index,
            len,
        })?;
        *slot = value;
        Ok(())
    }

    /// Grow by one entry; only the child vertex allocator appends
    pub(crate) fn push(&mut self, value: [i16; 3]) -> usize {
        self.entries.push(value);
        self.entries.len() - 1
    }

    pub fn write(&self, id: u32, out: &mut Payload) {
        out.u32(id).u32(self.entries.len() as u32);
        for &[x, y, z] in &self.entries {
            out.i16(x).i16(y).i16(z).i16(0);
        }
    }
}

/// Fixed-capacity buffer of scalar lengths
#[derive(Debug, Clone)]
pub struct LengthBuffer {
    entries: Vec<i16>,
}

impl LengthBuffer {
    pub fn new(len: usize) -> Self {
        Self {
            entries: vec![0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[i16] {
        &self.entries
    }

    pub fn set(&mut self, index: usize, value: i16) -> Result<(), ModelError> {
        let len = self.entries.len();
        let slot = self.entries.get_mut(index).ok_or(ModelError::SlotOutOfRange {
            category: BufferCategory::Length,
            index,
            len,
        })?;
        *slot = value;
        Ok(())
    }

    /// Entries are 2 bytes; an odd count is padded with one zero entry
    pub fn write(&self, id: u32, out: &mut Payload) {
        out.u32(id).u32(self.entries.len() as u32);
        for &length in &self.entries {
            out.i16(length);
        }
        if self.entries.len() % 2 != 0 {
            out.i16(0);
        }
    }
}

/// Buffers bound to one animation frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRecord {
    pub position: BufferId<PositionBuffer>,
    pub normal: BufferId<NormalBuffer>,
    pub length: BufferId<LengthBuffer>,
}

/// Buffer arenas plus the frame → buffer indirection
#[derive(Debug, Clone, Default)]
pub struct BufferTables {
    pub positions: Arena<PositionBuffer>,
    pub normals: Arena<NormalBuffer>,
    pub lengths: Arena<LengthBuffer>,
    frames: Vec<FrameRecord>,
}

impl BufferTables {
    /// Create `frame_count` frames, each with freshly allocated buffers
    pub fn allocate_frames(
        &mut self,
        frame_count: usize,
        position_count: usize,
        normal_count: usize,
        length_count: usize,
    ) -> Result<(), ModelError> {
        if !self.frames.is_empty() {
            return Err(ModelError::FramesAlreadyAllocated);
        }
        if frame_count > MAX_FRAMES {
            return Err(ModelError::TooManyFrames {
                requested: frame_count,
                limit: MAX_FRAMES,
            });
        }
        if position_count > MAX_POSITIONS {
            return Err(ModelError::Capacity {
                requested: position_count,
                limit: MAX_POSITIONS,
            });
        }

        for _ in 0..frame_count {
            let record = FrameRecord {
                position: self.positions.alloc(PositionBuffer::new(position_count)),
                normal: self.normals.alloc(NormalBuffer::new(normal_count)),
                length: self.lengths.alloc(LengthBuffer::new(length_count)),
            };
            self.frames.push(record);
        }
        tracing::debug!(
            "allocated {} frames ({} positions, {} normals, {} lengths)",
            frame_count,
            position_count,
            normal_count,
            length_count
        );
        Ok(())
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    pub fn frame(&self, frame: usize) -> Result<FrameRecord, ModelError> {
        self.frames
            .get(frame)
            .copied()
            .ok_or(ModelError::FrameOutOfRange {
                frame,
                frames: self.frames.len(),
            })
    }

    pub fn positions_of(&self, frame: usize) -> Result<&PositionBuffer, ModelError> {
        Ok(self.positions.get(self.frame(frame)?.position))
    }

    pub fn positions_of_mut(&mut self, frame: usize) -> Result<&mut PositionBuffer, ModelError> {
        let id = self.frame(frame)?.position;
        Ok(self.positions.get_mut(id))
    }

    pub fn normals_of_mut(&mut self, frame: usize) -> Result<&mut NormalBuffer, ModelError> {
        let id = self.frame(frame)?.normal;
        Ok(self.normals.get_mut(id))
    }

    pub fn lengths_of_mut(&mut self, frame: usize) -> Result<&mut LengthBuffer, ModelError> {
        let id = self.frame(frame)?.length;
        Ok(self.lengths.get_mut(id))
    }

    /// Every frame's buffers must match frame 0's lengths
    pub fn validate(&self) -> Result<(), ModelError> {
        let Some(first) = self.frames.first() else {
            return Err(ModelError::NoFrames);
        };
        let expected = [
            self.positions.get(first.position).len(),
            self.normals.get(first.normal).len(),
            self.lengths.get(first.length).len(),
        ];

        for (frame, record) in self.frames.iter().enumerate().skip(1) {
            let got = [
                self.positions.get(record.position).len(),
                self.normals.get(record.normal).len(),
                self.lengths.get(record.length).len(),
            ];
            let categories = [
                BufferCategory::Position,
                BufferCategory::Normal,
                BufferCategory::Length,
            ];
            for ((category, expected), got) in categories.into_iter().zip(expected).zip(got) {
                if expected != got {
                    return Err(ModelError::BufferLengthMismatch {
                        category,
                        frame,
                        expected,
                        got,
                    });
                }
            }
        }
        Ok(())
    }

    /// Frame table payload: frame count, then one identifier per frame
    pub fn write_frame_table(&self, category: BufferCategory, out: &mut Payload) {
        out.u32(self.frames.len() as u32);
        for record in &self.frames {
            let id = match category {
                BufferCategory::Position => record.position.raw(),
                BufferCategory::Normal => record.normal.raw(),
                BufferCategory::Length => record.length.raw(),
            };
            out.u32(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Endian;

    #[test]
    fn test_identifiers_start_at_one() {
        let mut arena = Arena::default();
        let a = arena.alloc(LengthBuffer::new(1));
        let b = arena.alloc(LengthBuffer::new(2));
        assert_eq!(a.raw(), 1);
        assert_eq!(b.raw(), 2);
        assert_eq!(arena.get(b).len(), 2);
    }

    #[test]
    fn test_normals_default_to_unit_x() {
        let normals = NormalBuffer::new(3);
        assert!(normals.as_slice().iter().all(|&n| n == DEFAULT_NORMAL));
        let positions = PositionBuffer::new(2);
        assert!(positions.as_slice().iter().all(|&p| p == [0, 0, 0]));
    }

    #[test]
    fn test_set_out_of_range() {
        let mut positions = PositionBuffer::new(1);
        assert!(positions.set(0, [1, 2, 3]).is_ok());
        assert_eq!(
            positions.set(1, [0; 3]),
            Err(ModelError::SlotOutOfRange {
                category: BufferCategory::Position,
                index: 1,
                len: 1
            })
        );
    }

    #[test]
    fn test_allocate_frames_one_to_one() {
        let mut tables = BufferTables::default();
        tables.allocate_frames(3, 4, 2, 1).unwrap();

        assert_eq!(tables.frame_count(), 3);
        assert_eq!(tables.positions.len(), 3);
        let ids: Vec<u32> = tables.frames().iter().map(|f| f.normal.raw()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(tables.validate().is_ok());

        assert_eq!(
            tables.allocate_frames(1, 1, 1, 1),
            Err(ModelError::FramesAlreadyAllocated)
        );
    }

    #[test]
    fn test_allocate_rejects_oversized_position_buffer() {
        let mut tables = BufferTables::default();
        assert_eq!(
            tables.allocate_frames(1, 257, 0, 0),
            Err(ModelError::Capacity {
                requested: 257,
                limit: MAX_POSITIONS
            })
        );
    }

    #[test]
    fn test_allocate_rejects_frame_count_past_u16() {
        let mut tables = BufferTables::default();
        assert_eq!(
            tables.allocate_frames(MAX_FRAMES + 1, 1, 1, 0),
            Err(ModelError::TooManyFrames {
                requested: 65536,
                limit: 65535
            })
        );
        assert_eq!(tables.frame_count(), 0);
    }

    #[test]
    fn test_validate_detects_uneven_growth() {
        let mut tables = BufferTables::default();
        tables.allocate_frames(2, 2, 1, 1).unwrap();
        tables.positions_of_mut(1).unwrap().push([0, 0, 0]);

        assert_eq!(
            tables.validate(),
            Err(ModelError::BufferLengthMismatch {
                category: BufferCategory::Position,
                frame: 1,
                expected: 2,
                got: 3
            })
        );
    }

    #[test]
    fn test_length_buffer_pads_odd_counts() {
        let mut out = Payload::new(Endian::Little);
        let mut lengths = LengthBuffer::new(3);
        lengths.set(0, -1).unwrap();
        lengths.write(1, &mut out);
        let bytes = out.into_bytes();
        assert_eq!(bytes.len(), 8 + 8);
        assert_eq!(&bytes[8..10], &[0xFF, 0xFF]);
        assert_eq!(&bytes[14..16], &[0, 0]);
    }

    #[test]
    fn test_geometry_entry_layout() {
        let mut positions = PositionBuffer::new(1);
        positions.set(0, [1, -1, 256]).unwrap();
        let mut out = Payload::new(Endian::Big);
        positions.write(5, &mut out);
        assert_eq!(
            out.into_bytes(),
            vec![0, 0, 0, 5, 0, 0, 0, 1, 0, 1, 0xFF, 0xFF, 1, 0, 0, 0]
        );
    }

    #[test]
    fn test_frame_table_payload() {
        let mut tables = BufferTables::default();
        tables.allocate_frames(2, 1, 1, 1).unwrap();
        let mut out = Payload::new(Endian::Little);
        tables.write_frame_table(BufferCategory::Length, &mut out);
        assert_eq!(out.into_bytes(), vec![2, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0]);
    }
}
