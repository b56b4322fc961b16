//! Face type (material) table
//!
//! # Record layout
//! ```text
//! 0x00: flags u8        (bit 0 = vertex colour, bit 1 = texture coordinates)
//! 0x01: color u8 × 3
//! if texture coordinates:
//! 0x04: tex_coords (u8, u8) × 4
//! 0x0C: bitmap_id u32
//! ```
//!
//! Primitives refer to face types by the byte offset of their record in
//! the table, so the table also produces the index → offset map.

use bitflags::bitflags;

use crate::platform::Payload;

bitflags! {
    /// Control bits of a face type record
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FaceTypeFlags: u8 {
        const VERTEX_COLOR = 0b0000_0001;
        const TEX_COORDS = 0b0000_0010;
    }
}

/// Size of a record without texture coordinates
pub const FACE_TYPE_BASE_SIZE: usize = 4;

/// Size of a record with texture coordinates
pub const FACE_TYPE_TEXTURED_SIZE: usize = 20;

/// Material descriptor shared by primitives
///
/// Colour and texture coordinates are always stored; the two flags decide
/// what the runtime uses and whether the texture block is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FaceType {
    pub has_vertex_color: bool,
    pub color: [u8; 3],
    pub has_tex_coords: bool,
    pub tex_coords: [[u8; 2]; 4],
    pub bitmap_id: u32,
}

impl FaceType {
    /// Flat vertex-coloured face
    pub fn colored(color: [u8; 3]) -> Self {
        Self {
            has_vertex_color: true,
            color,
            ..Self::default()
        }
    }

    /// Face textured from bitmap `bitmap_id`
    pub fn textured(tex_coords: [[u8; 2]; 4], bitmap_id: u32) -> Self {
        Self {
            has_tex_coords: true,
            tex_coords,
            bitmap_id,
            ..Self::default()
        }
    }

    pub fn flags(&self) -> FaceTypeFlags {
        let mut flags = FaceTypeFlags::empty();
        flags.set(FaceTypeFlags::VERTEX_COLOR, self.has_vertex_color);
        flags.set(FaceTypeFlags::TEX_COORDS, self.has_tex_coords);
        flags
    }

    /// Encoded size in bytes (4 or 20)
    pub fn encoded_size(&self) -> usize {
        if self.has_tex_coords {
            FACE_TYPE_TEXTURED_SIZE
        } else {
            FACE_TYPE_BASE_SIZE
        }
    }

    pub fn write(&self, out: &mut Payload) {
        out.u8(self.flags().bits()).bytes(&self.color);

        if self.has_tex_coords {
            for uv in &self.tex_coords {
                out.bytes(uv);
            }
            out.u32(self.bitmap_id);
        }
    }
}

/// Ordered face type records
#[derive(Debug, Clone, Default)]
pub struct FaceTypeTable {
    entries: Vec<FaceType>,
}

impl FaceTypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a face type, returning its index
    pub fn push(&mut self, face_type: FaceType) -> usize {
        self.entries.push(face_type);
        self.entries.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&FaceType> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FaceType> {
        self.entries.iter()
    }

    /// Byte offset of every record, in table order
    pub fn offsets(&self) -> Vec<usize> {
        let mut offset = 0;
        self.entries
            .iter()
            .map(|face_type| {
                let at = offset;
                offset += face_type.encoded_size();
                at
            })
            .collect()
    }

    /// Write the table payload: record count followed by the records
    pub fn write(&self, out: &mut Payload) {
        out.u32(self.entries.len() as u32);
        for face_type in &self.entries {
            face_type.write(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Endian;

    fn encode(face_type: &FaceType, endian: Endian) -> Vec<u8> {
        let mut out = Payload::new(endian);
        face_type.write(&mut out);
        out.into_bytes()
    }

    #[test]
    fn test_record_size_follows_tex_coord_flag() {
        let plain = FaceType::colored([255, 128, 0]);
        let textured = FaceType::textured([[0, 0], [63, 0], [63, 63], [0, 63]], 7);
        let both = FaceType {
            has_vertex_color: true,
            ..textured
        };

        for face_type in [plain, textured, both, FaceType::default()] {
            let bytes = encode(&face_type, Endian::Little);
            assert_eq!(bytes.len(), face_type.encoded_size());
            assert!(bytes.len() == 4 || bytes.len() == 20);
            assert_eq!(bytes.len() == 20, face_type.has_tex_coords);
        }
    }

    #[test]
    fn test_colored_record_bytes() {
        let bytes = encode(&FaceType::colored([255, 128, 0]), Endian::Big);
        assert_eq!(bytes, vec![0x01, 255, 128, 0]);
    }

    #[test]
    fn test_textured_record_bitmap_id_byte_order() {
        let face_type = FaceType::textured([[1, 2], [3, 4], [5, 6], [7, 8]], 0x0102_0304);
        let le = encode(&face_type, Endian::Little);
        let be = encode(&face_type, Endian::Big);

        assert_eq!(le[0], 0x02);
        assert_eq!(&le[4..12], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(&le[12..16], &[4, 3, 2, 1]);
        assert_eq!(&be[12..16], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_offsets_accumulate() {
        let mut table = FaceTypeTable::new();
        table.push(FaceType::colored([1, 2, 3]));
        table.push(FaceType::textured([[0, 0]; 4], 1));
        table.push(FaceType::colored([4, 5, 6]));
        table.push(FaceType::textured([[0, 0]; 4], 2));

        assert_eq!(table.offsets(), vec![0, 4, 24, 28]);
    }

    #[test]
    fn test_table_payload() {
        let mut table = FaceTypeTable::new();
        table.push(FaceType::colored([9, 9, 9]));

        let mut out = Payload::new(Endian::Little);
        table.write(&mut out);
        assert_eq!(out.into_bytes(), vec![1, 0, 0, 0, 1, 9, 9, 9]);
    }
}
