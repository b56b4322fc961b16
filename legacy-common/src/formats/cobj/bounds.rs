//! Axis-aligned bounding boxes derived from position buffers
//!
//! # Record layout (16 bytes)
//! ```text
//! 0x00: center i16 × 3
//! 0x06: half_extent i16 × 3
//! 0x0C: diag3 u16   (length of the half extent)
//! 0x0E: diag2 u16   (length of the half extent in the XZ plane)
//! ```

use crate::platform::Payload;

/// Size of one encoded bounding box
pub const BOUNDING_BOX_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundingBox {
    pub center: [i16; 3],
    pub half_extent: [i16; 3],
    pub diag3: u16,
    pub diag2: u16,
}

impl BoundingBox {
    /// Derive the box enclosing `positions`; an empty buffer yields a zero box
    pub fn from_positions(positions: &[[i16; 3]]) -> Self {
        let Some(&first) = positions.first() else {
            return Self::default();
        };

        let mut min = first.map(i32::from);
        let mut max = min;
        for position in positions {
            for axis in 0..3 {
                let v = i32::from(position[axis]);
                min[axis] = min[axis].min(v);
                max[axis] = max[axis].max(v);
            }
        }

        // Division truncates toward zero
        let center: [i16; 3] = std::array::from_fn(|axis| ((min[axis] + max[axis]) / 2) as i16);
        let half: [i32; 3] = std::array::from_fn(|axis| (max[axis] - min[axis]) / 2);

        let xz = (half[0] * half[0] + half[2] * half[2]) as u64;
        let xyz = xz + (half[1] * half[1]) as u64;

        Self {
            center,
            half_extent: half.map(|h| h as i16),
            diag3: rounded_sqrt(xyz) as u16,
            diag2: rounded_sqrt(xz) as u16,
        }
    }

    pub fn write(&self, out: &mut Payload) {
        for &c in &self.center {
            out.i16(c);
        }
        for &h in &self.half_extent {
            out.i16(h);
        }
        out.u16(self.diag3).u16(self.diag2);
    }
}

/// Square root rounded to the nearest integer
fn rounded_sqrt(n: u64) -> u64 {
    let mut root = (n as f64).sqrt() as u64;
    while root * root > n {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= n {
        root += 1;
    }
    // n lies in [r², (r+1)²); the midpoint (r + 0.5)² = r² + r + 0.25
    if n - root * root > root { root + 1 } else { root }
}
