//! Palette quantization interface
//!
//! Bitmaps and animation strips store palette indices. Choosing the palette
//! is left to a [`Quantizer`] implementation supplied by the caller; the
//! format writers only rely on the resulting [`Palette`].

/// 8-bit RGB triple
pub type Rgb = [u8; 3];

/// Ordered colour palette
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> Self {
        Self { colors }
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Index of the closest palette entry (squared RGB distance, first wins ties)
    ///
    /// Returns 0 for an empty palette.
    pub fn nearest(&self, color: Rgb) -> usize {
        let mut best = 0;
        let mut best_distance = u32::MAX;
        for (i, c) in self.colors.iter().enumerate() {
            let distance: u32 = c
                .iter()
                .zip(color.iter())
                .map(|(&a, &b)| {
                    let d = a as i32 - b as i32;
                    (d * d) as u32
                })
                .sum();
            if distance < best_distance {
                best = i;
                best_distance = distance;
                if distance == 0 {
                    break;
                }
            }
        }
        best
    }
}

/// Reduces a set of colours to a palette of at most `max_colors` entries
pub trait Quantizer {
    fn quantize(&self, pixels: &[Rgb], max_colors: usize) -> Palette;
}
