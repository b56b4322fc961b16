//! Median-cut colour quantizer
//!
//! Deterministic for a given pixel set: colours are histogrammed in sorted
//! order and ties always resolve to the earliest box.

use legacy_common::{Palette, Quantizer, Rgb};
use std::collections::BTreeMap;

/// Splits the colour space at the weighted median of the widest channel
#[derive(Debug, Clone, Copy, Default)]
pub struct MedianCut;

struct ColorBox {
    colors: Vec<(Rgb, u32)>,
}

impl ColorBox {
    /// Widest channel and its range
    fn widest_channel(&self) -> (usize, u8) {
        let mut best = (0, 0);
        for channel in 0..3 {
            let (min, max) = self
                .colors
                .iter()
                .fold((u8::MAX, u8::MIN), |(lo, hi), (c, _)| {
                    (lo.min(c[channel]), hi.max(c[channel]))
                });
            let range = max.saturating_sub(min);
            if range > best.1 {
                best = (channel, range);
            }
        }
        best
    }

    fn split(mut self) -> (ColorBox, ColorBox) {
        let (channel, _) = self.widest_channel();
        self.colors.sort_by_key(|&(c, _)| (c[channel], c));

        let total: u64 = self.colors.iter().map(|&(_, w)| w as u64).sum();
        let mut running = 0u64;
        let mut split = self.colors.len() - 1;
        for (i, &(_, w)) in self.colors.iter().enumerate() {
            running += w as u64;
            if running * 2 >= total {
                split = i + 1;
                break;
            }
        }
        let split = split.clamp(1, self.colors.len() - 1);
        let upper = self.colors.split_off(split);
        (self, ColorBox { colors: upper })
    }

    fn average(&self) -> Rgb {
        let total: u64 = self.colors.iter().map(|&(_, w)| w as u64).sum();
        let mut sums = [0u64; 3];
        for &(c, w) in &self.colors {
            for channel in 0..3 {
                sums[channel] += c[channel] as u64 * w as u64;
            }
        }
        sums.map(|s| ((s + total / 2) / total) as u8)
    }
}

impl Quantizer for MedianCut {
    fn quantize(&self, pixels: &[Rgb], max_colors: usize) -> Palette {
        if max_colors == 0 || pixels.is_empty() {
            return Palette::default();
        }

        let mut histogram: BTreeMap<Rgb, u32> = BTreeMap::new();
        for &pixel in pixels {
            *histogram.entry(pixel).or_default() += 1;
        }
        if histogram.len() <= max_colors {
            return Palette::new(histogram.into_keys().collect());
        }

        let mut boxes = vec![ColorBox {
            colors: histogram.into_iter().collect(),
        }];
        while boxes.len() < max_colors {
            let mut widest: Option<(usize, u8)> = None;
            for (i, b) in boxes.iter().enumerate() {
                if b.colors.len() < 2 {
                    continue;
                }
                let (_, range) = b.widest_channel();
                if widest.is_none_or(|(_, r)| range > r) {
                    widest = Some((i, range));
                }
            }
            let Some((index, _)) = widest else {
                break;
            };
            let (lower, upper) = boxes.remove(index).split();
            boxes.insert(index, upper);
            boxes.insert(index, lower);
        }

        tracing::debug!(
            "median cut: {} pixels -> {} colours",
            pixels.len(),
            boxes.len()
        );
        Palette::new(boxes.iter().map(ColorBox::average).collect())
    }
}
