//! Background clipping.
//!
//! Converts each raw depth sample to a real-world distance with the device
//! scale and blanks every color pixel whose distance is invalid (<= 0) or
//! beyond the clipping threshold. The filter only reads depth, so applying it
//! twice to the same pair is a no-op after the first pass.

use log::debug;

use crate::frame::FramePair;

#[derive(Debug, Clone, Copy)]
pub struct BackgroundFilter {
    depth_scale: f32,
    clipping_distance: f32,
    fill: u8,
}

impl BackgroundFilter {
    pub fn new(depth_scale: f32, clipping_distance: f32, fill: u8) -> Self {
        debug!(
            "background filter: scale={} clip={} fill=0x{:02x}",
            depth_scale, clipping_distance, fill
        );
        Self {
            depth_scale,
            clipping_distance,
            fill,
        }
    }

    /// Background iff distance is invalid (<= 0) or strictly beyond the
    /// threshold; a sample sitting exactly on the threshold is foreground.
    #[inline]
    pub fn is_background(&self, raw_depth: u16) -> bool {
        let distance = raw_depth as f32 * self.depth_scale;
        distance <= 0.0 || distance > self.clipping_distance
    }

    /// Blanks background pixels in `color` in place.
    ///
    /// `depth` and `color` must describe the same pixel grid; `color` holds
    /// `bpp` bytes per sample in `depth`. Foreground bytes are left untouched.
    pub fn apply(&self, depth: &[u16], color: &mut [u8], bpp: usize) {
        debug_assert_eq!(depth.len() * bpp, color.len());

        for (sample, pixel) in depth.iter().zip(color.chunks_exact_mut(bpp)) {
            if self.is_background(*sample) {
                pixel.fill(self.fill);
            }
        }
    }

    /// Like [`apply`](Self::apply), but leaves the input untouched and
    /// returns the filtered copy.
    pub fn filtered(&self, depth: &[u16], color: &[u8], bpp: usize) -> Vec<u8> {
        let mut out = color.to_vec();
        self.apply(depth, &mut out, bpp);
        out
    }

    /// Filters a whole frame pair in place.
    pub fn apply_pair(&self, pair: &mut FramePair) {
        let bpp = pair.color_bpp;
        self.apply(&pair.depth, &mut pair.color, bpp);
    }
}
