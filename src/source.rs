//! Frame sources.
//!
//! A [`FrameSource`] hides the camera SDK: it blocks until the next
//! depth+color pair is available and yields them already aligned onto the
//! color pixel grid, so downstream code can index both buffers with the same
//! pixel index. The device depth scale is fixed per session and queried once
//! at pipeline setup.

use log::info;

use crate::config::StreamSpec;
use crate::error::Error;
use crate::frame::FramePair;

pub trait FrameSource {
    /// Device-specific multiplier converting raw depth samples to real-world
    /// distance. Constant for the life of the source.
    fn depth_scale(&self) -> f32;

    /// Blocks until the next synchronized, color-aligned frame pair.
    fn wait_for_frames(&mut self) -> Result<FramePair, Error>;
}

impl FrameSource for Box<dyn FrameSource> {
    fn depth_scale(&self) -> f32 {
        (**self).depth_scale()
    }

    fn wait_for_frames(&mut self) -> Result<FramePair, Error> {
        (**self).wait_for_frames()
    }
}

/// Deterministic synthetic source for demos without a camera and for tests.
///
/// Renders a near "subject" block drifting horizontally over a far background
/// so every frame exercises both branches of the clipping filter.
pub struct SyntheticSource {
    spec: StreamSpec,
    frame_index: u64,
    /// Raw depth sample for the subject block (0.6 m at the default scale).
    subject_depth: u16,
    /// Raw depth sample for everything else (2.5 m at the default scale).
    background_depth: u16,
}

/// Matches the 1 mm depth unit of common stereo depth devices.
pub const SYNTHETIC_DEPTH_SCALE: f32 = 0.001;

const SYNTHETIC_BPP: usize = 3;

impl SyntheticSource {
    pub fn new(spec: StreamSpec) -> Self {
        info!(
            "synthetic source: {}x{} @ {} fps",
            spec.width, spec.height, spec.fps
        );
        Self {
            spec,
            frame_index: 0,
            subject_depth: 600,
            background_depth: 2500,
        }
    }

    /// Overrides the raw depth written for every pixel, subject and
    /// background alike. Used by tests that need a uniform depth field.
    pub fn with_uniform_depth(spec: StreamSpec, raw_depth: u16) -> Self {
        let mut source = Self::new(spec);
        source.subject_depth = raw_depth;
        source.background_depth = raw_depth;
        source
    }

    fn subject_bounds(&self) -> (u32, u32, u32, u32) {
        let w = self.spec.width;
        let h = self.spec.height;
        let block_w = w / 4;
        let block_h = h / 2;
        // drift one pixel per frame, wrapping
        let x0 = (w / 4 + self.frame_index as u32 % (w / 2)).min(w - block_w);
        let y0 = h / 4;
        (x0, y0, block_w, block_h)
    }
}

impl FrameSource for SyntheticSource {
    fn depth_scale(&self) -> f32 {
        SYNTHETIC_DEPTH_SCALE
    }

    fn wait_for_frames(&mut self) -> Result<FramePair, Error> {
        let w = self.spec.width;
        let h = self.spec.height;
        let (sx, sy, sw, sh) = self.subject_bounds();

        let mut color = vec![0u8; w as usize * h as usize * SYNTHETIC_BPP];
        let mut depth = vec![self.background_depth; w as usize * h as usize];

        for y in 0..h {
            for x in 0..w {
                let i = (y * w + x) as usize;
                let in_subject = x >= sx && x < sx + sw && y >= sy && y < sy + sh;
                if in_subject {
                    depth[i] = self.subject_depth;
                }

                // simple gradient so filtered output is visually obvious
                let px = &mut color[i * SYNTHETIC_BPP..(i + 1) * SYNTHETIC_BPP];
                px[0] = (x * 255 / w) as u8;
                px[1] = (y * 255 / h) as u8;
                px[2] = if in_subject { 0xe0 } else { 0x20 };
            }
        }

        self.frame_index += 1;
        FramePair::new(w, h, SYNTHETIC_BPP, color, depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_frames_cover_the_configured_grid() {
        let mut source = SyntheticSource::new(StreamSpec::new(32, 16, 6));
        let pair = source.wait_for_frames().unwrap();

        assert_eq!(pair.width, 32);
        assert_eq!(pair.height, 16);
        assert_eq!(pair.color.len(), 32 * 16 * 3);
        assert_eq!(pair.depth.len(), 32 * 16);
    }

    #[test]
    fn synthetic_frames_contain_near_and_far_depth() {
        let mut source = SyntheticSource::new(StreamSpec::new(32, 16, 6));
        let pair = source.wait_for_frames().unwrap();

        assert!(pair.depth.contains(&600));
        assert!(pair.depth.contains(&2500));
    }

    #[test]
    fn uniform_depth_override_applies_everywhere() {
        let mut source = SyntheticSource::with_uniform_depth(StreamSpec::new(8, 8, 6), 2000);
        let pair = source.wait_for_frames().unwrap();

        assert!(pair.depth.iter().all(|&d| d == 2000));
    }
}
