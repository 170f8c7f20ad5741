//! Pipeline configuration.
//!
//! The defaults reproduce the classic demo setup: depth 424x240 and color
//! 320x240, both at 6 fps, a 1 metre clipping distance and a 0x99 background
//! fill. Everything is an explicit field so callers are not stuck with the
//! compiled-in constants.

use crate::error::Error;

pub const DEFAULT_DEPTH_WIDTH: u32 = 424;
pub const DEFAULT_DEPTH_HEIGHT: u32 = 240;
pub const DEFAULT_COLOR_WIDTH: u32 = 320;
pub const DEFAULT_COLOR_HEIGHT: u32 = 240;
pub const DEFAULT_FPS: u32 = 6;
pub const DEFAULT_CLIPPING_DISTANCE: f32 = 1.0;
pub const DEFAULT_BACKGROUND_FILL: u8 = 0x99;
pub const DEFAULT_DETECTOR_WIDTH: u32 = 640;
pub const DEFAULT_DETECTOR_HEIGHT: u32 = 360;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// One camera stream: resolution and frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSpec {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl StreamSpec {
    pub fn new(width: u32, height: u32, fps: u32) -> Self {
        Self { width, height, fps }
    }
}

/// Detector input geometry and score gate.
#[derive(Debug, Clone)]
pub struct DetectorSpec {
    /// Image size the filtered frame is resized to before inference.
    pub input_width: u32,
    pub input_height: u32,
    /// Detections scoring below this are discarded.
    pub confidence_threshold: f32,
}

impl Default for DetectorSpec {
    fn default() -> Self {
        Self {
            input_width: DEFAULT_DETECTOR_WIDTH,
            input_height: DEFAULT_DETECTOR_HEIGHT,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub depth_stream: StreamSpec,
    pub color_stream: StreamSpec,
    /// Maximum real-world distance (in the device's distance unit, metres for
    /// every RealSense device) still considered foreground. Must be > 0.
    pub clipping_distance: f32,
    /// Byte written into every channel of a background pixel.
    pub background_fill: u8,
    pub detector: DetectorSpec,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            depth_stream: StreamSpec::new(DEFAULT_DEPTH_WIDTH, DEFAULT_DEPTH_HEIGHT, DEFAULT_FPS),
            color_stream: StreamSpec::new(DEFAULT_COLOR_WIDTH, DEFAULT_COLOR_HEIGHT, DEFAULT_FPS),
            clipping_distance: DEFAULT_CLIPPING_DISTANCE,
            background_fill: DEFAULT_BACKGROUND_FILL,
            detector: DetectorSpec::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), Error> {
        for (name, stream) in [
            ("depth_stream", &self.depth_stream),
            ("color_stream", &self.color_stream),
        ] {
            if stream.width == 0 || stream.height == 0 {
                return Err(Error::InvalidConfig(format!(
                    "{} resolution must be non-zero, got {}x{}",
                    name, stream.width, stream.height
                )));
            }
            if stream.fps == 0 {
                return Err(Error::InvalidConfig(format!("{} fps must be >= 1", name)));
            }
        }

        if !(self.clipping_distance > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "clipping_distance must be > 0, got {}",
                self.clipping_distance
            )));
        }

        if self.detector.input_width == 0 || self.detector.input_height == 0 {
            return Err(Error::InvalidConfig(format!(
                "detector input must be non-zero, got {}x{}",
                self.detector.input_width, self.detector.input_height
            )));
        }

        if !(0.0..=1.0).contains(&self.detector.confidence_threshold) {
            return Err(Error::InvalidConfig(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.detector.confidence_threshold
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_fps_is_rejected() {
        let mut cfg = PipelineConfig::default();
        cfg.color_stream.fps = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn non_positive_clipping_distance_is_rejected() {
        let mut cfg = PipelineConfig::default();
        cfg.clipping_distance = 0.0;
        assert!(cfg.validate().is_err());

        cfg.clipping_distance = -1.0;
        assert!(cfg.validate().is_err());

        cfg.clipping_distance = f32::NAN;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn out_of_range_confidence_is_rejected() {
        let mut cfg = PipelineConfig::default();
        cfg.detector.confidence_threshold = 1.5;
        assert!(cfg.validate().is_err());
    }
}
