//! The streaming pipeline: acquire, clip, detect, overlay.
//!
//! One `step()` is one loop iteration of the demo. The frame pair is owned by
//! the iteration: filtered in place, resized into the detector input image,
//! and dropped when the step returns.

use log::{debug, info};
use opencv::{core, imgproc, prelude::*};

use crate::config::PipelineConfig;
use crate::detection::FaceDetection;
use crate::detector::FaceDetector;
use crate::error::Error;
use crate::filter::BackgroundFilter;
use crate::source::FrameSource;

/// Output of one pipeline iteration: the filtered, detector-sized BGR image
/// with overlays already drawn, and the detections behind them.
pub struct ProcessedFrame {
    pub image: core::Mat,
    pub faces: Vec<FaceDetection>,
}

pub struct Pipeline<S, D> {
    source: S,
    detector: D,
    filter: BackgroundFilter,
    config: PipelineConfig,
}

impl<S: FrameSource, D: FaceDetector> Pipeline<S, D> {
    /// Validates the config and queries the session-constant depth scale.
    pub fn new(config: PipelineConfig, source: S, detector: D) -> Result<Self, Error> {
        config.validate()?;

        let scale = source.depth_scale();
        info!(
            "pipeline: depth scale {}, clipping at {}",
            scale, config.clipping_distance
        );

        let filter = BackgroundFilter::new(scale, config.clipping_distance, config.background_fill);

        Ok(Self {
            source,
            detector,
            filter,
            config,
        })
    }

    /// Runs one iteration: wait for an aligned pair, blank the background,
    /// resize to the detector input, detect, draw the overlays.
    pub fn step(&mut self) -> Result<ProcessedFrame, Error> {
        let mut pair = self.source.wait_for_frames()?;
        self.filter.apply_pair(&mut pair);

        let frame = core::Mat::from_slice(&pair.color)?;
        let frame = frame.reshape(pair.color_bpp as i32, pair.height as i32)?;

        let mut image = core::Mat::default();
        imgproc::resize(
            &frame,
            &mut image,
            core::Size::new(
                self.config.detector.input_width as i32,
                self.config.detector.input_height as i32,
            ),
            0.0,
            0.0,
            imgproc::INTER_LINEAR,
        )?;

        let faces = self.detector.detect(&image)?;
        debug!("step: {} face(s)", faces.len());
        draw_detections(&mut image, &faces)?;

        Ok(ProcessedFrame { image, faces })
    }
}

/// Draws each detection as a 1 px green outline, mapped and clamped onto the
/// image. An empty slice leaves the image untouched.
pub fn draw_detections(image: &mut core::Mat, faces: &[FaceDetection]) -> Result<(), Error> {
    let (cols, rows) = (image.cols(), image.rows());

    for face in faces {
        let rect = face.to_pixel_rect(cols, rows);
        imgproc::rectangle(
            image,
            core::Rect::new(
                rect.top_left.x,
                rect.top_left.y,
                rect.width(),
                rect.height(),
            ),
            core::Scalar::new(0.0, 255.0, 0.0, 0.0),
            1,
            imgproc::LINE_8,
            0,
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_image(cols: i32, rows: i32) -> core::Mat {
        core::Mat::new_rows_cols_with_default(
            rows,
            cols,
            core::CV_8UC3,
            core::Scalar::new(10.0, 20.0, 30.0, 0.0),
        )
        .unwrap()
    }

    fn image_bytes(image: &core::Mat) -> Vec<u8> {
        image.data_bytes().unwrap().to_vec()
    }

    #[test]
    fn no_detections_leave_the_image_unchanged() {
        let mut image = blank_image(64, 32);
        let before = image_bytes(&image);

        draw_detections(&mut image, &[]).unwrap();
        assert_eq!(before, image_bytes(&image));
    }

    #[test]
    fn a_detection_changes_the_image() {
        let mut image = blank_image(64, 32);
        let before = image_bytes(&image);

        let face = FaceDetection {
            x: 0.25,
            y: 0.25,
            w: 0.5,
            h: 0.5,
            confidence: 0.9,
        };
        draw_detections(&mut image, &[face]).unwrap();
        assert_ne!(before, image_bytes(&image));
    }

    #[test]
    fn out_of_bounds_detection_still_draws_inside_the_image() {
        let mut image = blank_image(64, 32);
        let face = FaceDetection {
            x: 0.9,
            y: 0.9,
            w: 0.5,
            h: 0.5,
            confidence: 0.9,
        };
        // corners are clamped before drawing, so this must simply succeed
        draw_detections(&mut image, &[face]).unwrap();
    }
}
