use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

/// A detected face as the detector reports it: top-left corner and size as
/// fractions of the input image, each nominally in [0, 1].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct FaceDetection {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    #[serde(rename = "p")]
    pub confidence: f32,
}

/// Axis-aligned pixel rectangle, corners inclusive and inside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub top_left: na::Point2<i32>,
    pub bottom_right: na::Point2<i32>,
}

impl PixelRect {
    #[inline]
    pub fn width(&self) -> i32 {
        self.bottom_right.x - self.top_left.x
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.bottom_right.y - self.top_left.y
    }
}

impl FaceDetection {
    /// Maps the normalized rectangle onto a `cols` x `rows` image.
    ///
    /// Top-left is `(x * cols, y * rows)`, bottom-right adds `w * cols` and
    /// `h * rows`. Detector output is not trusted to stay inside [0, 1], so
    /// both corners are clamped to the valid pixel range before use.
    pub fn to_pixel_rect(&self, cols: i32, rows: i32) -> PixelRect {
        let top_left = na::Point2::new(self.x * cols as f32, self.y * rows as f32);
        let bottom_right = na::Point2::new(
            top_left.x + self.w * cols as f32,
            top_left.y + self.h * rows as f32,
        );

        PixelRect {
            top_left: clamp_point(top_left, cols, rows),
            bottom_right: clamp_point(bottom_right, cols, rows),
        }
    }
}

fn clamp_point(p: na::Point2<f32>, cols: i32, rows: i32) -> na::Point2<i32> {
    na::Point2::new(
        (p.x as i32).clamp(0, cols - 1),
        (p.y as i32).clamp(0, rows - 1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_is_linear_in_image_size() {
        let det = FaceDetection {
            x: 0.25,
            y: 0.25,
            w: 0.5,
            h: 0.5,
            confidence: 0.9,
        };
        let rect = det.to_pixel_rect(640, 360);

        assert_eq!(rect.top_left, na::Point2::new(160, 90));
        assert_eq!(rect.bottom_right, na::Point2::new(480, 270));
        assert_eq!(rect.width(), 320);
        assert_eq!(rect.height(), 180);
    }

    #[test]
    fn out_of_range_rect_is_clamped_to_the_image() {
        let det = FaceDetection {
            x: 0.8,
            y: -0.2,
            w: 0.5,
            h: 0.5,
            confidence: 0.9,
        };
        let rect = det.to_pixel_rect(640, 360);

        assert_eq!(rect.top_left, na::Point2::new(512, 0));
        assert_eq!(rect.bottom_right, na::Point2::new(639, 108));
    }

    #[test]
    fn full_frame_rect_stays_inside_bounds() {
        let det = FaceDetection {
            x: 0.0,
            y: 0.0,
            w: 1.0,
            h: 1.0,
            confidence: 1.0,
        };
        let rect = det.to_pixel_rect(640, 360);

        assert_eq!(rect.top_left, na::Point2::new(0, 0));
        assert_eq!(rect.bottom_right, na::Point2::new(639, 359));
    }
}
