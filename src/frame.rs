use crate::error::Error;

/// One synchronized, aligned depth + color frame pair.
///
/// Both buffers describe the same row-major pixel grid, so index `i` into
/// `depth` and byte range `i * color_bpp ..` into `color` refer to the same
/// physical point. Produced fresh by a [`crate::source::FrameSource`] each
/// iteration and discarded at the end of it.
#[derive(Debug)]
pub struct FramePair {
    pub width: u32,
    pub height: u32,
    /// Bytes per color pixel (3 for BGR8).
    pub color_bpp: usize,
    /// Row-major color bytes, `width * height * color_bpp` long.
    pub color: Vec<u8>,
    /// Raw depth samples in device units, `width * height` long.
    pub depth: Vec<u16>,
}

impl FramePair {
    /// Builds a pair, enforcing that both buffers cover the full grid.
    pub fn new(
        width: u32,
        height: u32,
        color_bpp: usize,
        color: Vec<u8>,
        depth: Vec<u16>,
    ) -> Result<Self, Error> {
        let pixels = width as usize * height as usize;
        if color.len() != pixels * color_bpp {
            return Err(Error::camera(
                "frame_pair",
                format!(
                    "color buffer is {} bytes, expected {}x{}x{} = {}",
                    color.len(),
                    width,
                    height,
                    color_bpp,
                    pixels * color_bpp
                ),
            ));
        }
        if depth.len() != pixels {
            return Err(Error::camera(
                "frame_pair",
                format!(
                    "depth buffer is {} samples, expected {}x{} = {}",
                    depth.len(),
                    width,
                    height,
                    pixels
                ),
            ));
        }

        Ok(Self {
            width,
            height,
            color_bpp,
            color,
            depth,
        })
    }

    #[inline]
    pub fn pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_buffers_are_accepted() {
        let pair = FramePair::new(4, 2, 3, vec![0; 24], vec![0; 8]).unwrap();
        assert_eq!(pair.pixels(), 8);
    }

    #[test]
    fn short_color_buffer_is_a_camera_error() {
        let err = FramePair::new(4, 2, 3, vec![0; 23], vec![0; 8]).unwrap_err();
        assert!(err.is_camera());
    }

    #[test]
    fn mismatched_depth_grid_is_a_camera_error() {
        let err = FramePair::new(4, 2, 3, vec![0; 24], vec![0; 7]).unwrap_err();
        assert!(err.is_camera());
    }
}
