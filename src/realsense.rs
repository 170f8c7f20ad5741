//! librealsense2 frame source (feature `realsense`).
//!
//! Streams depth (Z16) and color (BGR8) per the configured specs. The crate
//! binding does not wrap the SDK's align processing block, so the depth map
//! is remapped onto the color grid with a nearest-neighbor rescale; good
//! enough for a clipping preview, and the `FrameSource` seam lets a backend
//! with true reprojection replace this one.

use log::{info, warn};
use realsense_rust::{
    config::Config,
    context::Context,
    frame::{ColorFrame, DepthFrame, PixelKind},
    kind::{Rs2Format, Rs2Option, Rs2StreamKind},
    pipeline::{ActivePipeline, InactivePipeline},
};

use crate::config::StreamSpec;
use crate::error::Error;
use crate::frame::FramePair;
use crate::source::FrameSource;

/// Fallback when the device does not report its depth unit; 1 mm matches
/// every current RealSense depth camera.
const FALLBACK_DEPTH_SCALE: f32 = 0.001;

const COLOR_BPP: usize = 3;

pub struct RealSenseSource {
    pipeline: ActivePipeline,
    depth_scale: f32,
    color_spec: StreamSpec,
}

impl RealSenseSource {
    pub fn new(depth_spec: StreamSpec, color_spec: StreamSpec) -> Result<Self, Error> {
        let context = Context::new()
            .map_err(|err| Error::camera("create_context", err.to_string()))?;
        let pipeline = InactivePipeline::try_from(&context)
            .map_err(|err| Error::camera("create_pipeline", err.to_string()))?;

        let mut config = Config::new();
        config
            .enable_stream(
                Rs2StreamKind::Depth,
                None,
                depth_spec.width as usize,
                depth_spec.height as usize,
                Rs2Format::Z16,
                depth_spec.fps as usize,
            )
            .map_err(|err| {
                Error::camera(
                    "enable_stream",
                    format!(
                        "depth {}x{}@{}: {}",
                        depth_spec.width, depth_spec.height, depth_spec.fps, err
                    ),
                )
            })?;
        config
            .enable_stream(
                Rs2StreamKind::Color,
                None,
                color_spec.width as usize,
                color_spec.height as usize,
                Rs2Format::Bgr8,
                color_spec.fps as usize,
            )
            .map_err(|err| {
                Error::camera(
                    "enable_stream",
                    format!(
                        "color {}x{}@{}: {}",
                        color_spec.width, color_spec.height, color_spec.fps, err
                    ),
                )
            })?;

        let pipeline = pipeline
            .start(Some(config))
            .map_err(|err| Error::camera("pipeline_start", err.to_string()))?;

        let depth_scale = query_depth_scale(&pipeline).unwrap_or_else(|| {
            warn!(
                "device does not report a depth unit, assuming {}",
                FALLBACK_DEPTH_SCALE
            );
            FALLBACK_DEPTH_SCALE
        });
        info!("realsense source started, depth scale {}", depth_scale);

        Ok(Self {
            pipeline,
            depth_scale,
            color_spec,
        })
    }
}

fn query_depth_scale(pipeline: &ActivePipeline) -> Option<f32> {
    pipeline
        .profile()
        .device()
        .sensors()
        .iter()
        .find_map(|sensor| sensor.get_option(Rs2Option::DepthUnits))
}

impl FrameSource for RealSenseSource {
    fn depth_scale(&self) -> f32 {
        self.depth_scale
    }

    fn wait_for_frames(&mut self) -> Result<FramePair, Error> {
        let frames = self
            .pipeline
            .wait(None)
            .map_err(|err| Error::camera("wait_for_frames", err.to_string()))?;

        let color_frame = frames
            .frames_of_type::<ColorFrame>()
            .into_iter()
            .next()
            .ok_or_else(|| Error::camera("get_color_frame", "no color frame in set".into()))?;
        let depth_frame = frames
            .frames_of_type::<DepthFrame>()
            .into_iter()
            .next()
            .ok_or_else(|| Error::camera("get_depth_frame", "no depth frame in set".into()))?;

        let (cw, ch) = (color_frame.width(), color_frame.height());
        if cw != self.color_spec.width as usize || ch != self.color_spec.height as usize {
            return Err(Error::camera(
                "get_color_frame",
                format!(
                    "got {}x{}, configured {}x{}",
                    cw, ch, self.color_spec.width, self.color_spec.height
                ),
            ));
        }

        let mut color = Vec::with_capacity(cw * ch * COLOR_BPP);
        for pixel in color_frame.iter() {
            match pixel {
                PixelKind::Bgr8 { b, g, r } => {
                    color.push(*b);
                    color.push(*g);
                    color.push(*r);
                }
                _ => {
                    return Err(Error::camera(
                        "get_color_frame",
                        "unexpected color pixel format".into(),
                    ))
                }
            }
        }

        let (dw, dh) = (depth_frame.width(), depth_frame.height());
        let mut raw_depth = Vec::with_capacity(dw * dh);
        for pixel in depth_frame.iter() {
            match pixel {
                PixelKind::Z16 { depth } => raw_depth.push(*depth),
                _ => {
                    return Err(Error::camera(
                        "get_depth_frame",
                        "unexpected depth pixel format".into(),
                    ))
                }
            }
        }

        let depth = remap_nearest(&raw_depth, dw, dh, cw, ch);
        FramePair::new(cw as u32, ch as u32, COLOR_BPP, color, depth)
    }
}

/// Nearest-neighbor rescale of a depth grid onto the color grid.
fn remap_nearest(depth: &[u16], dw: usize, dh: usize, cw: usize, ch: usize) -> Vec<u16> {
    if dw == cw && dh == ch {
        return depth.to_vec();
    }

    let mut out = Vec::with_capacity(cw * ch);
    for y in 0..ch {
        let sy = (y * dh / ch).min(dh - 1);
        for x in 0..cw {
            let sx = (x * dw / cw).min(dw - 1);
            out.push(depth[sy * dw + sx]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::remap_nearest;

    #[test]
    fn identity_remap_copies_the_grid() {
        let depth = vec![1u16, 2, 3, 4];
        assert_eq!(remap_nearest(&depth, 2, 2, 2, 2), depth);
    }

    #[test]
    fn downscale_samples_the_source_grid() {
        // 4x2 -> 2x2: expect columns 0 and 2 of each row
        let depth = vec![10u16, 11, 12, 13, 20, 21, 22, 23];
        assert_eq!(remap_nearest(&depth, 4, 2, 2, 2), vec![10, 12, 20, 22]);
    }

    #[test]
    fn upscale_repeats_source_samples() {
        let depth = vec![1u16, 2, 3, 4];
        let out = remap_nearest(&depth, 2, 2, 4, 4);
        assert_eq!(out.len(), 16);
        assert_eq!(out[0], 1);
        assert_eq!(out[3], 2);
        assert_eq!(out[15], 4);
    }
}
