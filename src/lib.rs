pub mod config;
pub mod detection;
pub mod detector;
pub mod error;
pub mod filter;
pub mod frame;
pub mod pipeline;
#[cfg(feature = "realsense")]
pub mod realsense;
pub mod source;

pub use config::{DetectorSpec, PipelineConfig, StreamSpec};
pub use detection::{FaceDetection, PixelRect};
pub use detector::{DnnFaceDetector, FaceDetector, StubFaceDetector};
pub use error::Error;
pub use filter::BackgroundFilter;
pub use frame::FramePair;
pub use pipeline::{Pipeline, ProcessedFrame};
#[cfg(feature = "realsense")]
pub use realsense::RealSenseSource;
pub use source::{FrameSource, SyntheticSource};
