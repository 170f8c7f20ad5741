use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Frame-source failure, carrying the failed operation and its arguments
    /// so the diagnostic reads like the camera SDK's own error report.
    #[error("camera error calling {op}({details})")]
    Camera { op: &'static str, details: String },

    #[error("detector error: {0}")]
    Detector(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("OpenCV error: {0}")]
    OpenCv(#[from] opencv::Error),
}

impl Error {
    pub fn camera(op: &'static str, details: impl Into<String>) -> Self {
        Error::Camera {
            op,
            details: details.into(),
        }
    }

    /// True for failures raised by the frame source, as opposed to detector,
    /// config or drawing failures.
    pub fn is_camera(&self) -> bool {
        matches!(self, Error::Camera { .. })
    }
}
