use crate::config::DetectorSpec;
use crate::detection::FaceDetection;
use crate::error::Error;

use log::debug;
use ndarray::prelude::*;
use opencv::{core, dnn, prelude::*};

/// Face detector seam. Input is a BGR image already resized to the
/// detector's input size; output is normalized rectangles relative to it.
pub trait FaceDetector {
    fn detect(&mut self, image: &core::Mat) -> Result<Vec<FaceDetection>, Error>;
}

impl FaceDetector for Box<dyn FaceDetector> {
    fn detect(&mut self, image: &core::Mat) -> Result<Vec<FaceDetection>, Error> {
        (**self).detect(image)
    }
}

/// OpenCV DNN backend for SSD-style face detectors (e.g. the res10 caffe
/// model), whose single output is rows of
/// `[batch_id, class_id, confidence, x1, y1, x2, y2]` with normalized
/// corner coordinates.
pub struct DnnFaceDetector {
    net: dnn::Net,
    spec: DetectorSpec,
}

const DETECTION_FIELDS: usize = 7;

impl DnnFaceDetector {
    /// Loads a model file (and optional text config, empty string for none);
    /// the framework is inferred from the file extensions.
    pub fn new(model_path: &str, config_path: &str, spec: DetectorSpec) -> Result<Self, Error> {
        let net = dnn::read_net(model_path, config_path, "")
            .map_err(|err| Error::Detector(format!("failed to load {}: {}", model_path, err)))?;

        Ok(Self { net, spec })
    }

    fn postprocess(&self, out: &core::Mat) -> Result<Vec<FaceDetection>, Error> {
        let data = out
            .data_typed::<f32>()
            .map_err(|err| Error::Detector(format!("unexpected output tensor: {}", err)))?;

        if data.len() % DETECTION_FIELDS != 0 {
            return Err(Error::Detector(format!(
                "output length {} is not a multiple of {}",
                data.len(),
                DETECTION_FIELDS
            )));
        }

        let rows = data.len() / DETECTION_FIELDS;
        let view = aview1(data)
            .into_shape((rows, DETECTION_FIELDS))
            .map_err(|err| Error::Detector(format!("output reshape failed: {}", err)))?;

        let mut faces = Vec::new();
        for row in view.outer_iter() {
            let confidence = row[2];
            if confidence < self.spec.confidence_threshold {
                continue;
            }

            let (x1, y1, x2, y2) = (row[3], row[4], row[5], row[6]);
            faces.push(FaceDetection {
                x: x1,
                y: y1,
                w: x2 - x1,
                h: y2 - y1,
                confidence,
            });
        }

        debug!("detector: {} face(s) above threshold", faces.len());
        Ok(faces)
    }
}

impl FaceDetector for DnnFaceDetector {
    fn detect(&mut self, image: &core::Mat) -> Result<Vec<FaceDetection>, Error> {
        let size = core::Size::new(self.spec.input_width as i32, self.spec.input_height as i32);
        let blob = dnn::blob_from_image(
            image,
            1.0,
            size,
            // BGR channel means of the res10 training set
            core::Scalar::new(104.0, 177.0, 123.0, 0.0),
            false,
            false,
            core::CV_32F,
        )?;

        self.net
            .set_input(&blob, "", 1.0, core::Scalar::default())
            .map_err(|err| Error::Detector(format!("set_input failed: {}", err)))?;

        let names = self
            .net
            .get_unconnected_out_layers_names()
            .map_err(|err| Error::Detector(format!("output layer query failed: {}", err)))?;
        let mut outs = core::Vector::<core::Mat>::new();
        self.net
            .forward(&mut outs, &names)
            .map_err(|err| Error::Detector(format!("inference failed: {}", err)))?;

        let out = outs
            .get(0)
            .map_err(|err| Error::Detector(format!("no output tensor: {}", err)))?;

        self.postprocess(&out)
    }
}

/// Canned-output detector for tests and camera-less runs: every call reports
/// the same fixed set of rectangles.
pub struct StubFaceDetector {
    faces: Vec<FaceDetection>,
}

impl StubFaceDetector {
    pub fn new(faces: Vec<FaceDetection>) -> Self {
        Self { faces }
    }

    /// A stub that never detects anything.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl FaceDetector for StubFaceDetector {
    fn detect(&mut self, _image: &core::Mat) -> Result<Vec<FaceDetection>, Error> {
        Ok(self.faces.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_detector_replays_its_faces() {
        let face = FaceDetection {
            x: 0.1,
            y: 0.2,
            w: 0.3,
            h: 0.4,
            confidence: 0.8,
        };
        let mut stub = StubFaceDetector::new(vec![face]);
        let image = core::Mat::default();

        let first = stub.detect(&image).unwrap();
        let second = stub.detect(&image).unwrap();
        assert_eq!(first, vec![face]);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_stub_detects_nothing() {
        let mut stub = StubFaceDetector::empty();
        assert!(stub.detect(&core::Mat::default()).unwrap().is_empty());
    }
}
