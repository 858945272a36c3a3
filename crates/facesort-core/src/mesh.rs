//! Face mesh seam: a scoped detector context and the provider that opens it.
//!
//! Every reference load and every classification opens its own context and
//! drops it before returning, on success and on error alike.

use crate::detector::{DetectorError, FaceDetector};
use crate::recognizer::{FaceRecognizer, RecognizerError};
use crate::types::{DetectedFace, FaceMeshResult};
use image::RgbImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DETECTOR_MODEL_FILE: &str = "det_10g.onnx";
pub const RECOGNIZER_MODEL_FILE: &str = "w600k_r50.onnx";

#[derive(Error, Debug)]
pub enum MeshError {
    #[error("detector: {0}")]
    Detector(#[from] DetectorError),
    #[error("recognizer: {0}")]
    Recognizer(#[from] RecognizerError),
}

/// One open detector context.
pub trait FaceMesh {
    /// Run landmark extraction on an RGB image. Zero faces is not an error.
    fn process(&mut self, image: &RgbImage) -> Result<FaceMeshResult, MeshError>;
}

/// Opens detector contexts.
pub trait FaceMeshProvider {
    fn open(&self) -> Result<Box<dyn FaceMesh>, MeshError>;
}

/// SCRFD detection, plus ArcFace embeddings when a recognizer is loaded.
pub struct OnnxFaceMesh {
    detector: FaceDetector,
    recognizer: Option<FaceRecognizer>,
}

impl FaceMesh for OnnxFaceMesh {
    fn process(&mut self, image: &RgbImage) -> Result<FaceMeshResult, MeshError> {
        let boxes = self.detector.detect(image)?;

        let mut faces = Vec::with_capacity(boxes.len());
        for bbox in boxes {
            let embedding = match (&mut self.recognizer, bbox.landmarks.is_some()) {
                (Some(recognizer), true) => Some(recognizer.extract(image, &bbox)?),
                _ => None,
            };
            faces.push(DetectedFace { bbox, embedding });
        }

        Ok(FaceMeshResult { faces })
    }
}

/// Loads ONNX sessions from a model directory on every `open`.
#[derive(Debug, Clone)]
pub struct OnnxFaceMeshProvider {
    detector_path: PathBuf,
    recognizer_path: Option<PathBuf>,
}

impl OnnxFaceMeshProvider {
    /// Detector only: enough for presence classification.
    pub fn detector_only(model_dir: &Path) -> Self {
        Self {
            detector_path: model_dir.join(DETECTOR_MODEL_FILE),
            recognizer_path: None,
        }
    }

    /// Detector and recognizer: required for identity classification.
    pub fn with_recognizer(model_dir: &Path) -> Self {
        Self {
            detector_path: model_dir.join(DETECTOR_MODEL_FILE),
            recognizer_path: Some(model_dir.join(RECOGNIZER_MODEL_FILE)),
        }
    }

    pub fn detector_path(&self) -> &Path {
        &self.detector_path
    }

    pub fn recognizer_path(&self) -> Option<&Path> {
        self.recognizer_path.as_deref()
    }
}

impl FaceMeshProvider for OnnxFaceMeshProvider {
    fn open(&self) -> Result<Box<dyn FaceMesh>, MeshError> {
        let detector = FaceDetector::load(&self.detector_path)?;
        let recognizer = self
            .recognizer_path
            .as_deref()
            .map(FaceRecognizer::load)
            .transpose()?;

        Ok(Box::new(OnnxFaceMesh { detector, recognizer }))
    }
}

/// Default model directory: `$XDG_DATA_HOME/facesort/models`, falling back
/// to `~/.local/share/facesort/models`.
pub fn default_model_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local/share")
        })
        .join("facesort")
        .join("models")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_paths() {
        let dir = Path::new("/models");
        let presence = OnnxFaceMeshProvider::detector_only(dir);
        assert_eq!(presence.detector_path(), Path::new("/models/det_10g.onnx"));
        assert!(presence.recognizer_path().is_none());

        let identity = OnnxFaceMeshProvider::with_recognizer(dir);
        assert_eq!(identity.recognizer_path(), Some(Path::new("/models/w600k_r50.onnx")));
    }

    #[test]
    fn test_open_missing_model_fails() {
        let provider = OnnxFaceMeshProvider::detector_only(Path::new("/nonexistent/facesort"));
        match provider.open() {
            Err(MeshError::Detector(DetectorError::ModelNotFound(path))) => {
                assert!(path.ends_with("det_10g.onnx"));
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("open should fail without a model"),
        }
    }

    #[test]
    fn test_default_model_dir_suffix() {
        assert!(default_model_dir().ends_with("facesort/models"));
    }
}
