//! facesort-core: reference face loading and photo classification.
//!
//! Uses SCRFD for face detection and, in identity mode, ArcFace embeddings,
//! both running via ONNX Runtime on the CPU.

pub mod alignment;
pub mod classifier;
pub mod detector;
pub mod mesh;
pub mod recognizer;
pub mod reference;
pub mod types;

pub use classifier::{FaceClassifier, MatchMode, DEFAULT_SIMILARITY_THRESHOLD};
pub use mesh::{default_model_dir, FaceMesh, FaceMeshProvider, MeshError, OnnxFaceMeshProvider};
pub use reference::{decode_image, load_reference, ReferenceError, ReferenceFace};
pub use types::{BoundingBox, DetectedFace, Embedding, FaceMeshResult};
