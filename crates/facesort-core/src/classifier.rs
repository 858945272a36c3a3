//! Decides whether a decoded photo belongs in `child/`.
//!
//! `MatchMode::Presence` answers "is any face visible" and never reads the
//! reference. `MatchMode::Identity` compares ArcFace embeddings against the
//! reference and is the mode that actually identifies the child.

use crate::mesh::FaceMeshProvider;
use crate::reference::ReferenceFace;
use crate::types::{CosineMatcher, Embedding, Matcher};
use image::DynamicImage;

/// Cosine similarity at which two ArcFace embeddings are the same person.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.40;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MatchMode {
    /// Any detected face counts.
    #[default]
    Presence,
    /// Some detected face must match a reference face.
    Identity { threshold: f32 },
}

pub struct FaceClassifier {
    provider: Box<dyn FaceMeshProvider>,
    mode: MatchMode,
}

impl FaceClassifier {
    pub fn new(provider: Box<dyn FaceMeshProvider>, mode: MatchMode) -> Self {
        Self { provider, mode }
    }

    pub fn provider(&self) -> &dyn FaceMeshProvider {
        self.provider.as_ref()
    }

    /// `None` (an image that failed to decode) is never a match. Detector
    /// failures count as "no face".
    pub fn has_face(&self, image: Option<&DynamicImage>, reference: &ReferenceFace) -> bool {
        let Some(image) = image else {
            return false;
        };

        let rgb = image.to_rgb8();
        let result = match self.provider.open().and_then(|mut mesh| mesh.process(&rgb)) {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!(error = %e, "face mesh failed, treating as no face");
                return false;
            }
        };

        match self.mode {
            MatchMode::Presence => result.has_faces(),
            MatchMode::Identity { threshold } => {
                let probes: Vec<&Embedding> = result.embeddings().collect();
                let outcome = CosineMatcher.compare(&probes, &reference.embeddings(), threshold);
                tracing::debug!(
                    faces = result.faces.len(),
                    similarity = outcome.similarity,
                    matched = outcome.matched,
                    "identity comparison"
                );
                outcome.matched
            }
        }
    }
}
