use serde::{Deserialize, Serialize};

/// Bounding box for a detected face, with optional facial landmarks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
    /// Five-point facial landmarks: [left_eye, right_eye, nose, left_mouth, right_mouth].
    pub landmarks: Option<[(f32, f32); 5]>,
}

/// Face embedding vector (512-dimensional for ArcFace).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embedding {
    pub values: Vec<f32>,
    /// Model version that produced this embedding (e.g., "w600k_r50").
    pub model_version: Option<String>,
}

impl Embedding {
    /// Cosine similarity in [-1, 1]. Higher = more similar.
    pub fn similarity(&self, other: &Embedding) -> f32 {
        let mut dot = 0.0f32;
        let mut norm_a = 0.0f32;
        let mut norm_b = 0.0f32;

        for (a, b) in self.values.iter().zip(other.values.iter()) {
            dot += a * b;
            norm_a += a * a;
            norm_b += b * b;
        }

        let denom = norm_a.sqrt() * norm_b.sqrt();
        if denom > 0.0 { dot / denom } else { 0.0 }
    }
}

/// One face found by a face mesh pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedFace {
    pub bbox: BoundingBox,
    /// Present only when a recognizer is configured and the face had landmarks.
    pub embedding: Option<Embedding>,
}

/// Raw result of one face mesh pass over an image. May hold zero faces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaceMeshResult {
    pub faces: Vec<DetectedFace>,
}

impl FaceMeshResult {
    pub fn has_faces(&self) -> bool {
        !self.faces.is_empty()
    }

    /// Embeddings of all faces that have one, in detection order.
    pub fn embeddings(&self) -> impl Iterator<Item = &Embedding> {
        self.faces.iter().filter_map(|f| f.embedding.as_ref())
    }
}

/// Result of matching candidate embeddings against the reference embeddings.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub matched: bool,
    /// Best cosine similarity seen [-1, 1]; 0.0 when nothing was compared.
    pub similarity: f32,
}

/// Strategy for comparing candidate faces against the reference faces.
pub trait Matcher {
    fn compare(&self, probes: &[&Embedding], gallery: &[&Embedding], threshold: f32) -> MatchResult;
}

/// Best-pair cosine similarity over every (probe, reference) combination.
pub struct CosineMatcher;

impl Matcher for CosineMatcher {
    fn compare(&self, probes: &[&Embedding], gallery: &[&Embedding], threshold: f32) -> MatchResult {
        let best = probes
            .iter()
            .flat_map(|p| gallery.iter().map(move |g| p.similarity(g)))
            .fold(f32::NEG_INFINITY, f32::max);

        if best == f32::NEG_INFINITY {
            return MatchResult { matched: false, similarity: 0.0 };
        }

        MatchResult {
            matched: best >= threshold,
            similarity: best,
        }
    }
}
