//! Reference face: the one known photo, processed once at startup.

use crate::mesh::{FaceMeshProvider, MeshError};
use crate::types::{Embedding, FaceMeshResult};
use image::{DynamicImage, ImageDecoder, ImageError, ImageReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("could not load reference image {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: ImageError,
    },
    #[error("face mesh failed on reference image: {0}")]
    Mesh(#[from] MeshError),
    #[error("no face with an embedding found in reference image {0}")]
    NoFaceEmbedding(PathBuf),
}

/// Decode an image by its content, not its extension, and turn it upright
/// according to its EXIF orientation.
pub fn decode_image(path: &Path) -> Result<DynamicImage, ImageError> {
    let mut decoder = ImageReader::open(path)?.with_guessed_format()?.into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut image = DynamicImage::from_decoder(decoder)?;
    image.apply_orientation(orientation);
    Ok(image)
}

/// Landmark result for the reference photo. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct ReferenceFace {
    path: PathBuf,
    result: FaceMeshResult,
}

impl ReferenceFace {
    pub fn new(path: impl Into<PathBuf>, result: FaceMeshResult) -> Self {
        Self { path: path.into(), result }
    }

    pub fn result(&self) -> &FaceMeshResult {
        &self.result
    }

    pub fn embeddings(&self) -> Vec<&Embedding> {
        self.result.embeddings().collect()
    }

    /// Identity matching needs at least one reference embedding.
    pub fn require_embedding(&self) -> Result<(), ReferenceError> {
        if self.result.embeddings().next().is_none() {
            return Err(ReferenceError::NoFaceEmbedding(self.path.clone()));
        }
        Ok(())
    }
}

/// Load the reference photo and run one face mesh pass over it.
///
/// The detector context lives only for this call.
pub fn load_reference(
    path: &Path,
    provider: &dyn FaceMeshProvider,
) -> Result<ReferenceFace, ReferenceError> {
    let image = decode_image(path).map_err(|source| ReferenceError::Load {
        path: path.to_path_buf(),
        source,
    })?;

    let rgb = image.into_rgb8();
    let result = {
        let mut mesh = provider.open()?;
        mesh.process(&rgb)?
    };

    tracing::info!(
        path = %path.display(),
        faces = result.faces.len(),
        embeddings = result.embeddings().count(),
        "reference face loaded"
    );

    Ok(ReferenceFace::new(path, result))
}
