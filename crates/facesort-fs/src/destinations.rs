//! The four output folders under the output root.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
#[error("cannot create output folder {path}: {source}")]
pub struct CreateError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    Child,
    NoChild,
    Videos,
    Failed,
}

impl Destination {
    pub const ALL: [Destination; 4] = [Self::Child, Self::NoChild, Self::Videos, Self::Failed];

    pub const fn folder_name(self) -> &'static str {
        match self {
            Self::Child => "child",
            Self::NoChild => "no_child",
            Self::Videos => "videos",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder_name())
    }
}

/// Resolved output folders. Read-only once created.
#[derive(Debug, Clone)]
pub struct Destinations {
    root: PathBuf,
}

impl Destinations {
    /// Create all four folders under `root`. Safe to call repeatedly.
    pub fn create(root: &Path) -> Result<Self, CreateError> {
        for dest in Destination::ALL {
            let path = root.join(dest.folder_name());
            std::fs::create_dir_all(&path).map_err(|source| CreateError {
                path: path.clone(),
                source,
            })?;
        }
        tracing::debug!(root = %root.display(), "output folders ready");
        Ok(Self { root: root.to_path_buf() })
    }

    pub fn dir(&self, dest: Destination) -> PathBuf {
        self.root.join(dest.folder_name())
    }

    pub fn all_dirs(&self) -> Vec<PathBuf> {
        Destination::ALL.iter().map(|&d| self.dir(d)).collect()
    }
}
