use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MoveError {
    #[error("{0} has no file name")]
    NoFileName(PathBuf),
    #[error("cannot move {from} to {to}: {source}")]
    Transfer {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("copied {from} to {to} but could not delete the original: {source}")]
    RemoveOriginal {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Move `source` into `dir`, keeping its file name.
///
/// Tries a rename first and falls back to copy-then-delete (e.g. across
/// filesystems). An existing file of the same name is overwritten where the
/// platform allows it; no renaming is attempted on collision.
pub fn move_into(source: &Path, dir: &Path) -> Result<PathBuf, MoveError> {
    let name = source
        .file_name()
        .ok_or_else(|| MoveError::NoFileName(source.to_path_buf()))?;
    let target = dir.join(name);

    let rename_err = match fs::rename(source, &target) {
        Ok(()) => {
            tracing::debug!(from = %source.display(), to = %target.display(), "moved");
            return Ok(target);
        }
        Err(e) => e,
    };

    tracing::debug!(
        from = %source.display(),
        error = %rename_err,
        "rename failed, falling back to copy"
    );

    fs::copy(source, &target).map_err(|source_err| MoveError::Transfer {
        from: source.to_path_buf(),
        to: target.clone(),
        source: source_err,
    })?;

    fs::remove_file(source).map_err(|source_err| MoveError::RemoveOriginal {
        from: source.to_path_buf(),
        to: target.clone(),
        source: source_err,
    })?;

    Ok(target)
}
