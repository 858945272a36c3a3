use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Snapshot of a recursive walk.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Regular files, in walk order.
    pub files: Vec<PathBuf>,
    /// Entries that could not be read (e.g. a subdirectory without permission).
    pub errors: Vec<walkdir::Error>,
}

/// Collect every regular file under `root`, at any depth, before anything is
/// moved. Symlinks are not followed. Directories in `exclude` (the output
/// folders, when they sit inside the source tree) are pruned from the walk.
pub fn scan_files(root: &Path, exclude: &[PathBuf]) -> ScanResult {
    let exclude: Vec<PathBuf> = exclude.iter().filter_map(|p| p.canonicalize().ok()).collect();
    let mut result = ScanResult::default();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let pruned = entry.file_type().is_dir()
                && !exclude.is_empty()
                && entry
                    .path()
                    .canonicalize()
                    .is_ok_and(|p| exclude.contains(&p));
            if pruned {
                tracing::debug!(path = %entry.path().display(), "skipping output folder");
            }
            !pruned
        });

    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_file() => result.files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => result.errors.push(e),
        }
    }

    result
}
