//! File router: walks the source tree and moves each file into exactly one
//! output folder.
//!
//! Videos go to `videos/` unopened. Images are decoded and classified into
//! `child/` or `no_child/`. Everything else is left where it is. Any
//! per-file failure writes one line to the diagnostics sink and quarantines
//! the file in `failed/`; a failed quarantine is recorded and the walk goes on.

use crate::report::{RouteFailure, RouteOutcome, RunReport};
use facesort_core::{decode_image, FaceClassifier, ReferenceFace};
use facesort_fs::{move_into, scan_files, CreateError, Destination, Destinations, MediaKind, MoveError};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
enum FileError {
    #[error("cannot decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("{0}")]
    Move(#[from] MoveError),
}

pub struct Router<W: Write> {
    destinations: Destinations,
    classifier: FaceClassifier,
    diagnostics: W,
}

impl<W: Write> Router<W> {
    /// Creates the output folders up front; calling this twice on the same
    /// root is harmless.
    pub fn new(
        output_root: &Path,
        classifier: FaceClassifier,
        diagnostics: W,
    ) -> Result<Self, CreateError> {
        Ok(Self {
            destinations: Destinations::create(output_root)?,
            classifier,
            diagnostics,
        })
    }

    pub fn classifier(&self) -> &FaceClassifier {
        &self.classifier
    }

    pub fn route(&mut self, source_root: &Path, reference: &ReferenceFace) -> RunReport {
        let scan = scan_files(source_root, &self.destinations.all_dirs());
        tracing::info!(
            source = %source_root.display(),
            files = scan.files.len(),
            "scanned source tree"
        );

        let mut report = RunReport {
            walk_errors: scan.errors.len(),
            ..RunReport::default()
        };
        for err in &scan.errors {
            tracing::warn!(error = %err, "could not read directory entry");
        }

        for path in scan.files {
            let outcome = self.route_file(&path, reference);
            report.record(path, outcome);
        }

        report
    }

    fn route_file(&mut self, path: &Path, reference: &ReferenceFace) -> RouteOutcome {
        let err = match self.classify_and_move(path, reference) {
            Ok(Some((destination, target))) => {
                return RouteOutcome::Routed { destination, target };
            }
            Ok(None) => {
                tracing::trace!(path = %path.display(), "not a photo or video, left in place");
                return RouteOutcome::Skipped;
            }
            Err(err) => err,
        };

        if let Err(e) = writeln!(self.diagnostics, "failed to process {}: {}", path.display(), err) {
            tracing::warn!(error = %e, "could not write diagnostic line");
        }

        RouteOutcome::Failed(self.quarantine(path, err.to_string()))
    }

    fn classify_and_move(
        &self,
        path: &Path,
        reference: &ReferenceFace,
    ) -> Result<Option<(Destination, PathBuf)>, FileError> {
        let destination = match MediaKind::of(path) {
            MediaKind::Video => Destination::Videos,
            MediaKind::Image => {
                let image = decode_image(path)?;
                if self.classifier.has_face(Some(&image), reference) {
                    Destination::Child
                } else {
                    Destination::NoChild
                }
            }
            MediaKind::Other => return Ok(None),
        };

        let target = move_into(path, &self.destinations.dir(destination))?;
        tracing::debug!(path = %path.display(), %destination, "routed");
        Ok(Some((destination, target)))
    }

    fn quarantine(&self, path: &Path, reason: String) -> RouteFailure {
        match move_into(path, &self.destinations.dir(Destination::Failed)) {
            Ok(target) => RouteFailure {
                reason,
                quarantined_to: Some(target),
                quarantine_error: None,
            },
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "could not move file to failed folder, left in place"
                );
                RouteFailure {
                    reason,
                    quarantined_to: None,
                    quarantine_error: Some(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::BrightnessProvider;
    use facesort_core::{FaceMeshResult, MatchMode};
    use image::{Rgb, RgbImage};
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        source: PathBuf,
        output: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let source = temp.path().join("photos");
            let output = temp.path().join("sorted");
            fs::create_dir_all(&source).unwrap();
            Self { _temp: temp, source, output }
        }

        fn photo(&self, rel: &str, luma: u8) -> PathBuf {
            let path = self.source.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            RgbImage::from_pixel(32, 32, Rgb([luma, luma, luma])).save(&path).unwrap();
            path
        }

        fn raw(&self, rel: &str, bytes: &[u8]) -> PathBuf {
            let path = self.source.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, bytes).unwrap();
            path
        }

        fn router(&self) -> Router<Vec<u8>> {
            let classifier = FaceClassifier::new(Box::new(BrightnessProvider), MatchMode::Presence);
            Router::new(&self.output, classifier, Vec::new()).unwrap()
        }

        fn sorted(&self, folder: &str, name: &str) -> PathBuf {
            self.output.join(folder).join(name)
        }
    }

    fn empty_reference() -> ReferenceFace {
        ReferenceFace::new("ref.jpg", FaceMeshResult::default())
    }

    fn diagnostics(router: &Router<Vec<u8>>) -> Vec<String> {
        String::from_utf8(router.diagnostics.clone())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_end_to_end_sorting() {
        let fx = Fixture::new();
        fx.raw("clip.mp4", b"not really a video");
        fx.photo("portrait.jpg", 230);
        fx.photo("landscape.jpg", 20);
        fx.raw("corrupt.jpg", b"\x00\x01garbage");
        let notes = fx.raw("notes.txt", b"remember the milk");

        let mut router = fx.router();
        let report = router.route(&fx.source, &empty_reference());

        assert!(fx.sorted("videos", "clip.mp4").exists());
        assert!(fx.sorted("child", "portrait.jpg").exists());
        assert!(fx.sorted("no_child", "landscape.jpg").exists());
        assert!(fx.sorted("failed", "corrupt.jpg").exists());
        assert!(notes.exists());
        assert!(!fx.sorted("failed", "notes.txt").exists());

        for name in ["clip.mp4", "portrait.jpg", "landscape.jpg", "corrupt.jpg"] {
            assert!(!fx.source.join(name).exists(), "{name} should have been moved");
        }

        assert_eq!(report.count(Destination::Videos), 1);
        assert_eq!(report.count(Destination::Child), 1);
        assert_eq!(report.count(Destination::NoChild), 1);
        assert_eq!(report.count(Destination::Failed), 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.unquarantined, 0);
    }

    #[test]
    fn test_corrupt_image_logs_one_line() {
        let fx = Fixture::new();
        let corrupt = fx.raw("corrupt.jpg", b"not a jpeg");
        fx.photo("fine.png", 20);

        let mut router = fx.router();
        router.route(&fx.source, &empty_reference());

        let lines = diagnostics(&router);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains(&corrupt.display().to_string()));
    }

    #[test]
    fn test_video_is_never_decoded() {
        let fx = Fixture::new();
        // garbage bytes would fail to decode if opened as an image
        fx.raw("deep/nested/MOVIE.MKV", b"\xff\xd8 not a jpeg");

        let mut router = fx.router();
        let report = router.route(&fx.source, &empty_reference());

        assert!(fx.sorted("videos", "MOVIE.MKV").exists());
        assert_eq!(report.failed, 0);
        assert!(diagnostics(&router).is_empty());
    }

    #[test]
    fn test_unknown_extensions_untouched() {
        let fx = Fixture::new();
        let files = [
            fx.raw("a.txt", b"x"),
            fx.raw("sub/b.heic", b"x"),
            fx.raw("no_extension", b"x"),
        ];

        let mut router = fx.router();
        let report = router.route(&fx.source, &empty_reference());

        assert_eq!(report.skipped, 3);
        for file in &files {
            assert!(file.exists());
        }
        for dest in Destination::ALL {
            let entries = fs::read_dir(fx.output.join(dest.folder_name())).unwrap().count();
            assert_eq!(entries, 0, "{dest} should be empty");
        }
    }

    #[test]
    fn test_nested_output_folder_is_not_revisited() {
        let fx = Fixture::new();
        fx.photo("portrait.jpg", 230);
        let classifier = FaceClassifier::new(Box::new(BrightnessProvider), MatchMode::Presence);
        let mut router = Router::new(&fx.source.join("sorted"), classifier, Vec::new()).unwrap();

        let first = router.route(&fx.source, &empty_reference());
        let second = router.route(&fx.source, &empty_reference());

        assert_eq!(first.count(Destination::Child), 1);
        assert!(second.files.is_empty());
        assert!(fx.source.join("sorted/child/portrait.jpg").exists());
    }

    #[test]
    fn test_move_failure_is_quarantined() {
        let fx = Fixture::new();
        fx.raw("clip.mov", b"x");
        let mut router = fx.router();

        // videos/ replaced by a plain file: the move there must fail
        let videos = fx.output.join("videos");
        fs::remove_dir(&videos).unwrap();
        fs::write(&videos, b"in the way").unwrap();

        let report = router.route(&fx.source, &empty_reference());

        assert!(fx.sorted("failed", "clip.mov").exists());
        assert_eq!(report.count(Destination::Failed), 1);
        assert_eq!(diagnostics(&router).len(), 1);
    }

    #[test]
    fn test_failed_quarantine_does_not_abort_walk() {
        let fx = Fixture::new();
        let corrupt = fx.raw("a_corrupt.jpg", b"garbage");
        fx.raw("b_clip.mp4", b"x");
        let mut router = fx.router();

        let failed = fx.output.join("failed");
        fs::remove_dir(&failed).unwrap();
        fs::write(&failed, b"in the way").unwrap();

        let report = router.route(&fx.source, &empty_reference());

        assert!(corrupt.exists(), "unquarantined file stays in place");
        assert!(fx.sorted("videos", "b_clip.mp4").exists());
        assert_eq!(report.unquarantined, 1);

        let failure = report
            .files
            .iter()
            .find_map(|r| match &r.outcome {
                RouteOutcome::Failed(f) => Some(f.clone()),
                _ => None,
            })
            .unwrap();
        assert!(failure.reason.contains("decode"));
        assert!(failure.quarantined_to.is_none());
        assert!(failure.quarantine_error.is_some());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subdirectory_counts_as_walk_error() {
        use std::os::unix::fs::PermissionsExt;

        let fx = Fixture::new();
        fx.photo("a.jpg", 20);
        let locked = fx.source.join("locked");
        fx.photo("locked/hidden.jpg", 20);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            // permission bits are not enforced for this user (e.g. root)
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let mut router = fx.router();
        let report = router.route(&fx.source, &empty_reference());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(report.walk_errors, 1);
        assert!(fx.sorted("no_child", "a.jpg").exists());
        assert!(locked.join("hidden.jpg").exists());
    }

    #[test]
    fn test_missing_source_root_counts_as_walk_error() {
        let fx = Fixture::new();
        let mut router = fx.router();

        let report = router.route(&fx.source.join("gone"), &empty_reference());

        assert_eq!(report.walk_errors, 1);
        assert!(report.files.is_empty());
    }

    #[test]
    fn test_router_new_is_idempotent() {
        let fx = Fixture::new();
        let _first = fx.router();
        let _second = fx.router();
        for dest in Destination::ALL {
            assert!(fx.output.join(dest.folder_name()).is_dir());
        }
    }
}
