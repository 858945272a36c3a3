use anyhow::{Context, Result};
use facesort_fs::Destination;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A per-file failure. `reason` is why the file was not routed normally;
/// `quarantine_error` is set when it could not be moved to `failed/` either.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteFailure {
    pub reason: String,
    pub quarantined_to: Option<PathBuf>,
    pub quarantine_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RouteOutcome {
    Routed {
        destination: Destination,
        target: PathBuf,
    },
    /// Extension is neither video nor image; file left in place.
    Skipped,
    Failed(RouteFailure),
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteRecord {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: RouteOutcome,
}

#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    /// Files that ended up in each folder, quarantined failures included.
    pub counts: BTreeMap<Destination, usize>,
    pub skipped: usize,
    pub failed: usize,
    /// Failed files that could not be moved to `failed/` and stayed in place.
    pub unquarantined: usize,
    pub walk_errors: usize,
    pub files: Vec<RouteRecord>,
}

impl RunReport {
    pub fn record(&mut self, path: PathBuf, outcome: RouteOutcome) {
        match &outcome {
            RouteOutcome::Routed { destination, .. } => {
                *self.counts.entry(*destination).or_insert(0) += 1;
            }
            RouteOutcome::Skipped => self.skipped += 1,
            RouteOutcome::Failed(failure) => {
                self.failed += 1;
                if failure.quarantined_to.is_some() {
                    *self.counts.entry(Destination::Failed).or_insert(0) += 1;
                } else {
                    self.unquarantined += 1;
                }
            }
        }
        self.files.push(RouteRecord { path, outcome });
    }

    pub fn count(&self, destination: Destination) -> usize {
        self.counts.get(&destination).copied().unwrap_or(0)
    }

    pub fn log_summary(&self) {
        tracing::info!(
            child = self.count(Destination::Child),
            no_child = self.count(Destination::NoChild),
            videos = self.count(Destination::Videos),
            failed = self.count(Destination::Failed),
            skipped = self.skipped,
            unquarantined = self.unquarantined,
            walk_errors = self.walk_errors,
            "sorting finished"
        );
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("failed to serialize run report")?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write run report to {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn failure(quarantined: bool) -> RouteOutcome {
        RouteOutcome::Failed(RouteFailure {
            reason: "decode".into(),
            quarantined_to: quarantined.then(|| PathBuf::from("/out/failed/x.jpg")),
            quarantine_error: (!quarantined).then(|| "denied".to_string()),
        })
    }

    #[test]
    fn test_record_counts() {
        let mut report = RunReport::default();
        report.record(
            "a.mp4".into(),
            RouteOutcome::Routed { destination: Destination::Videos, target: "/out/videos/a.mp4".into() },
        );
        report.record("b.txt".into(), RouteOutcome::Skipped);
        report.record("c.jpg".into(), failure(true));
        report.record("d.jpg".into(), failure(false));

        assert_eq!(report.count(Destination::Videos), 1);
        assert_eq!(report.count(Destination::Child), 0);
        assert_eq!(report.count(Destination::Failed), 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 2);
        assert_eq!(report.unquarantined, 1);
        assert_eq!(report.files.len(), 4);
    }

    #[test]
    fn test_write_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("report.json");

        let mut report = RunReport::default();
        report.record(
            "p.jpg".into(),
            RouteOutcome::Routed { destination: Destination::NoChild, target: "/out/no_child/p.jpg".into() },
        );
        report.record("q.jpg".into(), failure(false));
        report.write_json(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["counts"]["no_child"], 1);
        assert_eq!(json["files"][0]["outcome"], "routed");
        assert_eq!(json["files"][0]["destination"], "no_child");
        assert_eq!(json["files"][1]["outcome"], "failed");
        assert_eq!(json["files"][1]["quarantine_error"], "denied");
    }
}
