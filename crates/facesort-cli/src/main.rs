use anyhow::{Context, Result};
use clap::Parser;
use facesort_core::{load_reference, FaceClassifier, MatchMode};
use std::io::Write;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod config;
mod report;
mod router;
#[cfg(test)]
mod test_support;

use config::{CliArgs, Config};
use report::RunReport;
use router::Router;

/// Run finished, but some failed files could not be moved to `failed/`.
const EXIT_UNQUARANTINED: u8 = 2;

fn main() -> ExitCode {
    // stdout is reserved for the per-file diagnostic lines
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_args(CliArgs::parse());

    match run(&config) {
        Ok(report) => ExitCode::from(exit_status(&report)),
        Err(e) => {
            eprintln!("facesort: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<RunReport> {
    config.validate()?;

    tracing::info!(
        source = %config.source_root.display(),
        output = %config.output_root.display(),
        model_dir = %config.model_dir.display(),
        mode = ?config.mode,
        "facesort starting"
    );
    if config.mode == MatchMode::Presence {
        tracing::warn!(
            "presence mode: every photo with any face goes to child/, the reference is not compared \
             (use --mode identity to match the reference face)"
        );
    }

    let classifier = FaceClassifier::new(Box::new(config.face_mesh_provider()), config.mode);
    let router = Router::new(&config.output_root, classifier, std::io::stdout().lock())
        .context("failed to prepare output folders")?;

    sort(config, router)
}

/// Everything after the output folders exist: reference, walk, report.
/// A reference that cannot be used stops the run before any file moves.
fn sort<W: Write>(config: &Config, mut router: Router<W>) -> Result<RunReport> {
    let reference = load_reference(&config.reference_image_path, router.classifier().provider())
        .context("failed to load reference face")?;
    if let MatchMode::Identity { .. } = config.mode {
        reference.require_embedding()?;
    }

    let report = router.route(&config.source_root, &reference);
    report.log_summary();

    if let Some(path) = &config.report_path {
        report.write_json(path)?;
        tracing::info!(path = %path.display(), "run report written");
    }

    Ok(report)
}

fn exit_status(report: &RunReport) -> u8 {
    if report.unquarantined > 0 {
        EXIT_UNQUARANTINED
    } else {
        0
    }
}
