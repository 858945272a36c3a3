use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use facesort_core::{MatchMode, OnnxFaceMeshProvider, DEFAULT_SIMILARITY_THRESHOLD};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "facesort",
    version,
    about = "Sort a photo tree into child / no_child / videos / failed"
)]
pub struct CliArgs {
    /// Directory to scan recursively
    #[arg(short, long)]
    pub source: PathBuf,
    /// Directory that receives child/, no_child/, videos/ and failed/
    #[arg(short, long)]
    pub output: PathBuf,
    /// Reference photo of the child
    #[arg(short, long)]
    pub reference: PathBuf,
    /// presence: any face counts. identity: face must match the reference
    #[arg(long, value_enum, default_value_t = ModeArg::Presence)]
    pub mode: ModeArg,
    /// Cosine similarity threshold for identity mode [env: FACESORT_SIMILARITY_THRESHOLD]
    #[arg(long)]
    pub threshold: Option<f32>,
    /// Directory containing det_10g.onnx (and w600k_r50.onnx for identity mode) [env: FACESORT_MODEL_DIR]
    #[arg(long)]
    pub model_dir: Option<PathBuf>,
    /// Write a JSON run report to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Presence,
    Identity,
}

/// Resolved run configuration. Passed explicitly; nothing global.
#[derive(Debug, Clone)]
pub struct Config {
    pub source_root: PathBuf,
    pub output_root: PathBuf,
    pub reference_image_path: PathBuf,
    /// Directory containing ONNX model files.
    pub model_dir: PathBuf,
    pub mode: MatchMode,
    pub report_path: Option<PathBuf>,
}

impl Config {
    /// Command-line values win over `FACESORT_*` environment variables.
    pub fn from_args(args: CliArgs) -> Self {
        let model_dir = args
            .model_dir
            .or_else(|| std::env::var("FACESORT_MODEL_DIR").ok().map(PathBuf::from))
            .unwrap_or_else(facesort_core::default_model_dir);

        let mode = match args.mode {
            ModeArg::Presence => MatchMode::Presence,
            ModeArg::Identity => MatchMode::Identity {
                threshold: args.threshold.unwrap_or_else(|| {
                    env_f32("FACESORT_SIMILARITY_THRESHOLD", DEFAULT_SIMILARITY_THRESHOLD)
                }),
            },
        };

        Self {
            source_root: args.source,
            output_root: args.output,
            reference_image_path: args.reference,
            model_dir,
            mode,
            report_path: args.report,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_directory_exists(&self.source_root)?;
        if let MatchMode::Identity { threshold } = self.mode {
            if !(-1.0..=1.0).contains(&threshold) {
                bail!("similarity threshold must be within [-1, 1], got {threshold}");
            }
        }
        Ok(())
    }

    /// Identity mode also needs the recognizer model.
    pub fn face_mesh_provider(&self) -> OnnxFaceMeshProvider {
        match self.mode {
            MatchMode::Presence => OnnxFaceMeshProvider::detector_only(&self.model_dir),
            MatchMode::Identity { .. } => OnnxFaceMeshProvider::with_recognizer(&self.model_dir),
        }
    }
}

fn validate_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("source path does not exist: {}", path.display());
    }
    if !path.is_dir() {
        bail!("source path is not a directory: {}", path.display());
    }
    Ok(())
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
