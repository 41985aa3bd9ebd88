//! Configuration loading for ppiscreen.
//! Reads ppiscreen.toml from the current directory, or the path given with
//! --config / the PPISCREEN_CONFIG env var, then applies command-line overrides.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use ppiscreen_common::PipelineConfig;
use tracing::{info, warn};

pub const DEFAULT_CONFIG_FILE: &str = "ppiscreen.toml";

/// Operator scalars that can be set on the command line.
#[derive(Debug, Clone, Default, Args)]
pub struct Overrides {
    /// Input table (overrides input.path)
    #[arg(long, short)]
    pub input: Option<PathBuf>,

    /// Potency above this value is labelled potent
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Fingerprint bit width
    #[arg(long)]
    pub bits: Option<usize>,

    /// Fingerprint radius
    #[arg(long)]
    pub radius: Option<usize>,

    /// Variance cutoff for fingerprint columns
    #[arg(long)]
    pub variance_threshold: Option<f64>,

    /// Fraction of rows held out for testing
    #[arg(long)]
    pub test_fraction: Option<f64>,

    /// Seed for the split and the SVC row order
    #[arg(long)]
    pub seed: Option<u64>,

    /// Keep class proportions in train and test
    #[arg(long)]
    pub stratify: bool,
}

impl Overrides {
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(ref input) = self.input {
            config.input.path = Some(input.to_string_lossy().into_owned());
        }
        if let Some(t) = self.threshold {
            config.labeling.potency_threshold = t;
        }
        if let Some(bits) = self.bits {
            config.fingerprint.n_bits = bits;
        }
        if let Some(radius) = self.radius {
            config.fingerprint.radius = radius;
        }
        if let Some(v) = self.variance_threshold {
            config.selection.variance_threshold = v;
        }
        if let Some(f) = self.test_fraction {
            config.split.test_fraction = f;
        }
        if let Some(seed) = self.seed {
            config.split.seed = seed;
        }
        if self.stratify {
            config.split.stratify = true;
        }
    }
}

/// Load the pipeline configuration.
///
/// An explicit path must exist. Without one, `ppiscreen.toml` in the current
/// directory is used when present, else the built-in defaults.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    let config = match explicit {
        Some(path) => PipelineConfig::from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => PipelineConfig::from_path(DEFAULT_CONFIG_FILE)
            .with_context(|| format!("Failed to load {DEFAULT_CONFIG_FILE}"))?,
        None => {
            warn!(
                "No {} found, using built-in defaults. Copy ppiscreen.example.toml to {} to change them.",
                DEFAULT_CONFIG_FILE, DEFAULT_CONFIG_FILE
            );
            PipelineConfig::default()
        }
    };
    Ok(config)
}

/// Load, override and validate in one step.
pub fn resolve(explicit: Option<&Path>, overrides: &Overrides) -> anyhow::Result<PipelineConfig> {
    let mut config = load(explicit)?;
    overrides.apply(&mut config);
    config.validate().context("Invalid configuration")?;
    info!(
        "Configuration: threshold {}, {} bits (radius {}), variance > {}, test fraction {}, seed {}",
        config.labeling.potency_threshold,
        config.fingerprint.n_bits,
        config.fingerprint.radius,
        config.selection.variance_threshold,
        config.split.test_fraction,
        config.split.seed
    );
    Ok(config)
}
