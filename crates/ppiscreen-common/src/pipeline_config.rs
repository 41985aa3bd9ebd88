//! Pipeline configuration.
//!
//! Every operator-facing scalar (potency threshold, fingerprint width and
//! radius, variance cutoff, test fraction, seed) lives here with its default.
//! Configs load from TOML, YAML or JSON; any missing section or field falls
//! back to the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PpiScreenError, Result};

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Input table location and layout
    #[serde(default)]
    pub input: InputConfig,

    /// Potency labelling
    #[serde(default)]
    pub labeling: LabelConfig,

    /// Fingerprint generation
    #[serde(default)]
    pub fingerprint: FingerprintConfig,

    /// Variance-threshold feature selection
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Train/test partitioning
    #[serde(default)]
    pub split: SplitConfig,

    /// Classifiers to fit
    #[serde(default)]
    pub models: ModelsConfig,

    /// Report options
    #[serde(default)]
    pub output: OutputConfig,
}

// ── Input ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Path to the delimited table
    pub path: Option<String>,

    /// Field delimiter (',' for CSV, '\t' for TSV)
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Drop rows without a potency value instead of failing at labelling
    #[serde(default)]
    pub skip_missing_potency: bool,

    /// Column names in the header row
    #[serde(default)]
    pub columns: ColumnMapping,
}

fn default_delimiter() -> char { ',' }

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: None,
            delimiter: default_delimiter(),
            skip_missing_potency: false,
            columns: ColumnMapping::default(),
        }
    }
}

/// Header names for the columns the loader reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    #[serde(default = "default_smiles_col")]
    pub smiles: String,

    #[serde(default = "default_source_col")]
    pub source: String,

    #[serde(default = "default_potency_col")]
    pub potency: String,

    /// Precomputed numeric descriptors, in feature order
    #[serde(default = "default_descriptor_cols")]
    pub descriptors: Vec<String>,
}

fn default_smiles_col() -> String { "smiles".to_string() }
fn default_source_col() -> String { "source".to_string() }
fn default_potency_col() -> String { "pic50".to_string() }
fn default_descriptor_cols() -> Vec<String> {
    ["logp", "hba", "hbd", "rotatable_bonds", "rings", "mw"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            smiles: default_smiles_col(),
            source: default_source_col(),
            potency: default_potency_col(),
            descriptors: default_descriptor_cols(),
        }
    }
}

// ── Labelling ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Potency strictly above this value is labelled potent
    #[serde(default = "default_potency_threshold")]
    pub potency_threshold: f64,
}

fn default_potency_threshold() -> f64 { 5.0 }

impl Default for LabelConfig {
    fn default() -> Self {
        Self { potency_threshold: default_potency_threshold() }
    }
}

// ── Fingerprints ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerprintConfig {
    /// Neighbourhood radius (2 = ECFP4-like)
    #[serde(default = "default_radius")]
    pub radius: usize,

    /// Hashed bit width (64 or 128 in practice)
    #[serde(default = "default_n_bits")]
    pub n_bits: usize,
}

fn default_radius() -> usize { 2 }
fn default_n_bits() -> usize { 128 }

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self { radius: default_radius(), n_bits: default_n_bits() }
    }
}

// ── Feature selection ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Columns with variance at or below this value are dropped
    #[serde(default = "default_variance_threshold")]
    pub variance_threshold: f64,

    /// Delta degrees of freedom for the variance (0 = population)
    #[serde(default)]
    pub ddof: usize,
}

fn default_variance_threshold() -> f64 { 0.15 }

impl Default for SelectionConfig {
    fn default() -> Self {
        Self { variance_threshold: default_variance_threshold(), ddof: 0 }
    }
}

// ── Split ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Fraction of rows held out for testing, in (0, 1)
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,

    /// RNG seed for the shuffle
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Preserve class proportions in both partitions
    #[serde(default)]
    pub stratify: bool,
}

fn default_test_fraction() -> f64 { 0.26 }
fn default_seed() -> u64 { 42 }

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: default_test_fraction(),
            seed: default_seed(),
            stratify: false,
        }
    }
}

// ── Models ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// k for k-fold cross-validation on the training rows (0 disables CV)
    #[serde(default = "default_cv_folds")]
    pub cv_folds: usize,

    #[serde(default)]
    pub decision_tree: TreeConfig,

    #[serde(default)]
    pub svc: SvcConfig,
}

fn default_cv_folds() -> usize { 5 }

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            cv_folds: default_cv_folds(),
            decision_tree: TreeConfig::default(),
            svc: SvcConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// None grows until leaves are pure
    #[serde(default = "default_max_depth")]
    pub max_depth: Option<usize>,

    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,

    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,
}

fn default_true() -> bool { true }
fn default_max_depth() -> Option<usize> { Some(4) }
fn default_min_samples_split() -> usize { 2 }
fn default_min_samples_leaf() -> usize { 1 }

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_depth: default_max_depth(),
            min_samples_split: default_min_samples_split(),
            min_samples_leaf: default_min_samples_leaf(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvcConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Regularisation strength
    #[serde(default = "default_lambda")]
    pub lambda: f64,

    /// Passes over the training rows
    #[serde(default = "default_epochs")]
    pub epochs: usize,
}

fn default_lambda() -> f64 { 0.01 }
fn default_epochs() -> usize { 200 }

impl Default for SvcConfig {
    fn default() -> Self {
        Self { enabled: true, lambda: default_lambda(), epochs: default_epochs() }
    }
}

// ── Output ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Where to write the JSON run report (stdout when unset)
    pub report_path: Option<String>,

    /// Bin count for descriptor histograms
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
}

fn default_histogram_bins() -> usize { 10 }

impl Default for OutputConfig {
    fn default() -> Self {
        Self { report_path: None, histogram_bins: default_histogram_bins() }
    }
}

// ── Helper Methods ─────────────────────────────────────────────────────────────

impl PipelineConfig {
    /// Load from TOML file
    pub fn from_toml(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        toml::from_str(&content).map_err(|e| PpiScreenError::Config(e.to_string()))
    }

    /// Load from YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        serde_yaml::from_str(&content).map_err(|e| PpiScreenError::Config(e.to_string()))
    }

    /// Load from JSON file
    pub fn from_json(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load by file extension; anything other than .yaml/.yml/.json is read as TOML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(path),
            Some("json") => Self::from_json(path),
            _ => Self::from_toml(path),
        }
    }

    /// Serialise to TOML text
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| PpiScreenError::Config(e.to_string()))
    }

    /// Check every scalar is inside its legal range.
    pub fn validate(&self) -> Result<()> {
        let bad = |msg: String| Err(PpiScreenError::Config(msg));

        if !self.labeling.potency_threshold.is_finite() {
            return bad("labeling.potency_threshold must be finite".into());
        }
        if self.fingerprint.n_bits == 0 {
            return bad("fingerprint.n_bits must be > 0".into());
        }
        if !(self.selection.variance_threshold >= 0.0) {
            return bad(format!(
                "selection.variance_threshold must be >= 0, got {}",
                self.selection.variance_threshold
            ));
        }
        let f = self.split.test_fraction;
        if !(f > 0.0 && f < 1.0) {
            return bad(format!("split.test_fraction must be in (0, 1), got {f}"));
        }
        if self.models.cv_folds == 1 {
            return bad("models.cv_folds must be 0 (disabled) or >= 2".into());
        }
        if self.models.decision_tree.min_samples_split < 2 {
            return bad("models.decision_tree.min_samples_split must be >= 2".into());
        }
        if self.models.decision_tree.min_samples_leaf == 0 {
            return bad("models.decision_tree.min_samples_leaf must be >= 1".into());
        }
        if !(self.models.svc.lambda > 0.0) {
            return bad("models.svc.lambda must be > 0".into());
        }
        if self.output.histogram_bins == 0 {
            return bad("output.histogram_bins must be > 0".into());
        }
        if self.input.columns.descriptors.is_empty() {
            return bad("input.columns.descriptors must name at least one column".into());
        }
        Ok(())
    }
}

fn read_config(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(PpiScreenError::FileNotFound(path.to_path_buf()));
    }
    Ok(std::fs::read_to_string(path)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_operator_scalars() {
        let config = PipelineConfig::default();
        assert_eq!(config.labeling.potency_threshold, 5.0);
        assert_eq!(config.fingerprint.n_bits, 128);
        assert_eq!(config.fingerprint.radius, 2);
        assert_eq!(config.selection.variance_threshold, 0.15);
        assert_eq!(config.split.test_fraction, 0.26);
        assert_eq!(config.split.seed, 42);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: PipelineConfig = toml::from_str(
            r#"
            [fingerprint]
            n_bits = 64

            [split]
            seed = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.fingerprint.n_bits, 64);
        assert_eq!(config.fingerprint.radius, 2);
        assert_eq!(config.split.seed, 7);
        assert_eq!(config.split.test_fraction, 0.26);
        assert_eq!(config.input.columns.smiles, "smiles");
    }

    #[test]
    fn test_validate_rejects_bad_fraction() {
        let mut config = PipelineConfig::default();
        config.split.test_fraction = 1.0;
        assert!(matches!(config.validate(), Err(PpiScreenError::Config(_))));
        config.split.test_fraction = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_bits() {
        let mut config = PipelineConfig::default();
        config.fingerprint.n_bits = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_file_not_found() {
        let err = PipelineConfig::from_toml("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, PpiScreenError::FileNotFound(_)));
    }

    #[test]
    fn test_from_path_dispatches_on_extension() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "labeling:\n  potency_threshold: 6.5").unwrap();
        let config = PipelineConfig::from_path(file.path()).unwrap();
        assert_eq!(config.labeling.potency_threshold, 6.5);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = PipelineConfig::default();
        let text = config.to_toml().unwrap();
        let parsed: PipelineConfig = toml::from_str(&text).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_example_file_matches_defaults() {
        let mut config: PipelineConfig =
            toml::from_str(include_str!("../../../ppiscreen.example.toml")).unwrap();
        assert_eq!(config.input.path.as_deref(), Some("data/ppi_inhibitors.csv"));
        config.input.path = None;
        assert_eq!(config, PipelineConfig::default());
    }
}
