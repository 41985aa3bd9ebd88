//! End-to-end orchestration: load, label, summarise, build both feature
//! views, select fingerprint bits, split once, and evaluate every model.

use chrono::Utc;
use ppiscreen_chem::FingerprintGenerator;
use ppiscreen_common::{PipelineConfig, PpiScreenError, Result};
use ppiscreen_dataset::{
    derive_labels, Dataset, DatasetLoader, DatasetSummary, FeatureMatrix, TrainTestSplit,
    VarianceThreshold,
};
use tracing::info;
use uuid::Uuid;

use crate::report::{RunReport, SelectionReport, SplitReport};
use crate::runner::ModelRunner;

pub const DESCRIPTOR_VIEW: &str = "descriptors";
pub const FINGERPRINT_VIEW: &str = "fingerprints";

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Validates the configuration up front so a bad scalar fails before any I/O.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load the table named by `input.path`.
    pub fn load(&self) -> Result<Dataset> {
        let path = self
            .config
            .input
            .path
            .as_deref()
            .ok_or_else(|| PpiScreenError::Config("input.path is not set".into()))?;
        DatasetLoader::new(&self.config.input)?.load(path)
    }

    /// Load, label and summarise without building features or models.
    pub fn summarize(&self) -> Result<DatasetSummary> {
        let dataset = self.load()?;
        let labels = derive_labels(&dataset.records, self.config.labeling.potency_threshold)?;
        DatasetSummary::build(&dataset, &labels, self.config.output.histogram_bins)
    }

    pub fn run(&self) -> Result<RunReport> {
        let dataset = self.load()?;
        self.run_dataset(&dataset)
    }

    pub fn run_dataset(&self, dataset: &Dataset) -> Result<RunReport> {
        let cfg = &self.config;
        if dataset.is_empty() {
            return Err(PpiScreenError::invalid("dataset has no rows"));
        }

        let labels = derive_labels(&dataset.records, cfg.labeling.potency_threshold)?;
        let summary = DatasetSummary::build(dataset, &labels, cfg.output.histogram_bins)?;

        let descriptors = dataset.descriptor_matrix()?;

        let generator = FingerprintGenerator::new(cfg.fingerprint.radius, cfg.fingerprint.n_bits)?;
        let fingerprints = generator.generate_all(dataset.smiles())?;
        let fp_matrix = FeatureMatrix::from_fingerprints(&fingerprints)?;
        let selection = VarianceThreshold::from_config(&cfg.selection)?.fit_transform(&fp_matrix)?;

        // One partition, indexed into every view and the labels
        let split = TrainTestSplit::from_config(&cfg.split, &labels)?;
        let (y_train, y_test) = split.apply_slice(&labels)?;
        let descriptor_view = split.apply(&descriptors)?;
        let fingerprint_view = split.apply(&selection.matrix)?;

        let runner = ModelRunner::new(cfg.models.clone(), cfg.split.seed);
        let mut evaluations = runner.run_view(DESCRIPTOR_VIEW, &descriptor_view, &y_train, &y_test)?;
        evaluations.extend(runner.run_view(FINGERPRINT_VIEW, &fingerprint_view, &y_train, &y_test)?);

        let source_row = |i: &usize| dataset.records[*i].row;
        let report = RunReport {
            run_id: Uuid::new_v4(),
            created_at: Utc::now(),
            dataset_sha256: dataset.sha256.clone(),
            config: cfg.clone(),
            summary,
            selection: SelectionReport {
                variance_threshold: cfg.selection.variance_threshold,
                n_bits: cfg.fingerprint.n_bits,
                retained_columns: selection.retained_columns().to_vec(),
                variances: selection.variances.clone(),
            },
            split: SplitReport {
                test_fraction: cfg.split.test_fraction,
                seed: cfg.split.seed,
                stratified: cfg.split.stratify,
                train_rows: split.train.iter().map(source_row).collect(),
                test_rows: split.test.iter().map(source_row).collect(),
            },
            evaluations,
        };

        info!(
            "Run {} complete: {} molecules, {} fingerprint columns kept, {} evaluations",
            report.run_id,
            dataset.len(),
            report.selection.retained_columns.len(),
            report.evaluations.len()
        );
        Ok(report)
    }
}
