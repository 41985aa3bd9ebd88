//! Serialisable record of one pipeline run.

use std::path::Path;

use chrono::{DateTime, Utc};
use ppiscreen_common::{PipelineConfig, Result};
use ppiscreen_dataset::DatasetSummary;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::runner::ModelEvaluation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionReport {
    pub variance_threshold: f64,
    pub n_bits: usize,
    pub retained_columns: Vec<String>,
    /// One per fingerprint bit, in bit order
    pub variances: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitReport {
    pub test_fraction: f64,
    pub seed: u64,
    pub stratified: bool,
    /// Source table rows of each partition
    pub train_rows: Vec<usize>,
    pub test_rows: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub dataset_sha256: String,
    pub config: PipelineConfig,
    pub summary: DatasetSummary,
    pub selection: SelectionReport,
    pub split: SplitReport,
    pub evaluations: Vec<ModelEvaluation>,
}

impl RunReport {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json_pretty()?)?;
        info!("Run report {} written to {:?}", self.run_id, path);
        Ok(())
    }
}
