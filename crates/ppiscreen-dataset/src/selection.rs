//! Variance-threshold feature selection.
//!
//! Near-constant fingerprint bits carry no signal for the classifiers. A
//! column survives only if its variance is strictly greater than the
//! threshold; if nothing survives the caller gets
//! [`PpiScreenError::EmptyFeatureSet`] rather than a zero-width matrix.

use ppiscreen_common::{PpiScreenError, Result, SelectionConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::matrix::FeatureMatrix;

/// Per-column variance with `ddof` delta degrees of freedom.
///
/// Columns of a matrix with `n_rows <= ddof` report a variance of 0.
pub fn column_variances(matrix: &FeatureMatrix, ddof: usize) -> Vec<f64> {
    let n = matrix.n_rows();
    (0..matrix.n_cols())
        .map(|c| {
            if n <= ddof {
                return 0.0;
            }
            let mean = matrix.column(c).sum::<f64>() / n as f64;
            let ss: f64 = matrix.column(c).map(|v| (v - mean).powi(2)).sum();
            ss / (n - ddof) as f64
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VarianceThreshold {
    threshold: f64,
    ddof: usize,
}

impl VarianceThreshold {
    pub fn new(threshold: f64, ddof: usize) -> Result<Self> {
        if !(threshold >= 0.0) || !threshold.is_finite() {
            return Err(PpiScreenError::invalid(format!(
                "variance threshold must be a finite value >= 0, got {threshold}"
            )));
        }
        Ok(Self { threshold, ddof })
    }

    pub fn from_config(config: &SelectionConfig) -> Result<Self> {
        Self::new(config.variance_threshold, config.ddof)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Compute variances over `matrix` and keep the columns above threshold.
    pub fn fit_transform(&self, matrix: &FeatureMatrix) -> Result<FeatureSelection> {
        if matrix.n_rows() == 0 {
            return Err(PpiScreenError::invalid("cannot select features from an empty matrix"));
        }

        let variances = column_variances(matrix, self.ddof);
        let mask: Vec<bool> = variances.iter().map(|&v| v > self.threshold).collect();
        let kept = mask.iter().filter(|&&k| k).count();

        for (name, (&var, &keep)) in matrix.columns().iter().zip(variances.iter().zip(&mask)) {
            if !keep {
                debug!("Dropping {} (variance {:.4})", name, var);
            }
        }

        if kept == 0 {
            return Err(PpiScreenError::EmptyFeatureSet {
                columns: matrix.n_cols(),
                threshold: self.threshold,
            });
        }

        let reduced = matrix.select_columns(&mask)?;
        info!(
            "Variance threshold {}: kept {} of {} columns",
            self.threshold,
            kept,
            matrix.n_cols()
        );

        Ok(FeatureSelection { mask, variances, matrix: reduced })
    }
}

/// Outcome of a variance-threshold pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSelection {
    /// One entry per original column
    pub mask: Vec<bool>,
    pub variances: Vec<f64>,
    /// Retained columns only, names preserved
    pub matrix: FeatureMatrix,
}

impl FeatureSelection {
    pub fn retained_columns(&self) -> &[String] {
        self.matrix.columns()
    }

    pub fn retained_count(&self) -> usize {
        self.matrix.n_cols()
    }

    /// Apply the same column mask to another matrix over the original columns.
    pub fn apply(&self, other: &FeatureMatrix) -> Result<FeatureMatrix> {
        other.select_columns(&self.mask)
    }
}
