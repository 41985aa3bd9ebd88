//! Per-column standardisation learned on training rows.

use ppiscreen_common::{PpiScreenError, Result};
use serde::{Deserialize, Serialize};

use crate::matrix::FeatureMatrix;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl StandardScaler {
    /// Population mean and standard deviation per column. Constant columns
    /// get a unit scale so they transform to zero.
    pub fn fit(matrix: &FeatureMatrix) -> Result<Self> {
        let n = matrix.n_rows();
        if n == 0 {
            return Err(PpiScreenError::invalid("cannot fit a scaler on zero rows"));
        }
        let mut means = Vec::with_capacity(matrix.n_cols());
        let mut stds = Vec::with_capacity(matrix.n_cols());
        for c in 0..matrix.n_cols() {
            let mean = matrix.column(c).sum::<f64>() / n as f64;
            let var = matrix.column(c).map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
            let std = var.sqrt();
            means.push(mean);
            stds.push(if std > f64::EPSILON { std } else { 1.0 });
        }
        Ok(Self { means, stds })
    }

    pub fn n_features(&self) -> usize {
        self.means.len()
    }

    /// Standardise one row.
    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.n_features() {
            return Err(PpiScreenError::invalid(format!(
                "scaler fitted on {} columns, got {}",
                self.n_features(),
                row.len()
            )));
        }
        Ok(row
            .iter()
            .zip(self.means.iter().zip(&self.stds))
            .map(|(v, (m, s))| (v - m) / s)
            .collect())
    }

    pub fn transform(&self, matrix: &FeatureMatrix) -> Result<FeatureMatrix> {
        let rows = matrix
            .rows()
            .map(|r| self.transform_row(r))
            .collect::<Result<Vec<_>>>()?;
        FeatureMatrix::new(matrix.columns().to_vec(), rows)
    }
}
