//! Linear soft-margin SVM trained with Pegasos.
//!
//! Features are standardised with statistics from the training rows, a
//! constant 1.0 column is appended for the intercept, and the hinge loss is
//! minimised by stochastic sub-gradient steps with step size
//! `1 / (lambda * t)` followed by projection onto the ball of radius
//! `1 / sqrt(lambda)`.

use ppiscreen_common::{PotencyLabel, PpiScreenError, Result};
use ppiscreen_dataset::{FeatureMatrix, StandardScaler};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::{check_prediction_input, check_training_data, Classifier};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearSvc {
    lambda: f64,
    epochs: usize,
    seed: u64,
    scaler: Option<StandardScaler>,
    /// Feature weights followed by the intercept
    weights: Vec<f64>,
}

impl LinearSvc {
    pub fn new(lambda: f64, epochs: usize, seed: u64) -> Self {
        Self { lambda, epochs, seed, scaler: None, weights: Vec::new() }
    }

    /// Weights in standardised feature space, without the intercept.
    pub fn weights(&self) -> &[f64] {
        self.weights.split_last().map_or(&[][..], |(_, w)| w)
    }

    pub fn intercept(&self) -> f64 {
        self.weights.last().copied().unwrap_or(0.0)
    }

    fn margin(&self, scaled: &[f64]) -> f64 {
        let (bias, w) = match self.weights.split_last() {
            Some(parts) => parts,
            None => return 0.0,
        };
        w.iter().zip(scaled).map(|(a, b)| a * b).sum::<f64>() + bias
    }
}

impl Classifier for LinearSvc {
    fn name(&self) -> &'static str {
        "linear_svc"
    }

    fn fit(&mut self, x: &FeatureMatrix, y: &[PotencyLabel]) -> Result<()> {
        check_training_data(x, y)?;
        if !(self.lambda > 0.0) {
            return Err(PpiScreenError::invalid(format!("lambda must be > 0, got {}", self.lambda)));
        }
        if self.epochs == 0 {
            return Err(PpiScreenError::invalid("epochs must be > 0"));
        }
        let potent = y.iter().filter(|l| l.is_potent()).count();
        if potent == 0 || potent == y.len() {
            return Err(PpiScreenError::invalid("linear SVC needs both classes in the training rows"));
        }

        let scaler = StandardScaler::fit(x)?;
        let rows: Vec<Vec<f64>> = x
            .rows()
            .map(|r| {
                let mut row = scaler.transform_row(r)?;
                row.push(1.0);
                Ok(row)
            })
            .collect::<Result<_>>()?;
        let targets: Vec<f64> = y.iter().map(|l| if l.is_potent() { 1.0 } else { -1.0 }).collect();

        let dim = x.n_cols() + 1;
        let radius = 1.0 / self.lambda.sqrt();
        let mut w = vec![0.0; dim];
        let mut order: Vec<usize> = (0..rows.len()).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut t = 0usize;

        for _ in 0..self.epochs {
            order.shuffle(&mut rng);
            for &i in &order {
                t += 1;
                let eta = 1.0 / (self.lambda * t as f64);
                let (row, target) = (&rows[i], targets[i]);
                let margin = target * w.iter().zip(row).map(|(a, b)| a * b).sum::<f64>();

                let shrink = 1.0 - eta * self.lambda;
                w.iter_mut().for_each(|wj| *wj *= shrink);
                if margin < 1.0 {
                    for (wj, xj) in w.iter_mut().zip(row) {
                        *wj += eta * target * xj;
                    }
                }

                let norm = w.iter().map(|v| v * v).sum::<f64>().sqrt();
                if norm > radius {
                    let scale = radius / norm;
                    w.iter_mut().for_each(|wj| *wj *= scale);
                }
            }
        }

        debug!("Fitted linear SVC: {} steps, intercept {:.4}", t, w[dim - 1]);
        self.scaler = Some(scaler);
        self.weights = w;
        Ok(())
    }

    /// Signed distance-like margin `w . x + b`.
    fn decision_scores(&self, x: &FeatureMatrix) -> Result<Vec<f64>> {
        check_prediction_input(self.scaler.as_ref().map(|s| s.n_features()), x)?;
        let Some(scaler) = &self.scaler else {
            return Err(PpiScreenError::invalid("model has not been fitted"));
        };
        x.rows()
            .map(|r| Ok(self.margin(&scaler.transform_row(r)?)))
            .collect()
    }

    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<PotencyLabel>> {
        Ok(self
            .decision_scores(x)?
            .into_iter()
            .map(|s| if s > 0.0 { PotencyLabel::Potent } else { PotencyLabel::LessPotent })
            .collect())
    }
}
