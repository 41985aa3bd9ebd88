//! The seam every potency model plugs into.

use std::fmt;

use ppiscreen_common::{ModelsConfig, PotencyLabel, PpiScreenError, Result};
use ppiscreen_dataset::FeatureMatrix;
use serde::{Deserialize, Serialize};

use crate::svc::LinearSvc;
use crate::tree::DecisionTreeClassifier;

/// A binary potent / less-potent classifier over a feature matrix.
pub trait Classifier {
    fn name(&self) -> &'static str;

    fn fit(&mut self, x: &FeatureMatrix, y: &[PotencyLabel]) -> Result<()>;

    /// One score per row, higher meaning more likely potent.
    fn decision_scores(&self, x: &FeatureMatrix) -> Result<Vec<f64>>;

    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<PotencyLabel>>;

    /// Human-readable rendering of the fitted model, if it has one.
    fn describe(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    DecisionTree,
    LinearSvc,
}

impl ModelKind {
    /// Models switched on in `config`, in a fixed order.
    pub fn enabled(config: &ModelsConfig) -> Vec<ModelKind> {
        let mut kinds = Vec::new();
        if config.decision_tree.enabled {
            kinds.push(ModelKind::DecisionTree);
        }
        if config.svc.enabled {
            kinds.push(ModelKind::LinearSvc);
        }
        kinds
    }

    /// A fresh, unfitted model.
    pub fn build(self, config: &ModelsConfig, seed: u64) -> Box<dyn Classifier> {
        match self {
            ModelKind::DecisionTree => Box::new(DecisionTreeClassifier::from_config(&config.decision_tree)),
            ModelKind::LinearSvc => Box::new(LinearSvc::new(config.svc.lambda, config.svc.epochs, seed)),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModelKind::DecisionTree => "decision_tree",
            ModelKind::LinearSvc => "linear_svc",
        })
    }
}

/// Shared argument checks for `fit`.
pub(crate) fn check_training_data(x: &FeatureMatrix, y: &[PotencyLabel]) -> Result<()> {
    if x.n_rows() == 0 {
        return Err(PpiScreenError::invalid("cannot fit on zero rows"));
    }
    if x.n_cols() == 0 {
        return Err(PpiScreenError::invalid("cannot fit on zero feature columns"));
    }
    if x.n_rows() != y.len() {
        return Err(PpiScreenError::invalid(format!(
            "{} feature rows but {} labels",
            x.n_rows(),
            y.len()
        )));
    }
    Ok(())
}

/// Shared argument checks for prediction: fitted, and the same width as training.
pub(crate) fn check_prediction_input(fitted_width: Option<usize>, x: &FeatureMatrix) -> Result<()> {
    match fitted_width {
        None => Err(PpiScreenError::invalid("model has not been fitted")),
        Some(w) if w != x.n_cols() => Err(PpiScreenError::invalid(format!(
            "model was fitted on {w} columns, got {}",
            x.n_cols()
        ))),
        Some(_) => Ok(()),
    }
}
