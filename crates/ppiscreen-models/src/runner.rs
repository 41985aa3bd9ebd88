//! Fit every enabled model on every feature view and evaluate it.

use ppiscreen_common::{ModelsConfig, PotencyLabel, Result};
use ppiscreen_dataset::SplitView;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::classifier::ModelKind;
use crate::cross_val::{cross_validate, CrossValidation};
use crate::metrics::{ConfusionMatrix, Evaluation};

/// Outcome of one model on one feature view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEvaluation {
    pub model: ModelKind,
    pub view: String,
    pub n_features: usize,
    pub n_train: usize,
    pub n_test: usize,
    pub cross_validation: Option<CrossValidation>,
    pub train_accuracy: f64,
    pub test: Evaluation,
    /// Text rendering of the fitted model, where the model has one
    pub description: Option<String>,
}

pub struct ModelRunner {
    config: ModelsConfig,
    seed: u64,
}

impl ModelRunner {
    pub fn new(config: ModelsConfig, seed: u64) -> Self {
        Self { config, seed }
    }

    pub fn models(&self) -> Vec<ModelKind> {
        ModelKind::enabled(&self.config)
    }

    /// Run every enabled model on one split view.
    pub fn run_view(
        &self,
        view: &str,
        data: &SplitView,
        y_train: &[PotencyLabel],
        y_test: &[PotencyLabel],
    ) -> Result<Vec<ModelEvaluation>> {
        self.models()
            .into_iter()
            .map(|kind| self.run_model(kind, view, data, y_train, y_test))
            .collect()
    }

    fn run_model(
        &self,
        kind: ModelKind,
        view: &str,
        data: &SplitView,
        y_train: &[PotencyLabel],
        y_test: &[PotencyLabel],
    ) -> Result<ModelEvaluation> {
        let build = || kind.build(&self.config, self.seed);

        let cross_validation = match self.config.cv_folds {
            0 => None,
            k if k > data.train.n_rows() => {
                warn!(
                    "Skipping {}-fold CV for {} on {}: only {} training rows",
                    k,
                    kind,
                    view,
                    data.train.n_rows()
                );
                None
            }
            k => Some(cross_validate(&build, &data.train, y_train, k, self.seed)?),
        };

        let mut model = build();
        model.fit(&data.train, y_train)?;

        let train_pred = model.predict(&data.train)?;
        let train_accuracy = ConfusionMatrix::from_labels(y_train, &train_pred)?.accuracy();

        let predicted = model.predict(&data.test)?;
        let scores = model.decision_scores(&data.test)?;
        let test = Evaluation::compute(y_test, &predicted, &scores)?;

        info!(
            "{} on {}: test accuracy {:.3}, F1 {:.3}, AUC {}",
            kind,
            view,
            test.accuracy,
            test.f1,
            test.auc().map_or_else(|| "n/a".to_string(), |a| format!("{a:.3}"))
        );

        Ok(ModelEvaluation {
            model: kind,
            view: view.to_string(),
            n_features: data.train.n_cols(),
            n_train: data.train.n_rows(),
            n_test: data.test.n_rows(),
            cross_validation,
            train_accuracy,
            test,
            description: model.describe(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ppiscreen_dataset::{FeatureMatrix, TrainTestSplit};
    use ppiscreen_test_utils::{separable_columns, separable_rows};

    #[test]
    fn test_separable_view_scores_perfectly() {
        let (rows, labels) = separable_rows(40, 3, 7);
        let x = FeatureMatrix::new(separable_columns(3), rows).unwrap();
        let split = TrainTestSplit::random(40, 0.25, 42).unwrap();
        let view = split.apply(&x).unwrap();
        let (y_train, y_test) = split.apply_slice(&labels).unwrap();

        let mut config = ModelsConfig::default();
        config.svc.enabled = false;
        let runner = ModelRunner::new(config, 42);
        let evals = runner.run_view("synthetic", &view, &y_train, &y_test).unwrap();

        assert_eq!(evals.len(), 1);
        let tree = &evals[0];
        assert_eq!(tree.model, ModelKind::DecisionTree);
        assert_eq!(tree.n_test, 10);
        assert_eq!(tree.test.accuracy, 1.0);
        assert_eq!(tree.test.auc(), Some(1.0));
        assert_eq!(tree.cross_validation.as_ref().unwrap().fold_accuracies.len(), 5);
        assert!(tree.description.as_ref().unwrap().contains("signal"));
    }

    #[test]
    fn test_cv_disabled() {
        let (rows, labels) = separable_rows(20, 0, 1);
        let x = FeatureMatrix::new(separable_columns(0), rows).unwrap();
        let split = TrainTestSplit::random(20, 0.25, 3).unwrap();
        let view = split.apply(&x).unwrap();
        let (y_train, y_test) = split.apply_slice(&labels).unwrap();

        let config = ModelsConfig { cv_folds: 0, ..ModelsConfig::default() };
        let evals = ModelRunner::new(config, 3).run_view("signal", &view, &y_train, &y_test).unwrap();
        assert_eq!(evals.len(), 2);
        assert!(evals.iter().all(|e| e.cross_validation.is_none()));
    }
}
