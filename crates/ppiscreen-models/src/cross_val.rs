//! Seeded k-fold cross-validation over the training rows.

use ppiscreen_common::{PotencyLabel, PpiScreenError, Result};
use ppiscreen_dataset::FeatureMatrix;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::classifier::Classifier;
use crate::metrics::ConfusionMatrix;

/// Shuffle `0..n` and cut it into `k` contiguous folds; the first `n % k`
/// folds hold one extra row.
pub fn kfold_indices(n: usize, k: usize, seed: u64) -> Result<Vec<Vec<usize>>> {
    if k < 2 || k > n {
        return Err(PpiScreenError::invalid(format!(
            "k-fold needs 2 <= k <= n, got k = {k} for {n} rows"
        )));
    }
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut StdRng::seed_from_u64(seed));

    let mut folds = Vec::with_capacity(k);
    let mut start = 0;
    for f in 0..k {
        let size = n / k + usize::from(f < n % k);
        folds.push(order[start..start + size].to_vec());
        start += size;
    }
    Ok(folds)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidation {
    pub fold_accuracies: Vec<f64>,
    pub mean_accuracy: f64,
    pub std_accuracy: f64,
}

/// Fit a fresh model from `build` on every k-1 folds and score the held-out fold.
/// Folds whose training rows hold a single class are skipped.
pub fn cross_validate<F>(
    build: F,
    x: &FeatureMatrix,
    y: &[PotencyLabel],
    k: usize,
    seed: u64,
) -> Result<CrossValidation>
where
    F: Fn() -> Box<dyn Classifier>,
{
    if x.n_rows() != y.len() {
        return Err(PpiScreenError::invalid(format!(
            "{} feature rows but {} labels",
            x.n_rows(),
            y.len()
        )));
    }
    let folds = kfold_indices(x.n_rows(), k, seed)?;

    let mut fold_accuracies = Vec::with_capacity(k);
    for (f, held_out) in folds.iter().enumerate() {
        let train: Vec<usize> = folds
            .iter()
            .enumerate()
            .filter(|(g, _)| *g != f)
            .flat_map(|(_, fold)| fold.iter().copied())
            .collect();

        let y_fold = pick(y, &train);
        if y_fold.iter().all(|l| *l == y_fold[0]) {
            warn!("Skipping fold {}/{}: training rows hold a single class", f + 1, k);
            continue;
        }

        let mut model = build();
        model.fit(&x.select_rows(&train)?, &y_fold)?;
        let predicted = model.predict(&x.select_rows(held_out)?)?;
        let accuracy = ConfusionMatrix::from_labels(&pick(y, held_out), &predicted)?.accuracy();
        debug!("{} fold {}/{}: accuracy {:.3}", model.name(), f + 1, k, accuracy);
        fold_accuracies.push(accuracy);
    }

    if fold_accuracies.is_empty() {
        return Err(PpiScreenError::invalid("no cross-validation fold had both classes to train on"));
    }
    let n = fold_accuracies.len() as f64;
    let mean = fold_accuracies.iter().sum::<f64>() / n;
    let var = fold_accuracies.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / n;
    Ok(CrossValidation { fold_accuracies, mean_accuracy: mean, std_accuracy: var.sqrt() })
}

fn pick(y: &[PotencyLabel], idx: &[usize]) -> Vec<PotencyLabel> {
    idx.iter().map(|&i| y[i]).collect()
}
