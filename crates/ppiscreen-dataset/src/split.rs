//! Seeded train/test partitioning.
//!
//! The split is computed once over row indices and stored as a value. Every
//! feature view and the label vector are then indexed with the same stored
//! index sets, so row identities agree across views by construction.

use std::collections::BTreeMap;

use ppiscreen_common::{PotencyLabel, PpiScreenError, Result, SplitConfig};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::matrix::FeatureMatrix;

/// Number of test rows for `n` rows: `ceil(fraction * n)`.
///
/// Fails unless the fraction lies in (0, 1) and both partitions end up
/// non-empty.
pub fn test_size(n: usize, fraction: f64) -> Result<usize> {
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(PpiScreenError::invalid(format!(
            "test fraction must be in (0, 1), got {fraction}"
        )));
    }
    let n_test = (fraction * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(PpiScreenError::invalid(format!(
            "test fraction {fraction} of {n} rows leaves an empty partition"
        )));
    }
    Ok(n_test)
}

/// Disjoint train and test row indices over `n_rows` rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
    pub n_rows: usize,
}

/// One feature view after the split.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitView {
    pub train: FeatureMatrix,
    pub test: FeatureMatrix,
}

impl TrainTestSplit {
    /// Shuffle `0..n_rows` with a seeded RNG; the first `test_size` indices
    /// of the permutation form the test set.
    pub fn random(n_rows: usize, test_fraction: f64, seed: u64) -> Result<Self> {
        let n_test = test_size(n_rows, test_fraction)?;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut permutation: Vec<usize> = (0..n_rows).collect();
        permutation.shuffle(&mut rng);

        let train = permutation.split_off(n_test);
        let split = Self { train, test: permutation, n_rows };
        split.log();
        Ok(split)
    }

    /// Split with each label's share of the test set proportional to its
    /// share of the rows (largest-remainder apportionment).
    pub fn stratified(labels: &[PotencyLabel], test_fraction: f64, seed: u64) -> Result<Self> {
        let n_rows = labels.len();
        let n_test = test_size(n_rows, test_fraction)?;
        let mut rng = StdRng::seed_from_u64(seed);

        let mut groups: BTreeMap<PotencyLabel, Vec<usize>> = BTreeMap::new();
        for (i, &label) in labels.iter().enumerate() {
            groups.entry(label).or_default().push(i);
        }

        let exact: Vec<f64> = groups
            .values()
            .map(|g| n_test as f64 * g.len() as f64 / n_rows as f64)
            .collect();
        let mut quotas: Vec<usize> = exact.iter().map(|q| q.floor() as usize).collect();
        let mut by_remainder: Vec<usize> = (0..quotas.len()).collect();
        by_remainder.sort_by(|&a, &b| {
            let ra = exact[a] - exact[a].floor();
            let rb = exact[b] - exact[b].floor();
            rb.total_cmp(&ra).then(a.cmp(&b))
        });
        let mut missing = n_test - quotas.iter().sum::<usize>();
        for &g in by_remainder.iter().cycle() {
            if missing == 0 {
                break;
            }
            quotas[g] += 1;
            missing -= 1;
        }

        let mut train = Vec::with_capacity(n_rows - n_test);
        let mut test = Vec::with_capacity(n_test);
        for (mut group, quota) in groups.into_values().zip(quotas) {
            group.shuffle(&mut rng);
            let rest = group.split_off(quota.min(group.len()));
            test.extend(group);
            train.extend(rest);
        }
        train.shuffle(&mut rng);
        test.shuffle(&mut rng);

        let split = Self { train, test, n_rows };
        split.log();
        Ok(split)
    }

    pub fn from_config(config: &SplitConfig, labels: &[PotencyLabel]) -> Result<Self> {
        if config.stratify {
            Self::stratified(labels, config.test_fraction, config.seed)
        } else {
            Self::random(labels.len(), config.test_fraction, config.seed)
        }
    }

    fn log(&self) {
        info!(
            "Split {} rows into {} train / {} test",
            self.n_rows,
            self.train.len(),
            self.test.len()
        );
    }

    fn check_rows(&self, rows: usize, what: &str) -> Result<()> {
        if rows != self.n_rows {
            return Err(PpiScreenError::invalid(format!(
                "{what} has {rows} rows but the split covers {}",
                self.n_rows
            )));
        }
        Ok(())
    }

    /// Index a feature view with the stored partition.
    pub fn apply(&self, matrix: &FeatureMatrix) -> Result<SplitView> {
        self.check_rows(matrix.n_rows(), "feature view")?;
        Ok(SplitView {
            train: matrix.select_rows(&self.train)?,
            test: matrix.select_rows(&self.test)?,
        })
    }

    /// Index a row-aligned vector (labels, SMILES, ...) with the stored partition.
    pub fn apply_slice<T: Clone>(&self, items: &[T]) -> Result<(Vec<T>, Vec<T>)> {
        self.check_rows(items.len(), "vector")?;
        let pick = |idx: &[usize]| -> Vec<T> { idx.iter().map(|&i| items[i].clone()).collect() };
        Ok((pick(&self.train), pick(&self.test)))
    }
}
