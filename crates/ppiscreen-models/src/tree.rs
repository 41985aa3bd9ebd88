//! CART decision tree with Gini impurity.
//!
//! Splits are axis-aligned `x[feature] <= threshold` tests placed at the
//! midpoint between consecutive distinct training values. A node becomes a
//! leaf when it is pure, too small to split, at `max_depth`, or when no
//! admissible split lowers the impurity.

use std::fmt::{self, Write as _};

use ppiscreen_common::{PotencyLabel, Result, TreeConfig};
use ppiscreen_dataset::FeatureMatrix;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::{check_prediction_input, check_training_data, Classifier};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        n_samples: usize,
        /// Share of potent training rows reaching this leaf
        potent_fraction: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        n_samples: usize,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
    root: Option<Node>,
    feature_names: Vec<String>,
}

impl Default for DecisionTreeClassifier {
    fn default() -> Self {
        Self::new(None, 2, 1)
    }
}

impl DecisionTreeClassifier {
    pub fn new(max_depth: Option<usize>, min_samples_split: usize, min_samples_leaf: usize) -> Self {
        Self {
            max_depth,
            min_samples_split: min_samples_split.max(2),
            min_samples_leaf: min_samples_leaf.max(1),
            root: None,
            feature_names: Vec::new(),
        }
    }

    pub fn from_config(config: &TreeConfig) -> Self {
        Self::new(config.max_depth, config.min_samples_split, config.min_samples_leaf)
    }

    fn fitted_width(&self) -> Option<usize> {
        self.root.as_ref().map(|_| self.feature_names.len())
    }

    /// Depth of the fitted tree; a lone leaf has depth 0.
    pub fn depth(&self) -> usize {
        fn walk(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(left).max(walk(right)),
            }
        }
        self.root.as_ref().map_or(0, walk)
    }

    pub fn n_leaves(&self) -> usize {
        fn walk(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 1,
                Node::Split { left, right, .. } => walk(left) + walk(right),
            }
        }
        self.root.as_ref().map_or(0, walk)
    }

    /// Text rendering of the fitted tree, one line per test or leaf:
    ///
    /// ```text
    /// |--- logp <= 3.210
    /// |   |--- class: less_potent
    /// |--- logp >  3.210
    /// |   |--- class: potent
    /// ```
    pub fn export_text(&self) -> Option<String> {
        let root = self.root.as_ref()?;
        let mut out = String::new();
        self.render(root, 0, &mut out).ok()?;
        Some(out)
    }

    fn render(&self, node: &Node, depth: usize, out: &mut String) -> fmt::Result {
        let indent = "|   ".repeat(depth);
        match node {
            Node::Leaf { potent_fraction, .. } => {
                writeln!(out, "{indent}|--- class: {}", leaf_label(*potent_fraction))
            }
            Node::Split { feature, threshold, left, right, .. } => {
                let name = &self.feature_names[*feature];
                writeln!(out, "{indent}|--- {name} <= {threshold:.3}")?;
                self.render(left, depth + 1, out)?;
                writeln!(out, "{indent}|--- {name} >  {threshold:.3}")?;
                self.render(right, depth + 1, out)
            }
        }
    }

    fn grow(&self, x: &FeatureMatrix, y: &[bool], indices: Vec<usize>, depth: usize) -> Node {
        let n = indices.len();
        let potent = indices.iter().filter(|&&i| y[i]).count();
        let leaf = Node::Leaf { n_samples: n, potent_fraction: potent as f64 / n as f64 };

        let pure = potent == 0 || potent == n;
        let too_deep = self.max_depth.is_some_and(|d| depth >= d);
        if pure || too_deep || n < self.min_samples_split {
            return leaf;
        }

        let Some((feature, threshold, impurity)) = self.best_split(x, y, &indices) else {
            return leaf;
        };
        if impurity >= gini(potent, n) - 1e-12 {
            return leaf;
        }

        let (left, right): (Vec<usize>, Vec<usize>) =
            indices.into_iter().partition(|&i| x.get(i, feature) <= threshold);
        debug!(
            "Split at depth {} on column {} <= {:.3} ({} / {})",
            depth,
            feature,
            threshold,
            left.len(),
            right.len()
        );

        Node::Split {
            feature,
            threshold,
            n_samples: n,
            left: Box::new(self.grow(x, y, left, depth + 1)),
            right: Box::new(self.grow(x, y, right, depth + 1)),
        }
    }

    /// Lowest weighted child impurity over every feature and admissible
    /// threshold. Ties keep the earliest feature and lowest threshold.
    fn best_split(&self, x: &FeatureMatrix, y: &[bool], indices: &[usize]) -> Option<(usize, f64, f64)> {
        let n = indices.len();
        let total_potent = indices.iter().filter(|&&i| y[i]).count();
        let mut best: Option<(usize, f64, f64)> = None;

        for feature in 0..x.n_cols() {
            let mut order: Vec<(f64, bool)> = indices.iter().map(|&i| (x.get(i, feature), y[i])).collect();
            order.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_potent = 0usize;
            for k in 1..n {
                if order[k - 1].1 {
                    left_potent += 1;
                }
                let (lo, hi) = (order[k - 1].0, order[k].0);
                if lo == hi || k < self.min_samples_leaf || n - k < self.min_samples_leaf {
                    continue;
                }
                let impurity = (k as f64 * gini(left_potent, k)
                    + (n - k) as f64 * gini(total_potent - left_potent, n - k))
                    / n as f64;
                if best.map_or(true, |(_, _, b)| impurity < b) {
                    let mid = lo + (hi - lo) / 2.0;
                    let threshold = if mid < hi { mid } else { lo };
                    best = Some((feature, threshold, impurity));
                }
            }
        }
        best
    }

    fn leaf_for(&self, row: &[f64]) -> f64 {
        let mut node = match &self.root {
            Some(root) => root,
            None => return 0.0,
        };
        loop {
            match node {
                Node::Leaf { potent_fraction, .. } => return *potent_fraction,
                Node::Split { feature, threshold, left, right, .. } => {
                    node = if row[*feature] <= *threshold { left.as_ref() } else { right.as_ref() };
                }
            }
        }
    }
}

/// Two-class Gini impurity for `positive` of `n` rows.
fn gini(positive: usize, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p = positive as f64 / n as f64;
    2.0 * p * (1.0 - p)
}

fn leaf_label(potent_fraction: f64) -> PotencyLabel {
    if potent_fraction > 0.5 {
        PotencyLabel::Potent
    } else {
        PotencyLabel::LessPotent
    }
}

impl Classifier for DecisionTreeClassifier {
    fn name(&self) -> &'static str {
        "decision_tree"
    }

    fn fit(&mut self, x: &FeatureMatrix, y: &[PotencyLabel]) -> Result<()> {
        check_training_data(x, y)?;
        let y: Vec<bool> = y.iter().map(|l| l.is_potent()).collect();
        let root = self.grow(x, &y, (0..x.n_rows()).collect(), 0);
        self.feature_names = x.columns().to_vec();
        self.root = Some(root);
        debug!("Fitted decision tree: depth {}, {} leaves", self.depth(), self.n_leaves());
        Ok(())
    }

    /// The potent fraction of the leaf each row falls into.
    fn decision_scores(&self, x: &FeatureMatrix) -> Result<Vec<f64>> {
        check_prediction_input(self.fitted_width(), x)?;
        Ok(x.rows().map(|row| self.leaf_for(row)).collect())
    }

    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<PotencyLabel>> {
        Ok(self.decision_scores(x)?.into_iter().map(leaf_label).collect())
    }

    fn describe(&self) -> Option<String> {
        self.export_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ppiscreen_common::PpiScreenError;
    use PotencyLabel::*;

    fn matrix(columns: &[&str], rows: Vec<Vec<f64>>) -> FeatureMatrix {
        FeatureMatrix::new(columns.iter().map(|c| c.to_string()).collect(), rows).unwrap()
    }

    #[test]
    fn test_perfect_fit_on_separable_data() {
        let x = matrix(&["a"], vec![vec![0.0], vec![1.0], vec![10.0], vec![11.0]]);
        let y = vec![LessPotent, LessPotent, Potent, Potent];
        let mut tree = DecisionTreeClassifier::default();
        tree.fit(&x, &y).unwrap();
        assert_eq!(tree.predict(&x).unwrap(), y);
        assert_eq!(tree.depth(), 1);
        assert_eq!(
            tree.export_text().unwrap(),
            "|--- a <= 5.500\n|   |--- class: less_potent\n|--- a >  5.500\n|   |--- class: potent\n"
        );
    }

    #[test]
    fn test_nested_export_text() {
        let x = matrix(&["a"], vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]]);
        let y = vec![LessPotent, Potent, Potent, LessPotent];
        let mut tree = DecisionTreeClassifier::default();
        assert!(tree.export_text().is_none());
        tree.fit(&x, &y).unwrap();
        let text = tree.export_text().unwrap();
        assert_eq!(tree.depth(), 2);
        // one line per leaf, two per split
        assert_eq!(text.lines().count(), tree.n_leaves() + 2 * (tree.n_leaves() - 1));
        assert!(text.lines().any(|l| l.starts_with("|   |--- a")));
    }

    #[test]
    fn test_picks_informative_column() {
        let x = matrix(
            &["noise", "signal"],
            vec![vec![1.0, 0.0], vec![0.0, 0.0], vec![1.0, 1.0], vec![0.0, 1.0]],
        );
        let y = vec![LessPotent, LessPotent, Potent, Potent];
        let mut tree = DecisionTreeClassifier::default();
        tree.fit(&x, &y).unwrap();
        assert!(tree.export_text().unwrap().starts_with("|--- signal <= 0.500"));
    }

    #[test]
    fn test_max_depth_zero_is_a_single_leaf() {
        let x = matrix(&["a"], vec![vec![0.0], vec![1.0], vec![2.0]]);
        let y = vec![Potent, Potent, LessPotent];
        let mut tree = DecisionTreeClassifier::new(Some(0), 2, 1);
        tree.fit(&x, &y).unwrap();
        assert_eq!(tree.n_leaves(), 1);
        let scores = tree.decision_scores(&x).unwrap();
        assert!(scores.iter().all(|&s| (s - 2.0 / 3.0).abs() < 1e-12));
        assert_eq!(tree.predict(&x).unwrap(), vec![Potent; 3]);
    }

    #[test]
    fn test_min_samples_leaf_blocks_small_children() {
        let x = matrix(&["a"], vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]]);
        let y = vec![Potent, LessPotent, LessPotent, LessPotent];
        let mut tree = DecisionTreeClassifier::new(None, 2, 2);
        tree.fit(&x, &y).unwrap();
        // the only pure split would isolate one row
        assert!(tree.export_text().unwrap().starts_with("|--- a <= 1.500"));
    }

    #[test]
    fn test_constant_features_give_leaf() {
        let x = matrix(&["a"], vec![vec![1.0]; 4]);
        let y = vec![Potent, LessPotent, Potent, LessPotent];
        let mut tree = DecisionTreeClassifier::default();
        tree.fit(&x, &y).unwrap();
        assert_eq!(tree.n_leaves(), 1);
    }

    #[test]
    fn test_predict_before_fit_and_width_mismatch() {
        let tree = DecisionTreeClassifier::default();
        let x = matrix(&["a"], vec![vec![0.0]]);
        assert!(matches!(tree.predict(&x), Err(PpiScreenError::InvalidInput(_))));

        let mut tree = DecisionTreeClassifier::default();
        tree.fit(&x, &[Potent]).unwrap();
        let wide = matrix(&["a", "b"], vec![vec![0.0, 1.0]]);
        assert!(matches!(tree.predict(&wide), Err(PpiScreenError::InvalidInput(_))));
    }

    #[test]
    fn test_fit_rejects_mismatched_labels() {
        let x = matrix(&["a"], vec![vec![0.0], vec![1.0]]);
        let mut tree = DecisionTreeClassifier::default();
        assert!(tree.fit(&x, &[Potent]).is_err());
    }
}
