//! Classification metrics with "potent" as the positive class.

use ppiscreen_common::{PotencyLabel, PpiScreenError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    pub fn from_labels(actual: &[PotencyLabel], predicted: &[PotencyLabel]) -> Result<Self> {
        check_lengths(actual.len(), predicted.len())?;
        let mut cm = Self::default();
        for (a, p) in actual.iter().zip(predicted) {
            match (a.is_potent(), p.is_potent()) {
                (true, true) => cm.true_positives += 1,
                (false, true) => cm.false_positives += 1,
                (false, false) => cm.true_negatives += 1,
                (true, false) => cm.false_negatives += 1,
            }
        }
        Ok(cm)
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }

    /// 0 when nothing was predicted potent.
    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    /// 0 when no row is actually potent.
    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    /// Rows are actual (less potent, potent), columns predicted.
    pub fn as_table(&self) -> [[usize; 2]; 2] {
        [
            [self.true_negatives, self.false_positives],
            [self.false_negatives, self.true_positives],
        ]
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn check_lengths(a: usize, b: usize) -> Result<()> {
    if a != b {
        return Err(PpiScreenError::invalid(format!("{a} actual labels but {b} predictions")));
    }
    if a == 0 {
        return Err(PpiScreenError::invalid("cannot evaluate zero predictions"));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RocPoint {
    pub false_positive_rate: f64,
    pub true_positive_rate: f64,
    /// Rows scoring at or above this value are called potent
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocCurve {
    pub points: Vec<RocPoint>,
    pub auc: f64,
}

/// ROC curve from decision scores, one point per distinct score (tied
/// scores move together), with the trapezoidal area under it.
///
/// Needs at least one row of each class.
pub fn roc_curve(actual: &[PotencyLabel], scores: &[f64]) -> Result<RocCurve> {
    check_lengths(actual.len(), scores.len())?;
    if scores.iter().any(|s| !s.is_finite()) {
        return Err(PpiScreenError::invalid("decision scores must be finite"));
    }
    let positives = actual.iter().filter(|l| l.is_potent()).count();
    let negatives = actual.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(PpiScreenError::invalid("ROC curve needs both classes among the actual labels"));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let top = scores[order[0]];
    let mut points = vec![RocPoint { false_positive_rate: 0.0, true_positive_rate: 0.0, threshold: top + 1.0 }];
    let (mut tp, mut fp) = (0usize, 0usize);
    let mut i = 0;
    while i < order.len() {
        let threshold = scores[order[i]];
        while i < order.len() && scores[order[i]] == threshold {
            if actual[order[i]].is_potent() {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        points.push(RocPoint {
            false_positive_rate: fp as f64 / negatives as f64,
            true_positive_rate: tp as f64 / positives as f64,
            threshold,
        });
    }

    let auc = points
        .windows(2)
        .map(|w| {
            (w[1].false_positive_rate - w[0].false_positive_rate)
                * (w[1].true_positive_rate + w[0].true_positive_rate)
                / 2.0
        })
        .sum();

    Ok(RocCurve { points, auc })
}

/// Everything measured on one set of predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub confusion: ConfusionMatrix,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Absent when the evaluated rows hold a single class
    pub roc: Option<RocCurve>,
}

impl Evaluation {
    pub fn compute(actual: &[PotencyLabel], predicted: &[PotencyLabel], scores: &[f64]) -> Result<Self> {
        let confusion = ConfusionMatrix::from_labels(actual, predicted)?;
        check_lengths(actual.len(), scores.len())?;
        let both_classes = confusion.true_positives + confusion.false_negatives > 0
            && confusion.true_negatives + confusion.false_positives > 0;
        let roc = if both_classes { Some(roc_curve(actual, scores)?) } else { None };
        Ok(Self {
            accuracy: confusion.accuracy(),
            precision: confusion.precision(),
            recall: confusion.recall(),
            f1: confusion.f1(),
            confusion,
            roc,
        })
    }

    pub fn auc(&self) -> Option<f64> {
        self.roc.as_ref().map(|r| r.auc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PotencyLabel::*;

    #[test]
    fn test_confusion_counts_and_rates() {
        let actual = [Potent, Potent, LessPotent, LessPotent, Potent];
        let predicted = [Potent, LessPotent, LessPotent, Potent, Potent];
        let cm = ConfusionMatrix::from_labels(&actual, &predicted).unwrap();
        assert_eq!(cm.true_positives, 2);
        assert_eq!(cm.false_negatives, 1);
        assert_eq!(cm.true_negatives, 1);
        assert_eq!(cm.false_positives, 1);
        assert_eq!(cm.accuracy(), 0.6);
        assert!((cm.precision() - 2.0 / 3.0).abs() < 1e-12);
        assert!((cm.recall() - 2.0 / 3.0).abs() < 1e-12);
        assert!((cm.f1() - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(cm.as_table(), [[1, 1], [1, 2]]);
    }

    #[test]
    fn test_no_positive_predictions() {
        let cm = ConfusionMatrix::from_labels(&[Potent, LessPotent], &[LessPotent, LessPotent]).unwrap();
        assert_eq!(cm.precision(), 0.0);
        assert_eq!(cm.f1(), 0.0);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(ConfusionMatrix::from_labels(&[Potent], &[]).is_err());
    }

    #[test]
    fn test_perfect_ranking_auc_one() {
        let roc = roc_curve(&[LessPotent, Potent, LessPotent, Potent], &[0.1, 0.9, 0.2, 0.8]).unwrap();
        assert_eq!(roc.auc, 1.0);
        let last = roc.points.last().unwrap();
        assert_eq!((last.false_positive_rate, last.true_positive_rate), (1.0, 1.0));
    }

    #[test]
    fn test_inverted_ranking_auc_zero() {
        let roc = roc_curve(&[Potent, LessPotent], &[0.1, 0.9]).unwrap();
        assert_eq!(roc.auc, 0.0);
    }

    #[test]
    fn test_all_tied_scores_give_diagonal() {
        let roc = roc_curve(&[Potent, LessPotent, Potent, LessPotent], &[0.5; 4]).unwrap();
        assert_eq!(roc.points.len(), 2);
        assert_eq!(roc.auc, 0.5);
    }

    #[test]
    fn test_single_class_has_no_roc() {
        assert!(roc_curve(&[Potent, Potent], &[0.2, 0.4]).is_err());
        let eval = Evaluation::compute(&[Potent, Potent], &[Potent, LessPotent], &[0.9, 0.1]).unwrap();
        assert!(eval.roc.is_none());
        assert_eq!(eval.accuracy, 0.5);
    }
}
