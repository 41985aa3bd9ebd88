//! Potency thresholding.

use ppiscreen_common::{MoleculeRecord, PotencyLabel, PpiScreenError, Result};
use tracing::info;

/// Potent iff `potency > threshold`; a potency equal to the threshold is
/// less potent.
pub fn derive_label(potency: Option<f64>, threshold: f64) -> Result<PotencyLabel> {
    if !threshold.is_finite() {
        return Err(PpiScreenError::invalid(format!("potency threshold must be finite, got {threshold}")));
    }
    match potency {
        None => Err(PpiScreenError::invalid("potency value is missing")),
        Some(v) if !v.is_finite() => Err(PpiScreenError::invalid(format!("potency must be finite, got {v}"))),
        Some(v) if v > threshold => Ok(PotencyLabel::Potent),
        Some(_) => Ok(PotencyLabel::LessPotent),
    }
}

/// Label every record in order, failing on the first unlabelable row.
pub fn derive_labels(records: &[MoleculeRecord], threshold: f64) -> Result<Vec<PotencyLabel>> {
    let labels = records
        .iter()
        .map(|r| {
            derive_label(r.potency, threshold).map_err(|e| match e {
                PpiScreenError::InvalidInput(msg) => {
                    PpiScreenError::invalid(format!("row {} ({}): {msg}", r.row, r.smiles))
                }
                other => other,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let potent = labels.iter().filter(|l| l.is_potent()).count();
    info!(
        "Labelled {} molecules at threshold {}: {} potent, {} less potent",
        labels.len(),
        threshold,
        potent,
        labels.len() - potent
    );
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ppiscreen_test_utils::record;
    use PotencyLabel::*;

    #[test]
    fn test_threshold_examples() {
        let labels: Vec<_> = [3.0, 5.0, 5.1, 9.0]
            .iter()
            .map(|&v| derive_label(Some(v), 5.0).unwrap())
            .collect();
        assert_eq!(labels, vec![LessPotent, LessPotent, Potent, Potent]);
    }

    #[test]
    fn test_missing_and_nan_rejected() {
        assert!(matches!(derive_label(None, 5.0), Err(PpiScreenError::InvalidInput(_))));
        assert!(matches!(derive_label(Some(f64::NAN), 5.0), Err(PpiScreenError::InvalidInput(_))));
        assert!(matches!(derive_label(Some(6.0), f64::INFINITY), Err(PpiScreenError::InvalidInput(_))));
    }

    #[test]
    fn test_batch_names_offending_row() {
        let records = vec![record(0, "CCO", Some(6.0)), record(7, "c1ccncc1", None)];
        let err = derive_labels(&records, 5.0).unwrap_err();
        assert!(err.to_string().contains("row 7"));
        assert!(err.to_string().contains("c1ccncc1"));
    }

    #[test]
    fn test_batch_preserves_order() {
        let records = vec![record(0, "CCO", Some(4.0)), record(1, "CCN", Some(8.0))];
        assert_eq!(derive_labels(&records, 5.0).unwrap(), vec![LessPotent, Potent]);
    }
}
