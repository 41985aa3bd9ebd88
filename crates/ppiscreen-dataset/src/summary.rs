//! Dataset overview: class balance, provenance and value distributions.
//!
//! These are the numbers behind the exploratory charts; they end up in the
//! run report instead of being drawn.

use std::collections::BTreeMap;

use ppiscreen_common::{PotencyLabel, PpiScreenError, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::loader::Dataset;

/// Fixed-width bins over `[min, max]`; the last bin is closed on the right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub min: f64,
    pub max: f64,
    /// `counts.len() + 1` bin edges
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin `values` into `bins` equal-width bins. A constant sample lands in
    /// a single bin; an empty sample gives no bins.
    pub fn from_values(values: &[f64], bins: usize) -> Result<Self> {
        if bins == 0 {
            return Err(PpiScreenError::invalid("histogram needs at least one bin"));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(PpiScreenError::invalid("histogram values must be finite"));
        }
        let Some(min) = values.iter().copied().reduce(f64::min) else {
            return Ok(Self { min: 0.0, max: 0.0, edges: vec![], counts: vec![] });
        };
        let max = values.iter().copied().fold(min, f64::max);

        if max == min {
            return Ok(Self { min, max, edges: vec![min, max], counts: vec![values.len()] });
        }

        let width = (max - min) / bins as f64;
        let edges = (0..=bins).map(|i| min + width * i as f64).collect();
        let mut counts = vec![0usize; bins];
        for &v in values {
            let idx = (((v - min) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }
        Ok(Self { min, max, edges, counts })
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnHistogram {
    pub column: String,
    pub histogram: Histogram,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub n_molecules: usize,
    pub n_missing_potency: usize,
    pub label_counts: BTreeMap<PotencyLabel, usize>,
    pub source_counts: BTreeMap<String, usize>,
    /// Over the measured potencies only
    pub potency: Histogram,
    pub descriptors: Vec<ColumnHistogram>,
}

impl DatasetSummary {
    /// `labels` may be empty when the dataset has not been labelled yet.
    pub fn build(dataset: &Dataset, labels: &[PotencyLabel], bins: usize) -> Result<Self> {
        if !labels.is_empty() && labels.len() != dataset.len() {
            return Err(PpiScreenError::invalid(format!(
                "{} labels for {} molecules",
                labels.len(),
                dataset.len()
            )));
        }

        let mut label_counts = BTreeMap::new();
        for &label in labels {
            *label_counts.entry(label).or_insert(0) += 1;
        }

        let mut source_counts = BTreeMap::new();
        for record in &dataset.records {
            *source_counts.entry(record.source.clone()).or_insert(0) += 1;
        }

        let measured: Vec<f64> = dataset.records.iter().filter_map(|r| r.potency).collect();
        let potency = Histogram::from_values(&measured, bins)?;

        let descriptors = dataset
            .descriptor_names
            .iter()
            .enumerate()
            .map(|(c, name)| {
                let values = dataset
                    .records
                    .iter()
                    .map(|r| {
                        r.descriptors.get(c).copied().ok_or_else(|| {
                            PpiScreenError::invalid(format!("row {}: no value for descriptor '{name}'", r.row))
                        })
                    })
                    .collect::<Result<Vec<f64>>>()?;
                Ok(ColumnHistogram { column: name.clone(), histogram: Histogram::from_values(&values, bins)? })
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Summary: {} molecules from {} sources, labels {:?}",
            dataset.len(),
            source_counts.len(),
            label_counts
        );

        Ok(Self {
            n_molecules: dataset.len(),
            n_missing_potency: dataset.len() - measured.len(),
            label_counts,
            source_counts,
            potency,
            descriptors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ppiscreen_test_utils::record;

    #[test]
    fn test_histogram_bins() {
        let h = Histogram::from_values(&[0.0, 1.0, 2.0, 3.0, 4.0], 4).unwrap();
        assert_eq!(h.edges, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(h.counts, vec![1, 1, 1, 2]);
        assert_eq!(h.total(), 5);
    }

    #[test]
    fn test_constant_values_single_bin() {
        let h = Histogram::from_values(&[2.5; 7], 10).unwrap();
        assert_eq!(h.counts, vec![7]);
    }

    #[test]
    fn test_histogram_rejects_zero_bins() {
        assert!(Histogram::from_values(&[1.0], 0).is_err());
        assert!(Histogram::from_values(&[], 3).unwrap().counts.is_empty());
    }

    #[test]
    fn test_summary_counts() {
        let mut from_bindingdb = record(2, "CCC", None);
        from_bindingdb.source = "bindingdb".into();
        let dataset = Dataset {
            descriptor_names: vec!["logp".into()],
            records: vec![record(0, "C", Some(6.0)), record(1, "CC", Some(4.0)), from_bindingdb],
            sha256: String::new(),
        };
        let labels = [PotencyLabel::Potent, PotencyLabel::LessPotent, PotencyLabel::LessPotent];
        let s = DatasetSummary::build(&dataset, &labels, 5).unwrap();
        assert_eq!(s.source_counts["chembl"], 2);
        assert_eq!(s.source_counts["bindingdb"], 1);
        assert_eq!(s.label_counts[&PotencyLabel::LessPotent], 2);
        assert_eq!(s.n_missing_potency, 1);
        assert_eq!(s.potency.total(), 2);
        assert_eq!(s.descriptors[0].histogram.total(), 3);
    }

    #[test]
    fn test_short_descriptor_row_names_the_row() {
        let mut short = record(4, "CCO", Some(5.5));
        short.descriptors.clear();
        let dataset = Dataset {
            descriptor_names: vec!["logp".into()],
            records: vec![record(3, "C", Some(6.0)), short],
            sha256: String::new(),
        };
        let labels = [PotencyLabel::Potent, PotencyLabel::Potent];
        let err = DatasetSummary::build(&dataset, &labels, 5).unwrap_err();
        assert!(matches!(err, PpiScreenError::InvalidInput(ref m) if m.contains("row 4") && m.contains("'logp'")));
    }
}
