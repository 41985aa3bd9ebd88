//! Dense row-major feature matrix with named columns.

use ppiscreen_chem::Fingerprint;
use ppiscreen_common::{PpiScreenError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    n_rows: usize,
    data: Vec<f64>,
}

impl FeatureMatrix {
    /// Build from named columns and equally long rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_cols = columns.len();
        let n_rows = rows.len();
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_cols {
                return Err(PpiScreenError::invalid(format!(
                    "row {i} has {} values, expected {n_cols}",
                    row.len()
                )));
            }
            data.extend(row);
        }
        Ok(Self { columns, n_rows, data })
    }

    /// The fingerprint view: column `fp_<bit>` holds bit `<bit>` as 0.0/1.0.
    pub fn from_fingerprints(fingerprints: &[Fingerprint]) -> Result<Self> {
        let n_bits = fingerprints.first().map(|fp| fp.n_bits()).ok_or_else(|| {
            PpiScreenError::invalid("cannot build a fingerprint matrix from zero molecules")
        })?;
        let columns = (0..n_bits).map(|i| format!("fp_{i}")).collect();
        let rows = fingerprints
            .iter()
            .enumerate()
            .map(|(i, fp)| {
                if fp.n_bits() != n_bits {
                    return Err(PpiScreenError::invalid(format!(
                        "fingerprint {i} has {} bits, expected {n_bits}",
                        fp.n_bits()
                    )));
                }
                Ok(fp.to_features())
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(columns, rows)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn row(&self, i: usize) -> &[f64] {
        let n = self.n_cols();
        &self.data[i * n..(i + 1) * n]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.n_rows).map(move |i| self.row(i))
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.n_cols() + col]
    }

    pub fn column(&self, col: usize) -> impl Iterator<Item = f64> + '_ {
        (0..self.n_rows).map(move |r| self.get(r, col))
    }

    /// New matrix holding the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Result<Self> {
        let mut data = Vec::with_capacity(indices.len() * self.n_cols());
        for &i in indices {
            if i >= self.n_rows {
                return Err(PpiScreenError::invalid(format!(
                    "row index {i} out of range for {} rows",
                    self.n_rows
                )));
            }
            data.extend_from_slice(self.row(i));
        }
        Ok(Self { columns: self.columns.clone(), n_rows: indices.len(), data })
    }

    /// Keep the columns whose mask entry is `true`.
    pub fn select_columns(&self, mask: &[bool]) -> Result<Self> {
        if mask.len() != self.n_cols() {
            return Err(PpiScreenError::invalid(format!(
                "column mask has {} entries, matrix has {} columns",
                mask.len(),
                self.n_cols()
            )));
        }
        let keep: Vec<usize> = mask.iter().enumerate().filter(|(_, &k)| k).map(|(i, _)| i).collect();
        Ok(self.take_columns(&keep))
    }

    /// Keep the named columns, in the order given.
    pub fn select_columns_by_name<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        let keep = names
            .iter()
            .map(|n| {
                let n = n.as_ref();
                self.column_index(n)
                    .ok_or_else(|| PpiScreenError::invalid(format!("unknown column '{n}'")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.take_columns(&keep))
    }

    fn take_columns(&self, keep: &[usize]) -> Self {
        let columns = keep.iter().map(|&c| self.columns[c].clone()).collect();
        let data = self
            .rows()
            .flat_map(move |row| keep.iter().map(move |&c| row[c]))
            .collect();
        Self { columns, n_rows: self.n_rows, data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FeatureMatrix {
        FeatureMatrix::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = FeatureMatrix::new(vec!["a".into()], vec![vec![1.0], vec![1.0, 2.0]]).unwrap_err();
        assert!(matches!(err, PpiScreenError::InvalidInput(_)));
    }

    #[test]
    fn test_row_and_column_access() {
        let m = sample();
        assert_eq!(m.row(1), &[4.0, 5.0, 6.0]);
        assert_eq!(m.column(2).collect::<Vec<_>>(), vec![3.0, 6.0]);
        assert_eq!(m.column_index("b"), Some(1));
    }

    #[test]
    fn test_select_rows_reorders() {
        let m = sample().select_rows(&[1, 0, 1]).unwrap();
        assert_eq!(m.n_rows(), 3);
        assert_eq!(m.row(0), &[4.0, 5.0, 6.0]);
        assert!(sample().select_rows(&[2]).is_err());
    }

    #[test]
    fn test_select_columns_keeps_names() {
        let m = sample().select_columns(&[true, false, true]).unwrap();
        assert_eq!(m.columns(), &["a".to_string(), "c".to_string()]);
        assert_eq!(m.row(1), &[4.0, 6.0]);
        assert!(sample().select_columns(&[true]).is_err());
    }

    #[test]
    fn test_select_columns_by_name() {
        let m = sample().select_columns_by_name(&["c", "a"]).unwrap();
        assert_eq!(m.row(0), &[3.0, 1.0]);
        assert!(sample().select_columns_by_name(&["z"]).is_err());
    }

    #[test]
    fn test_from_fingerprints() {
        let mut fp = Fingerprint::new(4).unwrap();
        fp.set_bit(2);
        let m = FeatureMatrix::from_fingerprints(&[fp, Fingerprint::new(4).unwrap()]).unwrap();
        assert_eq!(m.columns()[2], "fp_2");
        assert_eq!(m.row(0), &[0.0, 0.0, 1.0, 0.0]);
        assert!(FeatureMatrix::from_fingerprints(&[Fingerprint::new(4).unwrap(), Fingerprint::new(8).unwrap()]).is_err());
        assert!(FeatureMatrix::from_fingerprints(&[]).is_err());
    }
}
