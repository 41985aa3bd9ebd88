//! Delimited bioactivity table loader.
//!
//! The table carries one molecule per row: a SMILES string, a provenance
//! tag, a set of precomputed numeric descriptors and a log-scaled potency.
//! Columns are located by header name, so their order in the file is free.

use std::path::Path;

use ppiscreen_common::{ColumnMapping, InputConfig, MoleculeRecord, PpiScreenError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::matrix::FeatureMatrix;

/// Potency cells that mean "not measured".
const MISSING_MARKERS: &[&str] = &["", "na", "n/a", "nan", "null", "none"];

/// An in-memory bioactivity table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Descriptor column names, aligned with every record's `descriptors`
    pub descriptor_names: Vec<String>,
    pub records: Vec<MoleculeRecord>,
    /// Hex SHA-256 of the raw file bytes
    pub sha256: String,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn smiles(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.smiles.as_str())
    }

    pub fn potencies(&self) -> Vec<Option<f64>> {
        self.records.iter().map(|r| r.potency).collect()
    }

    /// The descriptor view: one row per record, one column per descriptor.
    pub fn descriptor_matrix(&self) -> Result<FeatureMatrix> {
        let rows = self.records.iter().map(|r| r.descriptors.clone()).collect();
        FeatureMatrix::new(self.descriptor_names.clone(), rows)
    }
}

/// Reads a bioactivity table according to an [`InputConfig`].
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    delimiter: u8,
    columns: ColumnMapping,
    skip_missing_potency: bool,
}

impl DatasetLoader {
    pub fn new(config: &InputConfig) -> Result<Self> {
        if !config.delimiter.is_ascii() {
            return Err(PpiScreenError::invalid(format!(
                "delimiter must be a single ASCII character, got {:?}",
                config.delimiter
            )));
        }
        Ok(Self {
            delimiter: config.delimiter as u8,
            columns: config.columns.clone(),
            skip_missing_potency: config.skip_missing_potency,
        })
    }

    /// Load the table at `path`.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Dataset> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PpiScreenError::FileNotFound(path.to_path_buf()));
        }
        debug!("Loading bioactivity table from {:?}", path);

        let bytes = std::fs::read(path)?;
        let dataset = self.load_bytes(&bytes)?;
        info!(
            "Loaded {} molecules with {} descriptors from {:?}",
            dataset.len(),
            dataset.descriptor_names.len(),
            path
        );
        Ok(dataset)
    }

    /// Load a table already held in memory.
    pub fn load_bytes(&self, bytes: &[u8]) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(bytes);

        let headers = reader
            .headers()
            .map_err(|e| PpiScreenError::parse(format!("header: {e}")))?
            .clone();
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| PpiScreenError::parse(format!("missing column '{name}' in header")))
        };

        let smiles_idx = find(&self.columns.smiles)?;
        let source_idx = find(&self.columns.source)?;
        let potency_idx = find(&self.columns.potency)?;
        let descriptor_idx = self
            .columns
            .descriptors
            .iter()
            .map(|name| find(name))
            .collect::<Result<Vec<_>>>()?;

        let mut records = Vec::new();
        let mut skipped = 0usize;

        for (row, result) in reader.records().enumerate() {
            // header is line 1
            let line = row + 2;
            let record = result.map_err(|e| PpiScreenError::parse(format!("line {line}: {e}")))?;
            let field = |idx: usize| record.get(idx).unwrap_or("");

            let smiles = field(smiles_idx);
            if smiles.is_empty() {
                return Err(PpiScreenError::parse(format!("line {line}: empty SMILES")));
            }

            let descriptors = descriptor_idx
                .iter()
                .zip(&self.columns.descriptors)
                .map(|(&idx, name)| {
                    let raw = field(idx);
                    match raw.parse::<f64>() {
                        Ok(v) if v.is_finite() => Ok(v),
                        Ok(_) => Err(PpiScreenError::parse(format!(
                            "line {line}: descriptor '{name}' must be finite, got {raw:?}"
                        ))),
                        Err(_) => Err(PpiScreenError::parse(format!(
                            "line {line}: descriptor '{name}' is not numeric: {raw:?}"
                        ))),
                    }
                })
                .collect::<Result<Vec<_>>>()?;

            let potency = parse_potency(field(potency_idx))
                .map_err(|e| PpiScreenError::invalid(format!("line {line}: {e}")))?;

            if potency.is_none() && self.skip_missing_potency {
                warn!("Skipping line {}: no potency value", line);
                skipped += 1;
                continue;
            }

            records.push(MoleculeRecord {
                row,
                smiles: smiles.to_string(),
                source: field(source_idx).to_string(),
                descriptors,
                potency,
            });
        }

        if skipped > 0 {
            warn!("Skipped {} rows without potency", skipped);
        }

        Ok(Dataset {
            descriptor_names: self.columns.descriptors.clone(),
            records,
            sha256: format!("{:x}", Sha256::digest(bytes)),
        })
    }
}

/// Parse one potency cell: missing markers give `None`, anything else must
/// be a finite number.
pub fn parse_potency(raw: &str) -> std::result::Result<Option<f64>, String> {
    let trimmed = raw.trim();
    if MISSING_MARKERS.contains(&trimmed.to_ascii_lowercase().as_str()) {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        Ok(v) => Err(format!("potency must be finite, got {v}")),
        Err(_) => Err(format!("potency is not numeric: {trimmed:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "smiles,source,logp,hba,hbd,rotatable_bonds,rings,mw,pic50";

    fn load(text: &str) -> Result<Dataset> {
        DatasetLoader::new(&InputConfig::default())?.load_bytes(text.as_bytes())
    }

    #[test]
    fn test_parse_potency_markers() {
        assert_eq!(parse_potency("6.2"), Ok(Some(6.2)));
        assert_eq!(parse_potency(""), Ok(None));
        assert_eq!(parse_potency("NA"), Ok(None));
        assert_eq!(parse_potency("NaN"), Ok(None));
        assert!(parse_potency("potent").is_err());
        assert!(parse_potency("inf").is_err());
    }

    #[test]
    fn test_load_two_rows() {
        let text = format!(
            "{HEADER}\nCCO,chembl,-0.1,1,1,0,0,46.07,4.2\nc1ccccc1,pubchem,1.9,0,0,0,1,78.11,\n"
        );
        let ds = load(&text).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].source, "chembl");
        assert_eq!(ds.records[0].potency, Some(4.2));
        assert_eq!(ds.records[1].potency, None);
        assert_eq!(ds.records[1].descriptors[5], 78.11);
        assert_eq!(ds.sha256.len(), 64);
    }

    #[test]
    fn test_columns_found_by_name_not_position() {
        let text = "pic50,mw,rings,rotatable_bonds,hbd,hba,logp,source,smiles\n7.0,46.07,0,0,1,1,-0.1,chembl,CCO\n";
        let ds = load(text).unwrap();
        assert_eq!(ds.records[0].smiles, "CCO");
        assert_eq!(ds.records[0].descriptors, vec![-0.1, 1.0, 1.0, 0.0, 0.0, 46.07]);
    }

    #[test]
    fn test_missing_header_column() {
        let err = load("smiles,source,pic50\nCCO,x,5\n").unwrap_err();
        assert!(matches!(err, PpiScreenError::Parse(ref m) if m.contains("'logp'")));
    }

    #[test]
    fn test_wrong_field_count_is_parse_error() {
        let text = format!("{HEADER}\nCCO,chembl,1,2\n");
        assert!(matches!(load(&text), Err(PpiScreenError::Parse(_))));
    }

    #[test]
    fn test_non_numeric_descriptor_is_parse_error() {
        let text = format!("{HEADER}\nCCO,chembl,high,1,1,0,0,46.07,4.2\n");
        let err = load(&text).unwrap_err();
        assert!(matches!(err, PpiScreenError::Parse(ref m) if m.contains("logp")));
    }

    #[test]
    fn test_non_finite_descriptor_is_parse_error() {
        let text = format!("{HEADER}\nCCO,chembl,NaN,1,1,0,0,46.07,4.2\n");
        let err = load(&text).unwrap_err();
        assert!(matches!(err, PpiScreenError::Parse(ref m) if m.contains("line 2") && m.contains("'logp'")));

        let text = format!("{HEADER}\nCCO,chembl,0.1,1,1,0,0,46.07,4.2\nCC,chembl,0.2,1,1,0,0,inf,4.0\n");
        let err = load(&text).unwrap_err();
        assert!(matches!(err, PpiScreenError::Parse(ref m) if m.contains("line 3") && m.contains("'mw'")));

        let text = format!("{HEADER}\nCCO,chembl,0.1,-inf,1,0,0,46.07,4.2\n");
        assert!(matches!(load(&text), Err(PpiScreenError::Parse(_))));
    }

    #[test]
    fn test_non_numeric_potency_is_invalid_input() {
        let text = format!("{HEADER}\nCCO,chembl,0.1,1,1,0,0,46.07,strong\n");
        assert!(matches!(load(&text), Err(PpiScreenError::InvalidInput(_))));
    }

    #[test]
    fn test_skip_missing_potency() {
        let config = InputConfig { skip_missing_potency: true, ..InputConfig::default() };
        let text = format!("{HEADER}\nCCO,a,0,1,1,0,0,46,NA\nCCN,b,0,1,1,0,0,45,6.0\n");
        let ds = DatasetLoader::new(&config).unwrap().load_bytes(text.as_bytes()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].row, 1);
    }

    #[test]
    fn test_tab_delimiter() {
        let config = InputConfig { delimiter: '\t', ..InputConfig::default() };
        let text = HEADER.replace(',', "\t") + "\nCCO\tchembl\t0\t1\t1\t0\t0\t46\t5.5\n";
        let ds = DatasetLoader::new(&config).unwrap().load_bytes(text.as_bytes()).unwrap();
        assert_eq!(ds.records[0].potency, Some(5.5));
    }

    #[test]
    fn test_missing_file() {
        let loader = DatasetLoader::new(&InputConfig::default()).unwrap();
        assert!(matches!(
            loader.load("/nonexistent/ppi.csv"),
            Err(PpiScreenError::FileNotFound(_))
        ));
    }
}
