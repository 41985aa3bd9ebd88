//! Shared fixtures for ppiscreen tests: a small PPI inhibitor table, temp
//! file helpers and synthetic, perfectly separable data.

use std::io::Write;

use ppiscreen_common::{MoleculeRecord, PotencyLabel};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::NamedTempFile;

/// Sixteen molecules, three sources, potencies on both sides of 5.0
/// (one exactly at 5.0).
pub const SAMPLE_CSV: &str = "\
smiles,source,logp,hba,hbd,rotatable_bonds,rings,mw,pic50
CC(=O)Oc1ccccc1C(=O)O,chembl,1.31,3,1,2,1,180.16,4.10
O=C(O)c1ccc(cc1)-c1ccccc1,chembl,3.12,1,1,2,2,198.22,4.80
c1ccc2[nH]ccc2c1,bindingdb,2.14,0,1,0,2,117.15,3.90
CN1CCN(CC1)Cc1ccc(cc1)C(=O)N,chembl,0.42,3,1,3,2,233.31,4.55
COc1ccc(cc1)C(=O)Nc1ccc(Cl)cc1,pubchem,3.55,2,1,3,2,261.70,5.00
CC(C)Oc1ccc(cc1)C1=NC(c2ccc(Cl)cc2)C(c2ccc(Cl)cc2)N1,chembl,6.21,3,1,4,4,439.38,6.90
Clc1ccc(cc1)C1NC(=O)N(C1c1ccc(Cl)cc1)C,bindingdb,4.48,2,1,2,3,321.20,6.20
O=C(NCc1ccccc1)c1cc2ccccc2[nH]1,chembl,3.30,1,2,3,3,250.30,5.40
CC(=O)Nc1ccc(O)cc1,pubchem,0.46,2,2,1,1,151.16,3.20
Cc1ccc(cc1)S(=O)(=O)Nc1ccccc1C(=O)O,chembl,2.66,4,2,4,2,291.32,5.80
c1ccc(cc1)-c1nc2ccccc2[nH]1,bindingdb,3.05,1,1,1,3,194.23,4.30
OC(=O)CCc1ccc(cc1)-c1ccc(F)cc1,chembl,3.70,1,1,4,2,244.26,5.10
CCN(CC)CCOC(=O)c1ccc(N)cc1,pubchem,1.86,4,1,7,1,236.31,2.90
Fc1ccc(cc1)C(=O)N1CCC(CC1)c1ccc(Cl)cc1,chembl,4.60,1,0,2,3,317.79,7.10
O=C1NC(=O)c2ccccc12,bindingdb,0.95,2,1,0,2,147.13,3.60
COc1cc2ncnc(Nc3ccc(F)c(Cl)c3)c2cc1OC,chembl,4.28,5,1,4,3,333.75,6.60
";

/// Write `contents` to a named temp file with the given extension. The file
/// is removed when the handle drops.
pub fn write_temp_file(contents: &str, extension: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("ppiscreen-")
        .suffix(&format!(".{extension}"))
        .tempfile()
        .expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

pub fn write_temp_csv(contents: &str) -> NamedTempFile {
    write_temp_file(contents, "csv")
}

/// `SAMPLE_CSV` written to disk.
pub fn sample_csv_file() -> NamedTempFile {
    write_temp_csv(SAMPLE_CSV)
}

/// Rows and labels where feature 0 alone separates the classes: potent rows
/// sit in [2, 3), less potent rows in [0, 1). The remaining `n_noise`
/// features are uniform noise in [0, 1).
pub fn separable_rows(n: usize, n_noise: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<PotencyLabel>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(n);
    let mut labels = Vec::with_capacity(n);
    for i in 0..n {
        let label = if i % 2 == 0 { PotencyLabel::Potent } else { PotencyLabel::LessPotent };
        let offset = if label.is_potent() { 2.0 } else { 0.0 };
        let mut row = vec![offset + rng.gen::<f64>()];
        row.extend((0..n_noise).map(|_| rng.gen::<f64>()));
        rows.push(row);
        labels.push(label);
    }
    (rows, labels)
}

/// Column names matching [`separable_rows`].
pub fn separable_columns(n_noise: usize) -> Vec<String> {
    std::iter::once("signal".to_string())
        .chain((0..n_noise).map(|i| format!("noise_{i}")))
        .collect()
}

/// A molecule record with the given potency and a single descriptor.
pub fn record(row: usize, smiles: &str, potency: Option<f64>) -> MoleculeRecord {
    MoleculeRecord {
        row,
        smiles: smiles.to_string(),
        source: "chembl".to_string(),
        descriptors: vec![row as f64],
        potency,
    }
}
