//! Loading the sample table and carrying both feature views through one split.

use pretty_assertions::assert_eq;

use ppiscreen_chem::FingerprintGenerator;
use ppiscreen_common::{InputConfig, PotencyLabel, PpiScreenError};
use ppiscreen_dataset::{
    derive_labels, DatasetLoader, DatasetSummary, FeatureMatrix, TrainTestSplit, VarianceThreshold,
};
use ppiscreen_test_utils::{sample_csv_file, write_temp_csv, SAMPLE_CSV};

fn load_sample() -> ppiscreen_dataset::Dataset {
    let file = sample_csv_file();
    DatasetLoader::new(&InputConfig::default())
        .unwrap()
        .load(file.path())
        .unwrap()
}

#[test]
fn sample_table_loads_and_labels() {
    let ds = load_sample();
    assert_eq!(ds.len(), 16);
    assert_eq!(ds.descriptor_names.len(), 6);

    let labels = derive_labels(&ds.records, 5.0).unwrap();
    let potent = labels.iter().filter(|l| l.is_potent()).count();
    assert_eq!(potent, 7);
    // the row at exactly 5.00 is less potent
    assert_eq!(labels[4], PotencyLabel::LessPotent);
}

#[test]
fn digest_tracks_file_contents() {
    let a = load_sample();
    let b = load_sample();
    assert_eq!(a.sha256, b.sha256);

    let edited = SAMPLE_CSV.replace("4.10", "4.11");
    let file = write_temp_csv(&edited);
    let c = DatasetLoader::new(&InputConfig::default()).unwrap().load(file.path()).unwrap();
    assert_ne!(a.sha256, c.sha256);
}

#[test]
fn malformed_smiles_surfaces_as_parse_error() {
    let broken = SAMPLE_CSV.replace("c1ccc2[nH]ccc2c1", "c1ccc2[nH]ccc2c");
    let file = write_temp_csv(&broken);
    let ds = DatasetLoader::new(&InputConfig::default()).unwrap().load(file.path()).unwrap();
    let gen = FingerprintGenerator::new(2, 128).unwrap();
    let err = gen.generate_all(ds.smiles()).unwrap_err();
    assert!(matches!(err, PpiScreenError::Parse(ref m) if m.contains("molecule 2")));
}

#[test]
fn one_split_applies_to_every_view() {
    let ds = load_sample();
    let labels = derive_labels(&ds.records, 5.0).unwrap();

    let descriptors = ds.descriptor_matrix().unwrap();
    let fingerprints = FingerprintGenerator::new(2, 64).unwrap().generate_all(ds.smiles()).unwrap();
    let fp_matrix = FeatureMatrix::from_fingerprints(&fingerprints).unwrap();
    let selection = VarianceThreshold::new(0.15, 0).unwrap().fit_transform(&fp_matrix).unwrap();

    assert_eq!(selection.mask.len(), 64);
    for (&keep, &var) in selection.mask.iter().zip(&selection.variances) {
        assert_eq!(keep, var > 0.15);
    }

    let split = TrainTestSplit::random(ds.len(), 0.26, 42).unwrap();
    assert_eq!(split.test.len(), 5); // ceil(0.26 * 16)

    let desc_view = split.apply(&descriptors).unwrap();
    let fp_view = split.apply(&selection.matrix).unwrap();
    let (y_train, y_test) = split.apply_slice(&labels).unwrap();

    assert_eq!(desc_view.train.n_rows(), y_train.len());
    assert_eq!(fp_view.test.n_rows(), y_test.len());

    for (pos, &row) in split.test.iter().enumerate() {
        assert_eq!(desc_view.test.row(pos), ds.records[row].descriptors.as_slice());
        assert_eq!(fp_view.test.row(pos), selection.matrix.row(row));
        assert_eq!(y_test[pos], labels[row]);
    }
}

#[test]
fn summary_reflects_sources_and_labels() {
    let ds = load_sample();
    let labels = derive_labels(&ds.records, 5.0).unwrap();
    let summary = DatasetSummary::build(&ds, &labels, 10).unwrap();
    assert_eq!(summary.source_counts.len(), 3);
    assert_eq!(summary.source_counts["chembl"], 9);
    assert_eq!(summary.label_counts[&PotencyLabel::Potent], 7);
    assert_eq!(summary.descriptors.len(), 6);
    assert!(summary.descriptors.iter().all(|d| d.histogram.total() == 16));
}
