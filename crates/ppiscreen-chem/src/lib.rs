//! ppiscreen Chem - Structure handling for the feature pipeline.
//!
//! This crate turns the structural encoding column into model features:
//! 1. Parsing SMILES into a molecular graph with implicit hydrogens
//! 2. Perceiving ring membership
//! 3. Hashing circular atom environments into fixed-width fingerprints

pub mod element;
pub mod molecule;
pub mod smiles;
pub mod rings;
pub mod fingerprint;

pub use fingerprint::{Fingerprint, FingerprintGenerator};
pub use molecule::Molecule;
pub use smiles::parse_smiles;
