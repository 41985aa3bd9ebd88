//! Hashed circular (Morgan / ECFP-like) fingerprints.

use std::fmt;

use ppiscreen_common::{PpiScreenError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::molecule::Molecule;
use crate::rings::ring_atoms;
use crate::smiles::parse_smiles;

/// A fixed-size bit vector fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    words: Vec<u64>,
    n_bits: usize,
}

impl Fingerprint {
    /// All-zero fingerprint of `n_bits` positions; zero width is `InvalidInput`.
    pub fn new(n_bits: usize) -> Result<Self> {
        if n_bits == 0 {
            return Err(PpiScreenError::invalid("fingerprint width must be > 0"));
        }
        Ok(Self::zeroed(n_bits))
    }

    // callers guarantee n_bits > 0
    fn zeroed(n_bits: usize) -> Self {
        Self {
            words: vec![0u64; n_bits.div_ceil(64)],
            n_bits,
        }
    }

    /// Set the bit at `pos % n_bits`.
    pub fn set_bit(&mut self, pos: usize) {
        let pos = pos % self.n_bits;
        self.words[pos / 64] |= 1u64 << (pos % 64);
    }

    pub fn get_bit(&self, pos: usize) -> bool {
        if pos >= self.n_bits {
            return false;
        }
        (self.words[pos / 64] >> (pos % 64)) & 1 == 1
    }

    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    pub fn n_bits(&self) -> usize {
        self.n_bits
    }

    /// Bits in position order.
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.n_bits).map(move |i| self.get_bit(i))
    }

    /// 0.0 / 1.0 feature row.
    pub fn to_features(&self) -> Vec<f64> {
        self.bits().map(|b| if b { 1.0 } else { 0.0 }).collect()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.bits() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Generates fingerprints of one fixed configuration, so every vector it
/// produces has the same width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FingerprintGenerator {
    radius: usize,
    n_bits: usize,
}

impl FingerprintGenerator {
    /// `radius` 2 corresponds to ECFP4.
    pub fn new(radius: usize, n_bits: usize) -> Result<Self> {
        if n_bits == 0 {
            return Err(PpiScreenError::invalid("fingerprint width must be > 0"));
        }
        Ok(Self { radius, n_bits })
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    pub fn n_bits(&self) -> usize {
        self.n_bits
    }

    /// Parse and fingerprint one SMILES string.
    pub fn generate(&self, smiles: &str) -> Result<Fingerprint> {
        let mol = parse_smiles(smiles)?;
        Ok(self.from_molecule(&mol))
    }

    /// Fingerprint every SMILES in order; the first parse failure aborts and
    /// names the offending position.
    pub fn generate_all<'a, I>(&self, smiles: I) -> Result<Vec<Fingerprint>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut out = Vec::new();
        for (idx, s) in smiles.into_iter().enumerate() {
            let fp = self.generate(s).map_err(|e| match e {
                PpiScreenError::Parse(msg) => PpiScreenError::parse(format!("molecule {idx}: {msg}")),
                other => other,
            })?;
            out.push(fp);
        }
        info!(
            "Generated {} fingerprints (radius {}, {} bits)",
            out.len(),
            self.radius,
            self.n_bits
        );
        Ok(out)
    }

    /// Morgan iteration: hash atom invariants, then refine `radius` times
    /// with sorted (neighbour id, bond order) pairs; every identifier from
    /// every iteration sets one folded bit.
    pub fn from_molecule(&self, mol: &Molecule) -> Fingerprint {
        let n = mol.atom_count();
        let mut fp = Fingerprint::zeroed(self.n_bits);
        if n == 0 {
            return fp;
        }

        let in_ring = ring_atoms(mol);

        let mut identifiers: Vec<u64> = mol
            .atoms
            .iter()
            .enumerate()
            .map(|(i, atom)| {
                let mut h = FNV_OFFSET;
                h = fnv1a_update(h, atom.atomic_number as u64);
                h = fnv1a_update(h, mol.degree(i) as u64);
                h = fnv1a_update(h, atom.hydrogens as u64);
                h = fnv1a_update(h, atom.formal_charge as i64 as u64);
                h = fnv1a_update(h, in_ring[i] as u64);
                fnv1a_update(h, atom.aromatic as u64)
            })
            .collect();

        for &id in &identifiers {
            fp.set_bit(fold(id, self.n_bits));
        }

        for iteration in 0..self.radius {
            let next: Vec<u64> = (0..n)
                .map(|i| {
                    let mut neighbours: Vec<(u64, u64)> = mol.adjacency[i]
                        .iter()
                        .map(|&(nb, bi)| (identifiers[nb], mol.bonds[bi].order.code()))
                        .collect();
                    neighbours.sort_unstable();

                    let mut h = fnv1a_update(FNV_OFFSET, iteration as u64 + 1);
                    h = fnv1a_update(h, identifiers[i]);
                    for (nid, order) in neighbours {
                        h = fnv1a_update(h, order);
                        h = fnv1a_update(h, nid);
                    }
                    h
                })
                .collect();
            for &id in &next {
                fp.set_bit(fold(id, self.n_bits));
            }
            identifiers = next;
        }

        debug!("Fingerprint: {} atoms, {} bits set", n, fp.count_ones());
        fp
    }
}

// FNV-1a over little-endian u64 words
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

fn fnv1a_update(hash: u64, value: u64) -> u64 {
    value.to_le_bytes().iter().fold(hash, |h, &b| (h ^ b as u64).wrapping_mul(FNV_PRIME))
}

fn fold(hash: u64, n_bits: usize) -> usize {
    (hash % n_bits as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_operations() {
        let mut fp = Fingerprint::new(128).unwrap();
        assert!(!fp.get_bit(42));
        fp.set_bit(42);
        assert!(fp.get_bit(42));
        fp.set_bit(42 + 128); // folds onto the same bit
        assert_eq!(fp.count_ones(), 1);
        assert!(!fp.get_bit(500));
    }

    #[test]
    fn test_width_not_multiple_of_64() {
        let fp = Fingerprint::new(70).unwrap();
        assert_eq!(fp.to_features().len(), 70);
        assert_eq!(fp.to_string().len(), 70);
    }

    #[test]
    fn test_deterministic() {
        let gen = FingerprintGenerator::new(2, 128).unwrap();
        let a = gen.generate("CC(=O)Oc1ccccc1C(=O)O").unwrap();
        let b = gen.generate("CC(=O)Oc1ccccc1C(=O)O").unwrap();
        assert_eq!(a, b);
        assert!(a.count_ones() > 0);
    }

    #[test]
    fn test_different_molecules_differ() {
        let gen = FingerprintGenerator::new(2, 128).unwrap();
        let ethanol = gen.generate("CCO").unwrap();
        let benzene = gen.generate("c1ccccc1").unwrap();
        assert_ne!(ethanol, benzene);
    }

    #[test]
    fn test_radius_zero_sets_only_atom_invariants() {
        let gen = FingerprintGenerator::new(0, 1024).unwrap();
        // Benzene: six equivalent atoms, one invariant
        assert_eq!(gen.generate("c1ccccc1").unwrap().count_ones(), 1);
    }

    #[test]
    fn test_zero_width_rejected() {
        assert!(matches!(
            FingerprintGenerator::new(2, 0),
            Err(PpiScreenError::InvalidInput(_))
        ));
        assert!(matches!(Fingerprint::new(0), Err(PpiScreenError::InvalidInput(_))));
    }

    #[test]
    fn test_generate_all_names_bad_row() {
        let gen = FingerprintGenerator::new(2, 64).unwrap();
        let err = gen.generate_all(["CCO", "C1CC"]).unwrap_err();
        assert!(err.to_string().contains("molecule 1"));
    }
}
