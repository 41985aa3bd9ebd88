//! Molecular graph representation.

use serde::{Deserialize, Serialize};

use crate::element::Element;

/// Bond order classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Quadruple,
    Aromatic,
}

impl BondOrder {
    /// Integer contribution to a non-aromatic atom's valence.
    pub fn valence(self) -> u8 {
        match self {
            BondOrder::Single | BondOrder::Aromatic => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            BondOrder::Quadruple => 4,
        }
    }

    /// Stable small code used when hashing atom environments.
    pub fn code(self) -> u64 {
        match self {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            BondOrder::Quadruple => 4,
            BondOrder::Aromatic => 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub atomic_number: u8,
    pub aromatic: bool,
    pub formal_charge: i8,
    pub isotope: Option<u16>,
    /// Hydrogens not present as graph nodes
    pub hydrogens: u8,
    /// Written in brackets: hydrogen count is explicit, not valence-derived
    pub bracket: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bond {
    pub atom1: usize,
    pub atom2: usize,
    pub order: BondOrder,
}

/// A molecular graph with atoms, bonds, and adjacency information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Molecule {
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
    /// adjacency[atom_idx] = Vec<(neighbor_atom_idx, bond_idx)>
    pub adjacency: Vec<Vec<(usize, usize)>>,
}

impl Molecule {
    /// Build the adjacency list from atoms and bonds.
    pub fn new(atoms: Vec<Atom>, bonds: Vec<Bond>) -> Self {
        let mut adjacency = vec![Vec::new(); atoms.len()];
        for (bi, bond) in bonds.iter().enumerate() {
            adjacency[bond.atom1].push((bond.atom2, bi));
            adjacency[bond.atom2].push((bond.atom1, bi));
        }
        Self { atoms, bonds, adjacency }
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    /// Graph degree of an atom (explicit neighbours only).
    pub fn degree(&self, atom_idx: usize) -> usize {
        self.adjacency[atom_idx].len()
    }

    pub fn heavy_atom_count(&self) -> usize {
        self.atoms.iter().filter(|a| a.atomic_number > 1).count()
    }

    /// Hydrogen graph nodes plus implicit/bracket hydrogens.
    pub fn total_hydrogen_count(&self) -> usize {
        let nodes = self.atoms.iter().filter(|a| a.atomic_number == 1).count();
        let attached: usize = self.atoms.iter().map(|a| a.hydrogens as usize).sum();
        nodes + attached
    }

    /// Number of disconnected fragments (salts, counter-ions).
    pub fn component_count(&self) -> usize {
        let n = self.atom_count();
        let mut seen = vec![false; n];
        let mut components = 0;
        for start in 0..n {
            if seen[start] {
                continue;
            }
            components += 1;
            let mut stack = vec![start];
            seen[start] = true;
            while let Some(a) = stack.pop() {
                for &(nb, _) in &self.adjacency[a] {
                    if !seen[nb] {
                        seen[nb] = true;
                        stack.push(nb);
                    }
                }
            }
        }
        components
    }

    /// Cyclomatic number: bonds - atoms + components (SSSR size).
    pub fn ring_count(&self) -> usize {
        (self.bond_count() + self.component_count()).saturating_sub(self.atom_count())
    }

    /// Average molecular weight including attached hydrogens.
    pub fn molecular_weight(&self) -> f64 {
        let h_mass = Element::by_number(1).map(|e| e.mass).unwrap_or(1.008);
        self.atoms
            .iter()
            .map(|a| {
                let mass = Element::by_number(a.atomic_number).map(|e| e.mass).unwrap_or(0.0);
                mass + a.hydrogens as f64 * h_mass
            })
            .sum()
    }

    /// Fill `hydrogens` for unbracketed atoms from their default valences.
    ///
    /// Aromatic bonds count as 1; aromatic B, C, N and P get one extra unit
    /// for their pi contribution so that `c1ccccc1` yields six CH and
    /// `n1ccccc1` a bare N.
    pub fn assign_implicit_hydrogens(&mut self) {
        for idx in 0..self.atoms.len() {
            if self.atoms[idx].bracket {
                continue;
            }
            let atom = &self.atoms[idx];
            let Some(element) = Element::by_number(atom.atomic_number) else {
                continue;
            };

            let mut used: u32 = self.adjacency[idx]
                .iter()
                .map(|&(_, bi)| self.bonds[bi].order.valence() as u32)
                .sum();
            let has_aromatic_bond = self.adjacency[idx]
                .iter()
                .any(|&(_, bi)| self.bonds[bi].order == BondOrder::Aromatic);
            if atom.aromatic && has_aromatic_bond && matches!(atom.atomic_number, 5 | 6 | 7 | 15) {
                used += 1;
            }

            let hydrogens = element
                .default_valences
                .iter()
                .map(|&v| v as u32)
                .find(|&v| v >= used)
                .map(|v| v - used)
                .unwrap_or(0);
            self.atoms[idx].hydrogens = hydrogens as u8;
        }
    }
}
