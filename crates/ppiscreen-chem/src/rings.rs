//! Ring membership perception.
//!
//! A bond lies on a ring iff it is not a bridge of the molecular graph; an
//! atom is a ring atom iff it touches a ring bond. Bridges are found with
//! an iterative Tarjan low-link DFS.

use crate::molecule::Molecule;

/// `true` for every bond that lies on at least one cycle.
pub fn ring_bonds(mol: &Molecule) -> Vec<bool> {
    let n = mol.atom_count();
    let mut in_ring = vec![true; mol.bond_count()];
    let mut disc = vec![usize::MAX; n];
    let mut low = vec![0usize; n];
    let mut timer = 0usize;

    for root in 0..n {
        if disc[root] != usize::MAX {
            continue;
        }
        // (atom, bond used to reach it, next adjacency slot to visit)
        let mut stack: Vec<(usize, Option<usize>, usize)> = vec![(root, None, 0)];
        disc[root] = timer;
        low[root] = timer;
        timer += 1;

        while let Some(&mut (atom, via, ref mut slot)) = stack.last_mut() {
            if let Some(&(next, bond)) = mol.adjacency[atom].get(*slot) {
                *slot += 1;
                if Some(bond) == via {
                    continue;
                }
                if disc[next] == usize::MAX {
                    disc[next] = timer;
                    low[next] = timer;
                    timer += 1;
                    stack.push((next, Some(bond), 0));
                } else {
                    low[atom] = low[atom].min(disc[next]);
                }
            } else {
                stack.pop();
                if let (Some(bond), Some(&(parent, _, _))) = (via, stack.last()) {
                    low[parent] = low[parent].min(low[atom]);
                    if low[atom] > disc[parent] {
                        in_ring[bond] = false;
                    }
                }
            }
        }
    }

    in_ring
}

/// `true` for every atom that belongs to at least one ring.
pub fn ring_atoms(mol: &Molecule) -> Vec<bool> {
    let bonds = ring_bonds(mol);
    let mut atoms = vec![false; mol.atom_count()];
    for (bond, _) in mol.bonds.iter().zip(&bonds).filter(|(_, &r)| r) {
        atoms[bond.atom1] = true;
        atoms[bond.atom2] = true;
    }
    atoms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse_smiles;

    #[test]
    fn test_chain_has_no_ring_atoms() {
        let mol = parse_smiles("CCCC").unwrap();
        assert!(ring_atoms(&mol).iter().all(|&r| !r));
    }

    #[test]
    fn test_toluene_methyl_is_not_in_ring() {
        let mol = parse_smiles("Cc1ccccc1").unwrap();
        let atoms = ring_atoms(&mol);
        assert!(!atoms[0]);
        assert!(atoms[1..].iter().all(|&r| r));
        let bonds = ring_bonds(&mol);
        assert_eq!(bonds.iter().filter(|&&r| r).count(), 6);
    }

    #[test]
    fn test_biphenyl_linker_is_a_bridge() {
        let mol = parse_smiles("c1ccccc1-c1ccccc1").unwrap();
        let bonds = ring_bonds(&mol);
        // 12 aromatic ring bonds plus one linker
        assert_eq!(bonds.len(), 13);
        assert_eq!(bonds.iter().filter(|&&r| !r).count(), 1);
    }

    #[test]
    fn test_fused_rings() {
        let mol = parse_smiles("c1ccc2ccccc2c1").unwrap();
        assert!(ring_atoms(&mol).iter().all(|&r| r));
        assert_eq!(mol.ring_count(), 2);
    }
}
