//! SMILES parsing into a [`Molecule`].
//!
//! Supports the organic subset and bracket atoms (isotope, chirality marks,
//! hydrogen count, charge, atom class), branches, ring closures including
//! `%nn`, explicit bonds (`- = # $ : / \`), aromatic lowercase atoms and
//! disconnected components. Stereo marks are accepted and ignored.

use std::collections::HashMap;
use std::iter::Peekable;
use std::str::CharIndices;

use ppiscreen_common::{PpiScreenError, Result};

use crate::element::{Element, WILDCARD};
use crate::molecule::{Atom, Bond, BondOrder, Molecule};

const MAX_BRACKET_HYDROGENS: u8 = 8;
const MAX_FORMAL_CHARGE: i8 = 15;

/// Parse a SMILES string into a molecular graph with implicit hydrogens filled.
///
/// # Errors
///
/// Returns `PpiScreenError::Parse` for empty input, unknown elements,
/// unbalanced branches, unclosed ring bonds, dangling bonds and conflicting
/// ring-closure bond orders, and for bracket atoms whose isotope, hydrogen
/// count or charge is out of range.
pub fn parse_smiles(smiles: &str) -> Result<Molecule> {
    let text = smiles.trim();
    if text.is_empty() {
        return Err(PpiScreenError::parse("empty SMILES"));
    }

    let mut parser = Parser::new(text);
    parser.run()?;
    let mut mol = Molecule::new(parser.atoms, parser.bonds);
    mol.assign_implicit_hydrogens();
    Ok(mol)
}

struct OpenRing {
    atom: usize,
    order: Option<BondOrder>,
}

struct Parser<'a> {
    text: &'a str,
    chars: Peekable<CharIndices<'a>>,
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    current: Option<usize>,
    pending_bond: Option<BondOrder>,
    branches: Vec<Option<usize>>,
    rings: HashMap<u32, OpenRing>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            chars: text.char_indices().peekable(),
            atoms: Vec::new(),
            bonds: Vec::new(),
            current: None,
            pending_bond: None,
            branches: Vec::new(),
            rings: HashMap::new(),
        }
    }

    fn error(&self, pos: usize, msg: &str) -> PpiScreenError {
        PpiScreenError::parse(format!("{msg} at position {pos} in '{}'", self.text))
    }

    fn run(&mut self) -> Result<()> {
        while let Some(&(pos, ch)) = self.chars.peek() {
            match ch {
                '-' | '=' | '#' | '$' | ':' | '/' | '\\' => {
                    self.chars.next();
                    if self.pending_bond.is_some() {
                        return Err(self.error(pos, "consecutive bond symbols"));
                    }
                    if self.current.is_none() {
                        return Err(self.error(pos, "bond without a preceding atom"));
                    }
                    self.pending_bond = Some(match ch {
                        '=' => BondOrder::Double,
                        '#' => BondOrder::Triple,
                        '$' => BondOrder::Quadruple,
                        ':' => BondOrder::Aromatic,
                        _ => BondOrder::Single,
                    });
                }
                '(' => {
                    self.chars.next();
                    if self.current.is_none() {
                        return Err(self.error(pos, "branch without a preceding atom"));
                    }
                    self.branches.push(self.current);
                }
                ')' => {
                    self.chars.next();
                    if self.pending_bond.is_some() {
                        return Err(self.error(pos, "dangling bond before ')'"));
                    }
                    let prev = self
                        .branches
                        .pop()
                        .ok_or_else(|| self.error(pos, "unmatched ')'"))?;
                    self.current = prev;
                }
                '.' => {
                    self.chars.next();
                    if self.pending_bond.is_some() {
                        return Err(self.error(pos, "dangling bond before '.'"));
                    }
                    self.current = None;
                }
                '0'..='9' | '%' => {
                    let ring = self.ring_number(pos)?;
                    self.ring_closure(pos, ring)?;
                }
                '[' => {
                    self.chars.next();
                    let atom = self.bracket_atom(pos)?;
                    self.push_atom(atom);
                }
                '*' => {
                    self.chars.next();
                    self.push_atom(plain_atom(WILDCARD, false));
                }
                c if c.is_ascii_alphabetic() => {
                    let atom = self.organic_atom(pos)?;
                    self.push_atom(atom);
                }
                _ => return Err(self.error(pos, &format!("unexpected character '{ch}'"))),
            }
        }

        let end = self.text.len();
        if self.pending_bond.is_some() {
            return Err(self.error(end, "dangling bond at end of input"));
        }
        if !self.branches.is_empty() {
            return Err(self.error(end, "unclosed branch"));
        }
        if let Some(ring) = self.rings.keys().min() {
            return Err(self.error(end, &format!("unclosed ring bond {ring}")));
        }
        Ok(())
    }

    fn push_atom(&mut self, atom: Atom) {
        let idx = self.atoms.len();
        let aromatic = atom.aromatic;
        self.atoms.push(atom);
        if let Some(prev) = self.current {
            let order = self
                .pending_bond
                .take()
                .unwrap_or_else(|| implicit_order(self.atoms[prev].aromatic, aromatic));
            self.bonds.push(Bond { atom1: prev, atom2: idx, order });
        }
        self.current = Some(idx);
    }

    fn ring_number(&mut self, pos: usize) -> Result<u32> {
        let Some((_, ch)) = self.chars.next() else {
            return Err(self.error(pos, "expected ring number"));
        };
        if ch != '%' {
            return Ok(ch.to_digit(10).unwrap_or_default());
        }
        let mut digits = String::new();
        for _ in 0..2 {
            match self.chars.next() {
                Some((_, d)) if d.is_ascii_digit() => digits.push(d),
                _ => return Err(self.error(pos, "'%' must be followed by two digits")),
            }
        }
        digits.parse().map_err(|_| self.error(pos, "bad ring number"))
    }

    fn ring_closure(&mut self, pos: usize, ring: u32) -> Result<()> {
        let Some(current) = self.current else {
            return Err(self.error(pos, "ring bond without a preceding atom"));
        };
        let order = self.pending_bond.take();

        let Some(open) = self.rings.remove(&ring) else {
            self.rings.insert(ring, OpenRing { atom: current, order });
            return Ok(());
        };

        if open.atom == current {
            return Err(self.error(pos, &format!("ring bond {ring} closes on its own atom")));
        }
        if self.bonds.iter().any(|b| {
            (b.atom1 == open.atom && b.atom2 == current) || (b.atom1 == current && b.atom2 == open.atom)
        }) {
            return Err(self.error(pos, &format!("ring bond {ring} duplicates an existing bond")));
        }
        let order = match (open.order, order) {
            (Some(a), Some(b)) if a != b => {
                return Err(self.error(pos, &format!("conflicting bond orders on ring bond {ring}")));
            }
            (Some(a), _) | (None, Some(a)) => a,
            (None, None) => implicit_order(self.atoms[open.atom].aromatic, self.atoms[current].aromatic),
        };
        self.bonds.push(Bond { atom1: open.atom, atom2: current, order });
        Ok(())
    }

    fn organic_atom(&mut self, pos: usize) -> Result<Atom> {
        let Some((_, first)) = self.chars.next() else {
            return Err(self.error(pos, "expected atom"));
        };

        if first.is_ascii_lowercase() {
            let symbol = first.to_ascii_uppercase().to_string();
            if !matches!(first, 'b' | 'c' | 'n' | 'o' | 'p' | 's') {
                return Err(self.error(pos, &format!("unknown aromatic atom '{first}'")));
            }
            let element = lookup(&symbol).ok_or_else(|| self.error(pos, "unknown element"))?;
            return Ok(plain_atom(element.atomic_number, true));
        }

        // Two-letter organic-subset symbols: Cl, Br.
        if let Some(&(_, second)) = self.chars.peek() {
            let pair: String = [first, second].iter().collect();
            if Element::is_organic_subset(&pair) {
                self.chars.next();
                let element = lookup(&pair).ok_or_else(|| self.error(pos, "unknown element"))?;
                return Ok(plain_atom(element.atomic_number, false));
            }
        }

        let symbol = first.to_string();
        if !Element::is_organic_subset(&symbol) {
            return Err(self.error(pos, &format!("'{symbol}' must be written in brackets")));
        }
        let element = lookup(&symbol).ok_or_else(|| self.error(pos, "unknown element"))?;
        Ok(plain_atom(element.atomic_number, false))
    }

    fn bracket_atom(&mut self, pos: usize) -> Result<Atom> {
        let isotope = match self.read_number() {
            Some(n) => Some(u16::try_from(n).map_err(|_| self.error(pos, "isotope out of range"))?),
            None => None,
        };

        let (atomic_number, aromatic) = self.bracket_symbol(pos)?;

        // Chirality: @, @@, @TH1, @SP2, @OH12 ...
        let mut chiral = false;
        while matches!(self.chars.peek(), Some(&(_, '@'))) {
            self.chars.next();
            chiral = true;
        }
        if chiral && matches!(self.chars.peek(), Some(&(_, c)) if c.is_ascii_uppercase() && c != 'H') {
            self.chars.next();
            if matches!(self.chars.peek(), Some(&(_, c)) if c.is_ascii_uppercase()) {
                self.chars.next();
            }
            self.read_number();
        }

        let mut hydrogens = 0u8;
        if matches!(self.chars.peek(), Some(&(_, 'H'))) {
            self.chars.next();
            let count = self.read_number().unwrap_or(1);
            hydrogens = u8::try_from(count)
                .ok()
                .filter(|&h| h <= MAX_BRACKET_HYDROGENS)
                .ok_or_else(|| self.error(pos, "hydrogen count out of range"))?;
        }

        let mut formal_charge: i8 = 0;
        if let Some(&(_, sign @ ('+' | '-'))) = self.chars.peek() {
            self.chars.next();
            let mut magnitude: u32 = 1;
            if let Some(n) = self.read_number() {
                magnitude = n;
            } else {
                while matches!(self.chars.peek(), Some(&(_, c)) if c == sign) {
                    self.chars.next();
                    magnitude = magnitude.saturating_add(1);
                }
            }
            let magnitude = i8::try_from(magnitude)
                .ok()
                .filter(|&m| m <= MAX_FORMAL_CHARGE)
                .ok_or_else(|| self.error(pos, "formal charge out of range"))?;
            formal_charge = if sign == '+' { magnitude } else { -magnitude };
        }

        if matches!(self.chars.peek(), Some(&(_, ':'))) {
            self.chars.next();
            if self.read_number().is_none() {
                return Err(self.error(pos, "atom class ':' without a number"));
            }
        }

        match self.chars.next() {
            Some((_, ']')) => {}
            _ => return Err(self.error(pos, "unterminated bracket atom")),
        }

        Ok(Atom {
            atomic_number,
            aromatic,
            formal_charge,
            isotope,
            hydrogens,
            bracket: true,
        })
    }

    fn bracket_symbol(&mut self, pos: usize) -> Result<(u8, bool)> {
        let Some((_, first)) = self.chars.next() else {
            return Err(self.error(pos, "empty bracket atom"));
        };
        if first == '*' {
            return Ok((WILDCARD, false));
        }
        if !first.is_ascii_alphabetic() {
            return Err(self.error(pos, &format!("unexpected '{first}' in bracket atom")));
        }

        let aromatic = first.is_ascii_lowercase();
        let upper = first.to_ascii_uppercase();

        // Prefer the two-letter symbol when it exists (Cl, Se, se, As, as ...).
        if let Some(&(_, second)) = self.chars.peek() {
            if second.is_ascii_lowercase() {
                let pair: String = [upper, second].iter().collect();
                if let Some(element) = lookup(&pair) {
                    if !aromatic || Element::can_be_aromatic(&pair) {
                        self.chars.next();
                        return Ok((element.atomic_number, aromatic));
                    }
                }
            }
        }

        let symbol = upper.to_string();
        let element = lookup(&symbol)
            .ok_or_else(|| self.error(pos, &format!("unknown element '{first}'")))?;
        if aromatic && !Element::can_be_aromatic(&symbol) {
            return Err(self.error(pos, &format!("'{first}' cannot be aromatic")));
        }
        Ok((element.atomic_number, aromatic))
    }

    fn read_number(&mut self) -> Option<u32> {
        let mut value: Option<u32> = None;
        while let Some(&(_, c)) = self.chars.peek() {
            let Some(d) = c.to_digit(10) else { break };
            self.chars.next();
            value = Some(value.unwrap_or(0).saturating_mul(10).saturating_add(d));
        }
        value
    }
}

fn lookup(symbol: &str) -> Option<&'static Element> {
    Element::by_symbol(symbol)
}

fn plain_atom(atomic_number: u8, aromatic: bool) -> Atom {
    Atom {
        atomic_number,
        aromatic,
        formal_charge: 0,
        isotope: None,
        hydrogens: 0,
        bracket: false,
    }
}

fn implicit_order(a_aromatic: bool, b_aromatic: bool) -> BondOrder {
    if a_aromatic && b_aromatic {
        BondOrder::Aromatic
    } else {
        BondOrder::Single
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ethanol() {
        let mol = parse_smiles("CCO").unwrap();
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.bond_count(), 2);
        assert_eq!(mol.total_hydrogen_count(), 6);
    }

    #[test]
    fn test_benzene_is_aromatic_ring() {
        let mol = parse_smiles("c1ccccc1").unwrap();
        assert_eq!(mol.atom_count(), 6);
        assert_eq!(mol.bond_count(), 6);
        assert!(mol.bonds.iter().all(|b| b.order == BondOrder::Aromatic));
        assert!(mol.atoms.iter().all(|a| a.hydrogens == 1));
        assert_eq!(mol.ring_count(), 1);
    }

    #[test]
    fn test_pyridine_nitrogen_has_no_hydrogen() {
        let mol = parse_smiles("n1ccccc1").unwrap();
        assert_eq!(mol.atoms[0].atomic_number, 7);
        assert_eq!(mol.atoms[0].hydrogens, 0);
    }

    #[test]
    fn test_bracket_atoms() {
        let mol = parse_smiles("[NH4+].[Cl-]").unwrap();
        assert_eq!(mol.atoms[0].hydrogens, 4);
        assert_eq!(mol.atoms[0].formal_charge, 1);
        assert_eq!(mol.atoms[1].atomic_number, 17);
        assert_eq!(mol.atoms[1].formal_charge, -1);
        assert_eq!(mol.component_count(), 2);
    }

    #[test]
    fn test_isotope_and_chirality() {
        let mol = parse_smiles("[13CH3][C@@H](N)C(=O)O").unwrap();
        assert_eq!(mol.atoms[0].isotope, Some(13));
        assert_eq!(mol.atoms[1].hydrogens, 1);
        assert_eq!(mol.atom_count(), 6);
    }

    #[test]
    fn test_two_letter_halogens() {
        let mol = parse_smiles("ClCBr").unwrap();
        let numbers: Vec<u8> = mol.atoms.iter().map(|a| a.atomic_number).collect();
        assert_eq!(numbers, vec![17, 6, 35]);
    }

    #[test]
    fn test_percent_ring_closure() {
        let mol = parse_smiles("C%10CCCCC%10").unwrap();
        assert_eq!(mol.ring_count(), 1);
    }

    #[test]
    fn test_explicit_ring_bond_order() {
        let mol = parse_smiles("C=1CCCCC=1").unwrap();
        let closing = mol.bonds.last().unwrap();
        assert_eq!(closing.order, BondOrder::Double);
    }

    #[test]
    fn test_conflicting_ring_bond_orders() {
        assert!(matches!(parse_smiles("C=1CCCCC#1"), Err(PpiScreenError::Parse(_))));
    }

    #[test]
    fn test_malformed_inputs() {
        let long_cation = format!("[C{}]", "+".repeat(200));
        for bad in [
            "", "C(C", "CC)", "C1CC", "C=", "C==C", "Xx", "[C", "c1ccxcc1", "(C)", "C.=C",
            "[C-128]", "[C+16]", long_cation.as_str(), "[CH300]", "[CH9]", "[70000C]",
        ] {
            assert!(
                matches!(parse_smiles(bad), Err(PpiScreenError::Parse(_))),
                "expected parse error for {bad:?}"
            );
        }
    }

    #[test]
    fn test_bracket_counts_within_range() {
        let mol = parse_smiles("[13CH4]").unwrap();
        assert_eq!(mol.atoms[0].isotope, Some(13));
        assert_eq!(mol.atoms[0].hydrogens, 4);
        assert_eq!(parse_smiles("[Fe+++]").unwrap().atoms[0].formal_charge, 3);
        assert_eq!(parse_smiles("[O-2]").unwrap().atoms[0].formal_charge, -2);
    }

    #[test]
    fn test_unbracketed_metal_rejected() {
        assert!(parse_smiles("[Na+].[O-]C(=O)C").is_ok());
        assert!(parse_smiles("NaCl").is_err());
    }
}
