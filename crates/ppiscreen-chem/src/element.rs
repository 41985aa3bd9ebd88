//! Periodic-table subset needed for drug-like molecules.

/// Static element data.
#[derive(Debug, PartialEq)]
pub struct Element {
    pub symbol: &'static str,
    pub atomic_number: u8,
    /// Standard atomic weight (g/mol)
    pub mass: f64,
    /// Allowed valences for implicit-hydrogen filling, ascending
    pub default_valences: &'static [u8],
}

/// Atomic number used for the `*` wildcard atom.
pub const WILDCARD: u8 = 0;

static ELEMENTS: &[Element] = &[
    Element { symbol: "*",  atomic_number: 0,  mass: 0.0,     default_valences: &[] },
    Element { symbol: "H",  atomic_number: 1,  mass: 1.008,   default_valences: &[1] },
    Element { symbol: "Li", atomic_number: 3,  mass: 6.94,    default_valences: &[1] },
    Element { symbol: "B",  atomic_number: 5,  mass: 10.81,   default_valences: &[3] },
    Element { symbol: "C",  atomic_number: 6,  mass: 12.011,  default_valences: &[4] },
    Element { symbol: "N",  atomic_number: 7,  mass: 14.007,  default_valences: &[3, 5] },
    Element { symbol: "O",  atomic_number: 8,  mass: 15.999,  default_valences: &[2] },
    Element { symbol: "F",  atomic_number: 9,  mass: 18.998,  default_valences: &[1] },
    Element { symbol: "Na", atomic_number: 11, mass: 22.990,  default_valences: &[1] },
    Element { symbol: "Mg", atomic_number: 12, mass: 24.305,  default_valences: &[2] },
    Element { symbol: "Al", atomic_number: 13, mass: 26.982,  default_valences: &[3] },
    Element { symbol: "Si", atomic_number: 14, mass: 28.085,  default_valences: &[4] },
    Element { symbol: "P",  atomic_number: 15, mass: 30.974,  default_valences: &[3, 5] },
    Element { symbol: "S",  atomic_number: 16, mass: 32.06,   default_valences: &[2, 4, 6] },
    Element { symbol: "Cl", atomic_number: 17, mass: 35.45,   default_valences: &[1] },
    Element { symbol: "K",  atomic_number: 19, mass: 39.098,  default_valences: &[1] },
    Element { symbol: "Ca", atomic_number: 20, mass: 40.078,  default_valences: &[2] },
    Element { symbol: "Mn", atomic_number: 25, mass: 54.938,  default_valences: &[] },
    Element { symbol: "Fe", atomic_number: 26, mass: 55.845,  default_valences: &[] },
    Element { symbol: "Co", atomic_number: 27, mass: 58.933,  default_valences: &[] },
    Element { symbol: "Ni", atomic_number: 28, mass: 58.693,  default_valences: &[] },
    Element { symbol: "Cu", atomic_number: 29, mass: 63.546,  default_valences: &[] },
    Element { symbol: "Zn", atomic_number: 30, mass: 65.38,   default_valences: &[] },
    Element { symbol: "As", atomic_number: 33, mass: 74.922,  default_valences: &[3, 5] },
    Element { symbol: "Se", atomic_number: 34, mass: 78.971,  default_valences: &[2, 4, 6] },
    Element { symbol: "Br", atomic_number: 35, mass: 79.904,  default_valences: &[1] },
    Element { symbol: "Ag", atomic_number: 47, mass: 107.868, default_valences: &[] },
    Element { symbol: "Sn", atomic_number: 50, mass: 118.71,  default_valences: &[] },
    Element { symbol: "Te", atomic_number: 52, mass: 127.60,  default_valences: &[2, 4, 6] },
    Element { symbol: "I",  atomic_number: 53, mass: 126.904, default_valences: &[1] },
    Element { symbol: "Pt", atomic_number: 78, mass: 195.084, default_valences: &[] },
    Element { symbol: "Au", atomic_number: 79, mass: 196.967, default_valences: &[] },
    Element { symbol: "Hg", atomic_number: 80, mass: 200.592, default_valences: &[] },
];

impl Element {
    /// Case-sensitive lookup by symbol ("Cl", not "CL").
    pub fn by_symbol(symbol: &str) -> Option<&'static Element> {
        ELEMENTS.iter().find(|e| e.symbol == symbol)
    }

    pub fn by_number(atomic_number: u8) -> Option<&'static Element> {
        ELEMENTS.iter().find(|e| e.atomic_number == atomic_number)
    }

    /// Members of the SMILES organic subset may appear without brackets.
    pub fn is_organic_subset(symbol: &str) -> bool {
        matches!(symbol, "B" | "C" | "N" | "O" | "P" | "S" | "F" | "Cl" | "Br" | "I")
    }

    /// Elements allowed to be written in lowercase (aromatic) form.
    pub fn can_be_aromatic(symbol: &str) -> bool {
        matches!(symbol, "B" | "C" | "N" | "O" | "P" | "S" | "As" | "Se" | "Te")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert_eq!(Element::by_symbol("Cl").map(|e| e.atomic_number), Some(17));
        assert!(Element::by_symbol("CL").is_none());
    }

    #[test]
    fn test_lookup_by_number() {
        assert_eq!(Element::by_number(8).map(|e| e.symbol), Some("O"));
        assert!(Element::by_number(118).is_none());
    }
}
