use super::element::{self, Element};

/// Represents a heavy atom (or an explicit hydrogen that could not be folded into its
/// neighbor) in a molecular graph.
///
/// Hydrogens attached to an atom are stored as a count rather than as separate graph
/// nodes, which keeps the graph small and matches how SMILES implies them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    /// Atomic number of the element.
    pub atomic_number: u8,
    /// Formal charge in elementary charge units.
    pub charge: i8,
    /// Explicit isotope mass number, when written in the input.
    pub isotope: Option<u16>,
    /// Number of hydrogens attached to this atom.
    pub hydrogens: u8,
    /// Whether the atom is part of an aromatic system.
    pub aromatic: bool,
    /// Whether the atom was written in bracket form, which disables implicit hydrogens.
    pub bracketed: bool,
}

impl Atom {
    pub fn new(atomic_number: u8) -> Self {
        Self {
            atomic_number,
            charge: 0,
            isotope: None,
            hydrogens: 0,
            aromatic: false,
            bracketed: false,
        }
    }

    pub fn element(&self) -> Option<&'static Element> {
        element::by_number(self.atomic_number)
    }

    pub fn symbol(&self) -> &'static str {
        self.element().map(|e| e.symbol).unwrap_or("*")
    }

    pub fn is_carbon(&self) -> bool {
        self.atomic_number == 6
    }

    pub fn is_hydrogen(&self) -> bool {
        self.atomic_number == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_atom_is_neutral_and_aliphatic() {
        let atom = Atom::new(7);
        assert_eq!(atom.charge, 0);
        assert_eq!(atom.hydrogens, 0);
        assert!(!atom.aromatic);
        assert!(!atom.bracketed);
        assert_eq!(atom.symbol(), "N");
    }

    #[test]
    fn wildcard_atom_uses_star_symbol() {
        assert_eq!(Atom::new(0).symbol(), "*");
    }
}
