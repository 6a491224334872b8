use crate::core::models::aromaticity;
use crate::core::models::atom::Atom;
use crate::core::models::bond::{Bond, BondOrder};
use crate::core::models::element;
use crate::core::models::kekule;
use crate::core::models::molecule::Molecule;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SmilesError {
    #[error("SMILES string is empty")]
    Empty,

    #[error("Unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },

    #[error("Unknown element '{symbol}' at position {position}")]
    UnknownElement { symbol: String, position: usize },

    #[error("Unterminated bracket atom starting at position {position}")]
    UnterminatedBracket { position: usize },

    #[error("Unbalanced parenthesis at position {position}")]
    UnbalancedParenthesis { position: usize },

    #[error("Empty branch at position {position}")]
    EmptyBranch { position: usize },

    #[error("Bond symbol at position {position} is not followed by an atom")]
    DanglingBond { position: usize },

    #[error("Ring closure {label} was opened but never closed")]
    UnclosedRing { label: u16 },

    #[error("Ring closure {label} at position {position} would bond an atom to itself or duplicate a bond")]
    InvalidRingClosure { label: u16, position: usize },

    #[error("Ring closure {label} specifies conflicting bond orders")]
    ConflictingRingBond { label: u16 },

    #[error("Aromatic atom {index} ({symbol}) is not part of any ring")]
    AromaticOutsideRing { index: usize, symbol: String },

    #[error("Atom {index} ({symbol}) exceeds its maximum allowed valence")]
    ValenceExceeded { index: usize, symbol: String },

    #[error("Cannot kekulize the aromatic system containing atom {index} ({symbol})")]
    NotKekulizable { index: usize, symbol: String },
}

/// Parses a SMILES string into a [`Molecule`].
///
/// Stereochemistry markers are accepted but discarded. Explicit hydrogens that are
/// plain singly-bonded `[H]` atoms are folded into their neighbor's hydrogen count,
/// and Kekulé rings are re-perceived as aromatic where the Hückel rule allows.
/// Reading stops at the first whitespace character, so a trailing title is ignored.
/// `*` is a wildcard atom with atomic number 0.
///
/// # Errors
///
/// Returns a [`SmilesError`] describing the first syntactic or chemical problem found.
pub fn parse(smiles: &str) -> Result<Molecule, SmilesError> {
    if smiles.is_empty() {
        return Err(SmilesError::Empty);
    }

    let mut reader = SmilesReader::new(smiles);
    reader.read()?;
    let SmilesReader {
        mut atoms, bonds, ..
    } = reader;

    assign_implicit_hydrogens(&mut atoms, &bonds)?;
    let (atoms, bonds) = fold_explicit_hydrogens(atoms, bonds);

    let mut molecule = Molecule::new(atoms, bonds);
    aromaticity::perceive(&mut molecule);

    for idx in 0..molecule.atom_count() {
        if molecule.atom(idx).aromatic && !molecule.rings().is_atom_in_ring(idx) {
            return Err(SmilesError::AromaticOutsideRing {
                index: idx,
                symbol: molecule.atom(idx).symbol().to_string(),
            });
        }
    }

    if let Err(index) = kekule::check(&molecule) {
        return Err(SmilesError::NotKekulizable {
            index,
            symbol: molecule.atom(index).symbol().to_string(),
        });
    }

    Ok(molecule)
}

struct PendingBond {
    order: BondOrder,
    position: usize,
}

struct OpenRing {
    atom: usize,
    order: Option<BondOrder>,
}

struct Branch {
    anchor: usize,
    position: usize,
    atoms_at_open: usize,
}

struct SmilesReader<'a> {
    input: &'a [u8],
    pos: usize,
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    open_rings: BTreeMap<u16, OpenRing>,
    branches: Vec<Branch>,
    previous: Option<usize>,
    pending: Option<PendingBond>,
}

impl<'a> SmilesReader<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
            atoms: Vec::new(),
            bonds: Vec::new(),
            open_rings: BTreeMap::new(),
            branches: Vec::new(),
            previous: None,
            pending: None,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn unexpected(&self, position: usize) -> SmilesError {
        let ch = std::str::from_utf8(&self.input[position..])
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or('\u{FFFD}');
        SmilesError::UnexpectedCharacter { ch, position }
    }

    fn read(&mut self) -> Result<(), SmilesError> {
        while let Some(ch) = self.peek() {
            match ch {
                b' ' | b'\t' | b'\r' | b'\n' => break,
                b'(' => {
                    let anchor = self.previous.ok_or_else(|| self.unexpected(self.pos))?;
                    if self.pending.is_some() {
                        return Err(self.unexpected(self.pos));
                    }
                    self.branches.push(Branch {
                        anchor,
                        position: self.pos,
                        atoms_at_open: self.atoms.len(),
                    });
                    self.pos += 1;
                }
                b')' => {
                    let branch = self
                        .branches
                        .pop()
                        .ok_or(SmilesError::UnbalancedParenthesis { position: self.pos })?;
                    if let Some(pending) = &self.pending {
                        return Err(SmilesError::DanglingBond {
                            position: pending.position,
                        });
                    }
                    if self.atoms.len() == branch.atoms_at_open {
                        return Err(SmilesError::EmptyBranch { position: self.pos });
                    }
                    self.previous = Some(branch.anchor);
                    self.pos += 1;
                }
                b'-' | b'=' | b'#' | b':' | b'/' | b'\\' => {
                    if self.previous.is_none() || self.pending.is_some() {
                        return Err(self.unexpected(self.pos));
                    }
                    let order = match ch {
                        b'=' => BondOrder::Double,
                        b'#' => BondOrder::Triple,
                        b':' => BondOrder::Aromatic,
                        _ => BondOrder::Single,
                    };
                    self.pending = Some(PendingBond {
                        order,
                        position: self.pos,
                    });
                    self.pos += 1;
                }
                b'.' => {
                    if let Some(pending) = &self.pending {
                        return Err(SmilesError::DanglingBond {
                            position: pending.position,
                        });
                    }
                    if self.previous.is_none() || !self.branches.is_empty() {
                        return Err(self.unexpected(self.pos));
                    }
                    self.previous = None;
                    self.pos += 1;
                }
                b'%' => {
                    let position = self.pos;
                    let tens = self.peek_at(1).filter(u8::is_ascii_digit);
                    let units = self.peek_at(2).filter(u8::is_ascii_digit);
                    match (tens, units) {
                        (Some(t), Some(u)) => {
                            self.pos += 3;
                            let label = ((t - b'0') * 10 + (u - b'0')) as u16;
                            self.ring_closure(label, position)?;
                        }
                        _ => return Err(self.unexpected(position)),
                    }
                }
                b'0'..=b'9' => {
                    let position = self.pos;
                    self.pos += 1;
                    self.ring_closure((ch - b'0') as u16, position)?;
                }
                b'[' => self.bracket_atom()?,
                _ => self.organic_atom()?,
            }
        }

        if let Some(pending) = &self.pending {
            return Err(SmilesError::DanglingBond {
                position: pending.position,
            });
        }
        if let Some(branch) = self.branches.last() {
            return Err(SmilesError::UnbalancedParenthesis {
                position: branch.position,
            });
        }
        if let Some((&label, _)) = self.open_rings.iter().next() {
            return Err(SmilesError::UnclosedRing { label });
        }
        if self.atoms.is_empty() {
            return Err(SmilesError::Empty);
        }
        Ok(())
    }

    fn organic_atom(&mut self) -> Result<(), SmilesError> {
        let position = self.pos;
        let ch = self.peek().ok_or(SmilesError::Empty)?;
        let (atomic_number, aromatic, width) = match ch {
            b'B' if self.peek_at(1) == Some(b'r') => (35, false, 2),
            b'C' if self.peek_at(1) == Some(b'l') => (17, false, 2),
            b'B' => (5, false, 1),
            b'C' => (6, false, 1),
            b'N' => (7, false, 1),
            b'O' => (8, false, 1),
            b'P' => (15, false, 1),
            b'S' => (16, false, 1),
            b'F' => (9, false, 1),
            b'I' => (53, false, 1),
            b'b' => (5, true, 1),
            b'c' => (6, true, 1),
            b'n' => (7, true, 1),
            b'o' => (8, true, 1),
            b'p' => (15, true, 1),
            b's' => (16, true, 1),
            b'*' => (element::WILDCARD, false, 1),
            _ => return Err(self.unexpected(position)),
        };
        self.pos += width;

        let mut atom = Atom::new(atomic_number);
        atom.aromatic = aromatic;
        self.push_atom(atom)
    }

    fn bracket_atom(&mut self) -> Result<(), SmilesError> {
        let start = self.pos;
        self.pos += 1;

        let isotope = self.read_number().map(|n| n as u16);

        let symbol_start = self.pos;
        let (atomic_number, aromatic) = self.read_bracket_symbol(start)?;

        while self.peek() == Some(b'@') {
            self.pos += 1;
        }
        if let (Some(a), Some(b)) = (self.peek(), self.peek_at(1)) {
            let tag = [a, b];
            if matches!(&tag, b"TH" | b"AL" | b"SP" | b"TB" | b"OH") {
                self.pos += 2;
                self.read_number();
            }
        }

        let mut hydrogens = 0u8;
        if self.peek() == Some(b'H') {
            self.pos += 1;
            hydrogens = self.read_number().map(|n| n.min(u8::MAX as u32) as u8).unwrap_or(1);
        }

        let mut charge: i32 = 0;
        if let Some(sign @ (b'+' | b'-')) = self.peek() {
            let unit = if sign == b'+' { 1 } else { -1 };
            self.pos += 1;
            if let Some(n) = self.read_number() {
                charge = unit * n as i32;
            } else {
                charge = unit;
                while self.peek() == Some(sign) {
                    self.pos += 1;
                    charge += unit;
                }
            }
        }

        if self.peek() == Some(b':') {
            self.pos += 1;
            if self.read_number().is_none() {
                return Err(self.unexpected(self.pos));
            }
        }

        match self.peek() {
            Some(b']') => self.pos += 1,
            Some(_) => return Err(self.unexpected(self.pos)),
            None => return Err(SmilesError::UnterminatedBracket { position: start }),
        }

        let charge = i8::try_from(charge).map_err(|_| self.unexpected(symbol_start))?;
        let mut atom = Atom::new(atomic_number);
        atom.aromatic = aromatic;
        atom.isotope = isotope;
        atom.hydrogens = hydrogens;
        atom.charge = charge;
        atom.bracketed = true;
        self.push_atom(atom)
    }

    fn read_bracket_symbol(&mut self, bracket_start: usize) -> Result<(u8, bool), SmilesError> {
        let position = self.pos;
        let first = self
            .peek()
            .ok_or(SmilesError::UnterminatedBracket { position: bracket_start })?;

        if first == b'*' {
            self.pos += 1;
            return Ok((element::WILDCARD, false));
        }

        if first.is_ascii_uppercase() {
            if let Some(second) = self.peek_at(1).filter(u8::is_ascii_lowercase) {
                let two = [first, second];
                let symbol = std::str::from_utf8(&two).unwrap_or_default();
                if let Some(e) = element::by_symbol(symbol) {
                    self.pos += 2;
                    return Ok((e.atomic_number, false));
                }
            }
            let one = [first];
            let symbol = std::str::from_utf8(&one).unwrap_or_default();
            return match element::by_symbol(symbol) {
                Some(e) => {
                    self.pos += 1;
                    Ok((e.atomic_number, false))
                }
                None => Err(SmilesError::UnknownElement {
                    symbol: symbol.to_string(),
                    position,
                }),
            };
        }

        if first.is_ascii_lowercase() {
            if let Some(second) = self.peek_at(1).filter(u8::is_ascii_lowercase) {
                let two = [first, second];
                let symbol = std::str::from_utf8(&two).unwrap_or_default();
                if let Some(z) = element::aromatic_symbol(symbol) {
                    self.pos += 2;
                    return Ok((z, true));
                }
            }
            let one = [first];
            let symbol = std::str::from_utf8(&one).unwrap_or_default();
            return match element::aromatic_symbol(symbol) {
                Some(z) => {
                    self.pos += 1;
                    Ok((z, true))
                }
                None => Err(SmilesError::UnknownElement {
                    symbol: symbol.to_string(),
                    position,
                }),
            };
        }

        Err(self.unexpected(position))
    }

    fn read_number(&mut self) -> Option<u32> {
        let start = self.pos;
        let mut value: u32 = 0;
        while let Some(d) = self.peek().filter(u8::is_ascii_digit) {
            value = value.saturating_mul(10).saturating_add((d - b'0') as u32);
            self.pos += 1;
        }
        (self.pos > start).then_some(value)
    }

    fn push_atom(&mut self, atom: Atom) -> Result<(), SmilesError> {
        let idx = self.atoms.len();
        self.atoms.push(atom);
        if let Some(prev) = self.previous {
            let order = match self.pending.take() {
                Some(p) => p.order,
                None => self.default_order(prev, idx),
            };
            self.bonds.push(Bond::new(prev, idx, order));
        }
        self.previous = Some(idx);
        Ok(())
    }

    fn default_order(&self, a: usize, b: usize) -> BondOrder {
        if self.atoms[a].aromatic && self.atoms[b].aromatic {
            BondOrder::Aromatic
        } else {
            BondOrder::Single
        }
    }

    fn ring_closure(&mut self, label: u16, position: usize) -> Result<(), SmilesError> {
        let current = self.previous.ok_or_else(|| self.unexpected(position))?;
        let explicit = self.pending.take().map(|p| p.order);

        match self.open_rings.remove(&label) {
            None => {
                self.open_rings.insert(
                    label,
                    OpenRing {
                        atom: current,
                        order: explicit,
                    },
                );
            }
            Some(open) => {
                let duplicate = self.bonds.iter().any(|b| b.contains(open.atom) && b.contains(current));
                if open.atom == current || duplicate {
                    return Err(SmilesError::InvalidRingClosure { label, position });
                }
                let order = match (open.order, explicit) {
                    (Some(a), Some(b)) if a != b => {
                        return Err(SmilesError::ConflictingRingBond { label });
                    }
                    (Some(o), _) | (None, Some(o)) => o,
                    (None, None) => self.default_order(open.atom, current),
                };
                self.bonds.push(Bond::new(open.atom, current, order));
            }
        }
        Ok(())
    }
}

/// Fills in hydrogen counts for organic-subset atoms and checks valences.
fn assign_implicit_hydrogens(atoms: &mut [Atom], bonds: &[Bond]) -> Result<(), SmilesError> {
    let mut explicit_valence = vec![0u32; atoms.len()];
    let mut aromatic_bonds = vec![0u32; atoms.len()];
    for bond in bonds {
        for end in [bond.begin, bond.end] {
            match bond.order {
                BondOrder::Aromatic => aromatic_bonds[end] += 1,
                order => explicit_valence[end] += order.integral_valence() as u32,
            }
        }
    }

    for (idx, atom) in atoms.iter_mut().enumerate() {
        if atom.atomic_number == element::WILDCARD {
            continue;
        }
        let allowed = element::allowed_valences(atom.atomic_number, atom.charge);

        if atom.bracketed {
            if atom.aromatic || allowed.is_empty() {
                continue;
            }
            let total = explicit_valence[idx] + aromatic_bonds[idx] + atom.hydrogens as u32;
            let max = allowed.iter().copied().max().unwrap_or(u8::MAX) as u32;
            if total > max {
                return Err(SmilesError::ValenceExceeded {
                    index: idx,
                    symbol: atom.symbol().to_string(),
                });
            }
            continue;
        }

        match implicit_hydrogen_count(
            atom.atomic_number,
            atom.aromatic,
            explicit_valence[idx],
            aromatic_bonds[idx],
        ) {
            Some(count) => atom.hydrogens = count,
            None => {
                return Err(SmilesError::ValenceExceeded {
                    index: idx,
                    symbol: atom.symbol().to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Hydrogen count an unbracketed organic-subset atom receives from its bonds.
///
/// `explicit_valence` sums the integral orders of non-aromatic bonds. Aromatic atoms
/// reserve one unit of their lowest valence for the pi system; aliphatic atoms are
/// raised to the smallest default valence that fits. `None` means no default fits.
pub(crate) fn implicit_hydrogen_count(
    atomic_number: u8,
    aromatic: bool,
    explicit_valence: u32,
    aromatic_bonds: u32,
) -> Option<u8> {
    let allowed = element::allowed_valences(atomic_number, 0);
    if aromatic {
        let used = explicit_valence + aromatic_bonds + 1;
        let lowest = allowed.first().copied().unwrap_or(0) as u32;
        return Some(lowest.saturating_sub(used) as u8);
    }
    let used = explicit_valence + aromatic_bonds;
    allowed
        .iter()
        .map(|&v| v as u32)
        .find(|&v| v >= used)
        .map(|target| (target - used) as u8)
}

/// Removes plain `[H]` atoms bonded to a single heavy atom, adding them to its count.
fn fold_explicit_hydrogens(mut atoms: Vec<Atom>, bonds: Vec<Bond>) -> (Vec<Atom>, Vec<Bond>) {
    let mut degree = vec![0usize; atoms.len()];
    for bond in &bonds {
        degree[bond.begin] += 1;
        degree[bond.end] += 1;
    }

    let mut removed = vec![false; atoms.len()];
    for bond in &bonds {
        for (h, heavy) in [(bond.begin, bond.end), (bond.end, bond.begin)] {
            let candidate = &atoms[h];
            let foldable = candidate.is_hydrogen()
                && candidate.isotope.is_none()
                && candidate.charge == 0
                && candidate.hydrogens == 0
                && degree[h] == 1
                && bond.order == BondOrder::Single
                && !atoms[heavy].is_hydrogen();
            if foldable && !removed[h] {
                removed[h] = true;
            }
        }
    }

    if !removed.iter().any(|&r| r) {
        return (atoms, bonds);
    }

    for bond in &bonds {
        if removed[bond.begin] {
            atoms[bond.end].hydrogens = atoms[bond.end].hydrogens.saturating_add(1);
        } else if removed[bond.end] {
            atoms[bond.begin].hydrogens = atoms[bond.begin].hydrogens.saturating_add(1);
        }
    }

    let mut remap = vec![usize::MAX; atoms.len()];
    let mut kept = Vec::with_capacity(atoms.len());
    for (idx, atom) in atoms.into_iter().enumerate() {
        if !removed[idx] {
            remap[idx] = kept.len();
            kept.push(atom);
        }
    }
    let bonds = bonds
        .into_iter()
        .filter(|b| !removed[b.begin] && !removed[b.end])
        .map(|b| Bond::new(remap[b.begin], remap[b.end], b.order))
        .collect();
    (kept, bonds)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod accepted_input {
        use super::*;

        #[test]
        fn parses_simple_chain_with_implicit_hydrogens() {
            let mol = parse("CCO").unwrap();
            assert_eq!(mol.atom_count(), 3);
            let hs: Vec<u8> = mol.atoms().iter().map(|a| a.hydrogens).collect();
            assert_eq!(hs, vec![3, 2, 1]);
        }

        #[test]
        fn parses_branches_and_double_bonds() {
            let mol = parse("CC(=O)O").unwrap();
            assert_eq!(mol.atom_count(), 4);
            assert_eq!(mol.bond(1).order, BondOrder::Double);
            assert_eq!(mol.atom(1).hydrogens, 0);
            assert_eq!(mol.atom(3).hydrogens, 1);
        }

        #[test]
        fn parses_two_letter_halogens() {
            let mol = parse("ClCBr").unwrap();
            let numbers: Vec<u8> = mol.atoms().iter().map(|a| a.atomic_number).collect();
            assert_eq!(numbers, vec![17, 6, 35]);
            assert_eq!(mol.atom(1).hydrogens, 2);
        }

        #[test]
        fn parses_bracket_atoms_with_charge_isotope_and_hydrogens() {
            let mol = parse("[13CH3][NH3+]").unwrap();
            assert_eq!(mol.atom(0).isotope, Some(13));
            assert_eq!(mol.atom(0).hydrogens, 3);
            assert_eq!(mol.atom(1).charge, 1);
            assert_eq!(mol.atom(1).hydrogens, 3);

            let mol = parse("[O--]").unwrap();
            assert_eq!(mol.atom(0).charge, -2);
            let mol = parse("[Fe+2]").unwrap();
            assert_eq!(mol.atom(0).charge, 2);
        }

        #[test]
        fn parses_ring_closures_including_percent_labels() {
            let mol = parse("C1CCCCC1").unwrap();
            assert_eq!(mol.bond_count(), 6);
            assert_eq!(mol.rings().ring_count(), 1);

            let mol = parse("C%10CCCCC%10").unwrap();
            assert_eq!(mol.rings().ring_count(), 1);
        }

        #[test]
        fn ring_closure_bond_order_is_honored() {
            let mol = parse("C=1CCCCC1").unwrap();
            let doubles = mol
                .bonds()
                .iter()
                .filter(|b| b.order == BondOrder::Double)
                .count();
            assert_eq!(doubles, 1);
        }

        #[test]
        fn aromatic_hydrogens_follow_ring_position() {
            let mol = parse("c1ccc2ccccc2c1").unwrap();
            let bare = mol.atoms().iter().filter(|a| a.hydrogens == 0).count();
            assert_eq!(bare, 2);
            let pyridine = parse("c1ccncc1").unwrap();
            let n = pyridine.atoms().iter().find(|a| a.atomic_number == 7).unwrap();
            assert_eq!(n.hydrogens, 0);
        }

        #[test]
        fn stereo_markers_are_ignored() {
            let a = parse("F/C=C/F").unwrap();
            let b = parse("FC=CF").unwrap();
            assert_eq!(a.bonds(), b.bonds());
            let c = parse("N[C@@H](C)C(=O)O").unwrap();
            assert_eq!(c.atom(1).hydrogens, 1);
        }

        #[test]
        fn explicit_hydrogens_are_folded() {
            let mol = parse("[H]C([H])([H])[H]").unwrap();
            assert_eq!(mol.atom_count(), 1);
            assert_eq!(mol.atom(0).hydrogens, 4);

            let deuterated = parse("[2H]C").unwrap();
            assert_eq!(deuterated.atom_count(), 2);
        }

        #[test]
        fn wildcard_atoms_take_no_hydrogens() {
            let mol = parse("*CC(=O)O").unwrap();
            assert_eq!(mol.atom(0).atomic_number, element::WILDCARD);
            assert_eq!(mol.atom(0).hydrogens, 0);
            assert_eq!(mol.atom(1).hydrogens, 2);

            let bracketed = parse("[*]C").unwrap();
            assert_eq!(bracketed.atom(0).atomic_number, element::WILDCARD);
            assert_eq!(bracketed.atom(1).hydrogens, 3);
        }

        #[test]
        fn whitespace_ends_the_structure() {
            let titled = parse("CCO ethanol").unwrap();
            assert_eq!(titled.atom_count(), 3);
            assert_eq!(parse("C\t C").unwrap().atom_count(), 1);
            assert_eq!(parse("c1ccccc1\n").unwrap().atom_count(), 6);
        }

        #[test]
        fn kekulizable_aromatic_systems_are_accepted() {
            for smiles in [
                "c1ccccc1",
                "c1ccncc1",
                "c1cc[nH]c1",
                "c1ccoc1",
                "c1ccsc1",
                "c1ccc2ccccc2c1",
                "c1ccc2cccc2cc1",
                "c1ccc2c(c1)[nH]c1ccccc12",
                "O=c1cccc[nH]1",
                "c1cc[n+](C)cc1",
                "Cn1cnc2c1c(=O)n(C)c(=O)n2C",
            ] {
                assert!(parse(smiles).is_ok(), "rejected {smiles}");
            }
        }

        #[test]
        fn dot_separates_fragments() {
            let mol = parse("[Na+].[Cl-]").unwrap();
            assert_eq!(mol.atom_count(), 2);
            assert_eq!(mol.bond_count(), 0);
        }
    }

    mod rejected_input {
        use super::*;

        #[test]
        fn rejects_empty_input() {
            assert_eq!(parse(""), Err(SmilesError::Empty));
        }

        #[test]
        fn rejects_unknown_characters() {
            assert!(matches!(
                parse("INVALID_SMILES_123"),
                Err(SmilesError::UnexpectedCharacter { .. })
            ));
            assert!(matches!(
                parse("INVALID"),
                Err(SmilesError::UnexpectedCharacter { ch: 'V', .. })
            ));
            assert!(matches!(
                parse("C$C"),
                Err(SmilesError::UnexpectedCharacter { ch: '$', .. })
            ));
        }

        #[test]
        fn rejects_unknown_bracket_elements() {
            assert!(matches!(
                parse("[Xx]"),
                Err(SmilesError::UnknownElement { .. })
            ));
        }

        #[test]
        fn rejects_unbalanced_structure() {
            assert!(matches!(
                parse("CC(C"),
                Err(SmilesError::UnbalancedParenthesis { .. })
            ));
            assert!(matches!(
                parse("CC)C"),
                Err(SmilesError::UnbalancedParenthesis { .. })
            ));
            assert!(matches!(parse("CC()C"), Err(SmilesError::EmptyBranch { .. })));
            assert!(matches!(parse("C1CC"), Err(SmilesError::UnclosedRing { label: 1 })));
            assert!(matches!(
                parse("INVALID[ SMILES"),
                Err(SmilesError::UnexpectedCharacter { .. })
            ));
            assert!(matches!(
                parse("C[CH3"),
                Err(SmilesError::UnterminatedBracket { .. })
            ));
        }

        #[test]
        fn rejects_dangling_bonds() {
            assert!(matches!(parse("CC="), Err(SmilesError::DanglingBond { .. })));
            assert!(matches!(parse("=CC"), Err(SmilesError::UnexpectedCharacter { .. })));
        }

        #[test]
        fn rejects_bad_ring_closures() {
            assert!(matches!(
                parse("C11"),
                Err(SmilesError::InvalidRingClosure { .. })
            ));
            assert!(matches!(
                parse("C=1CCCCC#1"),
                Err(SmilesError::ConflictingRingBond { .. })
            ));
        }

        #[test]
        fn rejects_hypervalent_carbon() {
            assert!(matches!(
                parse("CC(C)(C)(C)C"),
                Err(SmilesError::ValenceExceeded { .. })
            ));
        }

        #[test]
        fn rejects_aromatic_rings_without_a_kekule_form() {
            assert!(matches!(
                parse("c1cccc1"),
                Err(SmilesError::NotKekulizable { .. })
            ));
            assert!(matches!(
                parse("c1ccnc1"),
                Err(SmilesError::NotKekulizable { .. })
            ));
            assert!(matches!(
                parse("c1ccc2cccc2c1"),
                Err(SmilesError::NotKekulizable { .. })
            ));
        }

        #[test]
        fn leading_whitespace_leaves_nothing_to_read() {
            assert_eq!(parse(" C"), Err(SmilesError::Empty));
        }

        #[test]
        fn rejects_aromatic_atoms_outside_rings() {
            assert!(matches!(
                parse("cc"),
                Err(SmilesError::AromaticOutsideRing { .. })
            ));
        }
    }
}
