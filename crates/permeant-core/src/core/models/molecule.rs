use super::atom::Atom;
use super::bond::{Bond, BondOrder};
use super::element;
use super::rings::RingInfo;
use std::collections::BTreeMap;

/// An immutable molecular graph with hydrogens folded into atom counts.
///
/// Instances are produced by the SMILES reader and then only read by downstream
/// code (descriptors, fingerprints, substructure search). Ring perception is done
/// once at construction time.
#[derive(Debug, Clone, PartialEq)]
pub struct Molecule {
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    adjacency: Vec<Vec<(usize, usize)>>,
    rings: RingInfo,
}

impl Molecule {
    pub(crate) fn new(atoms: Vec<Atom>, bonds: Vec<Bond>) -> Self {
        let mut adjacency = vec![Vec::new(); atoms.len()];
        for (idx, bond) in bonds.iter().enumerate() {
            adjacency[bond.begin].push((bond.end, idx));
            adjacency[bond.end].push((bond.begin, idx));
        }
        let rings = RingInfo::perceive(atoms.len(), &bonds, &adjacency);
        Self {
            atoms,
            bonds,
            adjacency,
            rings,
        }
    }

    pub(crate) fn atom_mut(&mut self, idx: usize) -> &mut Atom {
        &mut self.atoms[idx]
    }

    pub(crate) fn set_bond_order(&mut self, idx: usize, order: BondOrder) {
        self.bonds[idx].order = order;
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn atom(&self, idx: usize) -> &Atom {
        &self.atoms[idx]
    }

    pub fn bond(&self, idx: usize) -> &Bond {
        &self.bonds[idx]
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Neighbors of an atom as `(neighbor_index, bond_index)` pairs.
    pub fn neighbors(&self, idx: usize) -> &[(usize, usize)] {
        &self.adjacency[idx]
    }

    pub fn bond_between(&self, a: usize, b: usize) -> Option<usize> {
        self.adjacency[a]
            .iter()
            .find(|&&(n, _)| n == b)
            .map(|&(_, bond)| bond)
    }

    pub fn rings(&self) -> &RingInfo {
        &self.rings
    }

    /// Number of explicit graph neighbors (heavy atoms and unfolded hydrogens).
    pub fn degree(&self, idx: usize) -> usize {
        self.adjacency[idx].len()
    }

    /// Number of non-hydrogen neighbors.
    pub fn heavy_degree(&self, idx: usize) -> usize {
        self.adjacency[idx]
            .iter()
            .filter(|&&(n, _)| !self.atoms[n].is_hydrogen())
            .count()
    }

    /// Hydrogens attached to the atom, whether folded or explicit graph nodes.
    pub fn total_hydrogens(&self, idx: usize) -> usize {
        let explicit = self.adjacency[idx]
            .iter()
            .filter(|&&(n, _)| self.atoms[n].is_hydrogen())
            .count();
        self.atoms[idx].hydrogens as usize + explicit
    }

    /// Total connectivity: explicit neighbors plus folded hydrogens.
    pub fn total_degree(&self, idx: usize) -> usize {
        self.degree(idx) + self.atoms[idx].hydrogens as usize
    }

    /// Sum of bond valences with aromatic bonds counted as 1.5, excluding hydrogens.
    pub fn bond_valence(&self, idx: usize) -> f64 {
        self.adjacency[idx]
            .iter()
            .map(|&(_, b)| self.bonds[b].order.valence_contribution())
            .sum()
    }

    /// Integer valence of the atom including attached hydrogens.
    ///
    /// Aromatic atoms are assigned the valence of a Kekulé form: one extra pi bond
    /// is credited when the element's allowed valences call for it, so benzene
    /// carbons report 4, pyridine nitrogen 3 and pyrrole nitrogen 3.
    pub fn valence(&self, idx: usize) -> u8 {
        let atom = &self.atoms[idx];
        let mut base = atom.hydrogens as u32;
        let mut aromatic_bonds = 0u32;
        for &(_, b) in &self.adjacency[idx] {
            match self.bonds[b].order {
                BondOrder::Aromatic => aromatic_bonds += 1,
                order => base += order.integral_valence() as u32,
            }
        }
        base += aromatic_bonds;
        if atom.aromatic && aromatic_bonds >= 2 {
            let allowed = element::allowed_valences(atom.atomic_number, atom.charge);
            if allowed.iter().any(|&v| v as u32 == base + 1) {
                base += 1;
            }
        }
        u8::try_from(base).unwrap_or(u8::MAX)
    }

    pub fn has_bond_of_order(&self, idx: usize, order: BondOrder) -> bool {
        self.adjacency[idx]
            .iter()
            .any(|&(_, b)| self.bonds[b].order == order)
    }

    pub fn heavy_atom_count(&self) -> usize {
        self.atoms.iter().filter(|a| !a.is_hydrogen()).count()
    }

    pub fn formal_charge(&self) -> i32 {
        self.atoms.iter().map(|a| a.charge as i32).sum()
    }

    /// Element counts including folded hydrogens, keyed by atomic number.
    pub fn element_counts(&self) -> BTreeMap<u8, usize> {
        let mut counts = BTreeMap::new();
        for atom in &self.atoms {
            *counts.entry(atom.atomic_number).or_insert(0) += 1;
            if atom.hydrogens > 0 {
                *counts.entry(1).or_insert(0) += atom.hydrogens as usize;
            }
        }
        counts
    }

    /// Canonical SMILES string, identical for every spelling of the same structure.
    pub fn canonical_smiles(&self) -> String {
        crate::core::io::smiles::write_canonical(self)
    }
}
