use super::parser::{self, SmartsError};
use std::fmt;
use std::str::FromStr;

/// A single atom test in a SMARTS query.
#[derive(Debug, Clone, PartialEq)]
pub enum AtomPrimitive {
    /// `*`, and stereo markers, which are accepted but not checked.
    Any,
    /// `a`
    Aromatic,
    /// `A`
    Aliphatic,
    /// `#n`, regardless of aromaticity.
    AtomicNumber(u8),
    /// Upper-case element symbol such as `C` or `Cl`.
    AliphaticElement(u8),
    /// Lower-case element symbol such as `c` or `n`.
    AromaticElement(u8),
    /// `Hn`, total attached hydrogens.
    TotalHydrogens(u8),
    /// `hn`, hydrogens that are not explicit graph nodes.
    ImplicitHydrogens(u8),
    /// `Dn`, explicit connections.
    Degree(u8),
    /// `Xn`, total connections including hydrogens.
    Connectivity(u8),
    /// `vn`, total bond order including hydrogens.
    Valence(u8),
    /// `R` (any ring) or `Rn` (member of exactly `n` smallest rings).
    RingMembership(Option<u8>),
    /// `r` (any ring) or `rn` (member of a smallest ring of size `n`).
    RingSize(Option<u8>),
    /// `x` (any ring bond) or `xn` (exactly `n` ring bonds).
    RingConnectivity(Option<u8>),
    /// `+n` / `-n`
    Charge(i8),
    /// Leading mass number inside a bracket.
    Isotope(u16),
    /// `$(...)`, true when the nested pattern matches rooted at this atom.
    Recursive(Box<SmartsPattern>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AtomExpr {
    Primitive(AtomPrimitive),
    Not(Box<AtomExpr>),
    And(Vec<AtomExpr>),
    Or(Vec<AtomExpr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondPrimitive {
    Single,
    Double,
    Triple,
    Aromatic,
    Any,
    Ring,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BondExpr {
    /// No bond symbol was written; matches single or aromatic bonds.
    Implicit,
    Primitive(BondPrimitive),
    Not(Box<BondExpr>),
    And(Vec<BondExpr>),
    Or(Vec<BondExpr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternBond {
    pub begin: usize,
    pub end: usize,
    pub expr: BondExpr,
}

/// A compiled SMARTS query.
///
/// Atom 0 is the root used for recursive (`$()`) evaluation and for
/// [`SmartsPattern::matching_atoms`].
#[derive(Debug, Clone, PartialEq)]
pub struct SmartsPattern {
    source: String,
    atoms: Vec<AtomExpr>,
    bonds: Vec<PatternBond>,
    adjacency: Vec<Vec<(usize, usize)>>,
    search_order: Vec<usize>,
}

impl SmartsPattern {
    pub(super) fn new(source: String, atoms: Vec<AtomExpr>, bonds: Vec<PatternBond>) -> Self {
        let mut adjacency = vec![Vec::new(); atoms.len()];
        for (idx, bond) in bonds.iter().enumerate() {
            adjacency[bond.begin].push((bond.end, idx));
            adjacency[bond.end].push((bond.begin, idx));
        }
        let search_order = breadth_first_order(&adjacency);
        Self {
            source,
            atoms,
            bonds,
            adjacency,
            search_order,
        }
    }

    /// Compiles a SMARTS string.
    pub fn parse(smarts: &str) -> Result<Self, SmartsError> {
        parser::parse_pattern(smarts)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn atoms(&self) -> &[AtomExpr] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[PatternBond] {
        &self.bonds
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub(super) fn neighbors(&self, idx: usize) -> &[(usize, usize)] {
        &self.adjacency[idx]
    }

    /// Pattern atoms in an order where every atom after the first of its
    /// component is adjacent to an earlier one.
    pub(super) fn search_order(&self) -> &[usize] {
        &self.search_order
    }
}

impl FromStr for SmartsPattern {
    type Err = SmartsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SmartsPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn breadth_first_order(adjacency: &[Vec<(usize, usize)>]) -> Vec<usize> {
    let mut order = Vec::with_capacity(adjacency.len());
    let mut seen = vec![false; adjacency.len()];
    for start in 0..adjacency.len() {
        if seen[start] {
            continue;
        }
        seen[start] = true;
        let mut cursor = order.len();
        order.push(start);
        while cursor < order.len() {
            let current = order[cursor];
            cursor += 1;
            for &(neighbor, _) in &adjacency[current] {
                if !seen[neighbor] {
                    seen[neighbor] = true;
                    order.push(neighbor);
                }
            }
        }
    }
    order
}
