use super::pattern::{AtomExpr, AtomPrimitive, BondExpr, BondPrimitive, SmartsPattern};
use crate::core::models::bond::BondOrder;
use crate::core::models::molecule::Molecule;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

impl SmartsPattern {
    /// Whether the pattern occurs anywhere in the molecule.
    pub fn matches(&self, mol: &Molecule) -> bool {
        let ctx = MatchContext::new(mol);
        let mut search = Search::new(self, &ctx, true);
        search.run(None);
        !search.results.is_empty()
    }

    /// Every embedding of the pattern, as target atom indices ordered by pattern atom.
    pub fn find_matches(&self, mol: &Molecule) -> Vec<Vec<usize>> {
        let ctx = MatchContext::new(mol);
        let mut search = Search::new(self, &ctx, false);
        search.run(None);
        search.results
    }

    /// Distinct target atoms that pattern atom 0 can be mapped onto, in ascending order.
    pub fn matching_atoms(&self, mol: &Molecule) -> Vec<usize> {
        let ctx = MatchContext::new(mol);
        ctx.root_hits(self)
            .iter()
            .enumerate()
            .filter_map(|(idx, &hit)| hit.then_some(idx))
            .collect()
    }

    /// Number of distinct embeddings after collapsing those that cover the same atom set.
    pub fn count_unique_matches(&self, mol: &Molecule) -> usize {
        self.find_matches(mol)
            .into_iter()
            .map(|m| m.into_iter().collect::<BTreeSet<_>>())
            .collect::<BTreeSet<_>>()
            .len()
    }
}

/// Per-molecule state shared by a match and all of its recursive sub-queries.
struct MatchContext<'m> {
    mol: &'m Molecule,
    recursive_hits: RefCell<HashMap<usize, Rc<Vec<bool>>>>,
}

impl<'m> MatchContext<'m> {
    fn new(mol: &'m Molecule) -> Self {
        Self {
            mol,
            recursive_hits: RefCell::new(HashMap::new()),
        }
    }

    /// For each target atom, whether `pattern` matches with its root on that atom.
    fn root_hits(&self, pattern: &SmartsPattern) -> Rc<Vec<bool>> {
        let key = pattern as *const SmartsPattern as usize;
        if let Some(hits) = self.recursive_hits.borrow().get(&key) {
            return Rc::clone(hits);
        }

        // Backtracking leaves the search state clean, so one search serves every root.
        let mut search = Search::new(pattern, self, true);
        let hits: Vec<bool> = (0..self.mol.atom_count())
            .map(|root| {
                search.results.clear();
                search.run(Some(root));
                !search.results.is_empty()
            })
            .collect();
        let hits = Rc::new(hits);
        self.recursive_hits
            .borrow_mut()
            .insert(key, Rc::clone(&hits));
        hits
    }

    fn atom_matches(&self, expr: &AtomExpr, idx: usize) -> bool {
        match expr {
            AtomExpr::Primitive(p) => self.primitive_matches(p, idx),
            AtomExpr::Not(inner) => !self.atom_matches(inner, idx),
            AtomExpr::And(terms) => terms.iter().all(|t| self.atom_matches(t, idx)),
            AtomExpr::Or(terms) => terms.iter().any(|t| self.atom_matches(t, idx)),
        }
    }

    fn primitive_matches(&self, primitive: &AtomPrimitive, idx: usize) -> bool {
        let mol = self.mol;
        let atom = mol.atom(idx);
        let rings = mol.rings();
        match *primitive {
            AtomPrimitive::Any => true,
            AtomPrimitive::Aromatic => atom.aromatic,
            AtomPrimitive::Aliphatic => !atom.aromatic,
            AtomPrimitive::AtomicNumber(z) => atom.atomic_number == z,
            AtomPrimitive::AliphaticElement(z) => atom.atomic_number == z && !atom.aromatic,
            AtomPrimitive::AromaticElement(z) => atom.atomic_number == z && atom.aromatic,
            AtomPrimitive::TotalHydrogens(n) => mol.total_hydrogens(idx) == n as usize,
            AtomPrimitive::ImplicitHydrogens(n) => atom.hydrogens == n,
            AtomPrimitive::Degree(n) => mol.degree(idx) == n as usize,
            AtomPrimitive::Connectivity(n) => mol.total_degree(idx) == n as usize,
            AtomPrimitive::Valence(n) => mol.valence(idx) == n,
            AtomPrimitive::RingMembership(None) | AtomPrimitive::RingSize(None) => {
                rings.is_atom_in_ring(idx)
            }
            AtomPrimitive::RingMembership(Some(0)) | AtomPrimitive::RingSize(Some(0)) => {
                !rings.is_atom_in_ring(idx)
            }
            AtomPrimitive::RingMembership(Some(n)) => rings.atom_ring_membership(idx) == n as usize,
            AtomPrimitive::RingSize(Some(n)) => rings.is_atom_in_ring_of_size(idx, n as usize),
            AtomPrimitive::RingConnectivity(n) => {
                let ring_bonds = mol
                    .neighbors(idx)
                    .iter()
                    .filter(|&&(_, b)| rings.is_bond_in_ring(b))
                    .count();
                match n {
                    None => ring_bonds > 0,
                    Some(n) => ring_bonds == n as usize,
                }
            }
            AtomPrimitive::Charge(c) => atom.charge == c,
            AtomPrimitive::Isotope(mass) => atom.isotope == Some(mass),
            AtomPrimitive::Recursive(ref pattern) => {
                self.root_hits(pattern).get(idx).copied().unwrap_or(false)
            }
        }
    }

    fn bond_matches(&self, expr: &BondExpr, bond: usize) -> bool {
        let order = self.mol.bond(bond).order;
        match expr {
            BondExpr::Implicit => matches!(order, BondOrder::Single | BondOrder::Aromatic),
            BondExpr::Primitive(p) => match p {
                BondPrimitive::Single => order == BondOrder::Single,
                BondPrimitive::Double => order == BondOrder::Double,
                BondPrimitive::Triple => order == BondOrder::Triple,
                BondPrimitive::Aromatic => order == BondOrder::Aromatic,
                BondPrimitive::Any => true,
                BondPrimitive::Ring => self.mol.rings().is_bond_in_ring(bond),
            },
            BondExpr::Not(inner) => !self.bond_matches(inner, bond),
            BondExpr::And(terms) => terms.iter().all(|t| self.bond_matches(t, bond)),
            BondExpr::Or(terms) => terms.iter().any(|t| self.bond_matches(t, bond)),
        }
    }
}

/// Backtracking subgraph search over the pattern's breadth-first atom order.
struct Search<'p, 'c, 'm> {
    pattern: &'p SmartsPattern,
    ctx: &'c MatchContext<'m>,
    pattern_to_target: Vec<Option<usize>>,
    target_used: Vec<bool>,
    stop_at_first: bool,
    results: Vec<Vec<usize>>,
}

impl<'p, 'c, 'm> Search<'p, 'c, 'm> {
    fn new(pattern: &'p SmartsPattern, ctx: &'c MatchContext<'m>, stop_at_first: bool) -> Self {
        Self {
            pattern,
            ctx,
            pattern_to_target: vec![None; pattern.atom_count()],
            target_used: vec![false; ctx.mol.atom_count()],
            stop_at_first,
            results: Vec::new(),
        }
    }

    fn run(&mut self, root: Option<usize>) {
        if self.pattern.atom_count() == 0 || self.pattern.atom_count() > self.ctx.mol.atom_count() {
            return;
        }
        self.extend(0, root);
    }

    fn done(&self) -> bool {
        self.stop_at_first && !self.results.is_empty()
    }

    fn extend(&mut self, depth: usize, root: Option<usize>) {
        let order = self.pattern.search_order();
        if depth == order.len() {
            let mapping = self.pattern_to_target.iter().flatten().copied().collect();
            self.results.push(mapping);
            return;
        }

        let pattern_atom = order[depth];
        for candidate in self.candidates(pattern_atom, depth, root) {
            if self.target_used[candidate] || !self.feasible(pattern_atom, candidate) {
                continue;
            }
            self.pattern_to_target[pattern_atom] = Some(candidate);
            self.target_used[candidate] = true;
            self.extend(depth + 1, root);
            self.pattern_to_target[pattern_atom] = None;
            self.target_used[candidate] = false;
            if self.done() {
                return;
            }
        }
    }

    fn candidates(&self, pattern_atom: usize, depth: usize, root: Option<usize>) -> Vec<usize> {
        if depth == 0 {
            if let Some(root) = root {
                return vec![root];
            }
        }
        let anchor = self
            .pattern
            .neighbors(pattern_atom)
            .iter()
            .find_map(|&(n, _)| self.pattern_to_target[n]);
        match anchor {
            Some(target) => self
                .ctx
                .mol
                .neighbors(target)
                .iter()
                .map(|&(n, _)| n)
                .collect(),
            None => (0..self.ctx.mol.atom_count()).collect(),
        }
    }

    fn feasible(&self, pattern_atom: usize, target_atom: usize) -> bool {
        for &(pattern_neighbor, pattern_bond) in self.pattern.neighbors(pattern_atom) {
            let Some(target_neighbor) = self.pattern_to_target[pattern_neighbor] else {
                continue;
            };
            let Some(target_bond) = self.ctx.mol.bond_between(target_atom, target_neighbor) else {
                return false;
            };
            if !self
                .ctx
                .bond_matches(&self.pattern.bonds()[pattern_bond].expr, target_bond)
            {
                return false;
            }
        }
        self.ctx
            .atom_matches(&self.pattern.atoms()[pattern_atom], target_atom)
    }
}
