use super::bond::BondOrder;
use super::element;
use super::molecule::Molecule;
use std::collections::VecDeque;

const NONE: usize = usize::MAX;

/// Checks that the aromatic system has a Kekulé form.
///
/// Every aromatic atom whose valence is one short of an allowed value must receive
/// exactly one double bond, drawn from the aromatic bonds between such atoms. That is
/// a perfect matching on those atoms, found with Edmonds' blossom search since
/// five- and seven-membered rings make the graph non-bipartite.
///
/// Returns the index of an atom that cannot be paired.
pub(crate) fn check(mol: &Molecule) -> Result<(), usize> {
    let n = mol.atom_count();
    let needs: Vec<bool> = (0..n).map(|idx| needs_double_bond(mol, idx)).collect();
    if !needs.contains(&true) {
        return Ok(());
    }

    let adjacency: Vec<Vec<usize>> = (0..n)
        .map(|idx| {
            if !needs[idx] {
                return Vec::new();
            }
            mol.neighbors(idx)
                .iter()
                .filter(|&&(other, bond)| {
                    needs[other] && mol.bond(bond).order == BondOrder::Aromatic
                })
                .map(|&(other, _)| other)
                .collect()
        })
        .collect();

    let mut matching = Matching::new(&adjacency);
    matching.pair_greedily();
    for atom in 0..n {
        if needs[atom] && matching.mate[atom] == NONE && !matching.augment_from(atom) {
            return Err(atom);
        }
    }
    Ok(())
}

fn needs_double_bond(mol: &Molecule, idx: usize) -> bool {
    let atom = mol.atom(idx);
    if !atom.aromatic {
        return false;
    }
    let mut used = atom.hydrogens as u32;
    let mut aromatic_bonds = 0;
    for &(_, bond) in mol.neighbors(idx) {
        match mol.bond(bond).order {
            BondOrder::Aromatic => {
                used += 1;
                aromatic_bonds += 1;
            }
            order => used += order.integral_valence() as u32,
        }
    }
    if aromatic_bonds < 2 {
        return false;
    }
    let allowed = element::allowed_valences(atom.atomic_number, atom.charge);
    let fits = |valence: u32| allowed.iter().any(|&v| v as u32 == valence);
    !fits(used) && fits(used + 1)
}

struct Matching<'a> {
    adjacency: &'a [Vec<usize>],
    mate: Vec<usize>,
    parent: Vec<usize>,
    base: Vec<usize>,
    in_tree: Vec<bool>,
    in_blossom: Vec<bool>,
    queue: VecDeque<usize>,
}

impl<'a> Matching<'a> {
    fn new(adjacency: &'a [Vec<usize>]) -> Self {
        let n = adjacency.len();
        Self {
            adjacency,
            mate: vec![NONE; n],
            parent: vec![NONE; n],
            base: (0..n).collect(),
            in_tree: vec![false; n],
            in_blossom: vec![false; n],
            queue: VecDeque::new(),
        }
    }

    fn pair_greedily(&mut self) {
        let adjacency = self.adjacency;
        for v in 0..adjacency.len() {
            if self.mate[v] != NONE {
                continue;
            }
            if let Some(&u) = adjacency[v].iter().find(|&&u| self.mate[u] == NONE) {
                self.mate[v] = u;
                self.mate[u] = v;
            }
        }
    }

    fn augment_from(&mut self, root: usize) -> bool {
        let Some(end) = self.find_path(root) else {
            return false;
        };
        let mut v = end;
        while v != NONE {
            let p = self.parent[v];
            if p == NONE {
                break;
            }
            let next = self.mate[p];
            self.mate[v] = p;
            self.mate[p] = v;
            v = next;
        }
        true
    }

    /// Grows an alternating tree from `root`, contracting odd cycles, until an
    /// unmatched atom is reached.
    fn find_path(&mut self, root: usize) -> Option<usize> {
        let adjacency = self.adjacency;
        let n = adjacency.len();
        self.in_tree.fill(false);
        self.parent.fill(NONE);
        for (i, base) in self.base.iter_mut().enumerate() {
            *base = i;
        }
        self.queue.clear();
        self.in_tree[root] = true;
        self.queue.push_back(root);

        while let Some(v) = self.queue.pop_front() {
            for &to in &adjacency[v] {
                if self.base[v] == self.base[to] || self.mate[v] == to {
                    continue;
                }
                let outer = to == root
                    || (self.mate[to] != NONE && self.parent[self.mate[to]] != NONE);
                if outer {
                    let ancestor = self.common_base(v, to);
                    self.in_blossom.fill(false);
                    self.mark_blossom(v, ancestor, to);
                    self.mark_blossom(to, ancestor, v);
                    for i in 0..n {
                        if self.in_blossom[self.base[i]] {
                            self.base[i] = ancestor;
                            if !self.in_tree[i] {
                                self.in_tree[i] = true;
                                self.queue.push_back(i);
                            }
                        }
                    }
                } else if self.parent[to] == NONE {
                    self.parent[to] = v;
                    if self.mate[to] == NONE {
                        return Some(to);
                    }
                    let next = self.mate[to];
                    self.in_tree[next] = true;
                    self.queue.push_back(next);
                }
            }
        }
        None
    }

    fn common_base(&self, mut a: usize, mut b: usize) -> usize {
        let mut seen = vec![false; self.mate.len()];
        loop {
            a = self.base[a];
            seen[a] = true;
            let mate = self.mate[a];
            if mate == NONE || self.parent[mate] == NONE {
                break;
            }
            a = self.parent[mate];
        }
        loop {
            b = self.base[b];
            if seen[b] {
                return b;
            }
            let mate = self.mate[b];
            if mate == NONE || self.parent[mate] == NONE {
                return b;
            }
            b = self.parent[mate];
        }
    }

    fn mark_blossom(&mut self, mut v: usize, ancestor: usize, mut child: usize) {
        while self.base[v] != ancestor {
            let mate = self.mate[v];
            if mate == NONE {
                break;
            }
            self.in_blossom[self.base[v]] = true;
            self.in_blossom[self.base[mate]] = true;
            self.parent[v] = child;
            child = mate;
            v = self.parent[mate];
            if v == NONE {
                break;
            }
        }
    }
}
