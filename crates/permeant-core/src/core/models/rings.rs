use super::bond::Bond;
use std::collections::{HashSet, VecDeque};

/// Ring perception results for a molecular graph.
///
/// Holds a smallest set of smallest rings (SSSR) together with per-atom and per-bond
/// ring membership. Membership flags are exact (a bond is a ring bond iff it is not a
/// bridge), while the ring list is the minimal cycle basis found by shortest-cycle search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RingInfo {
    rings: Vec<Vec<usize>>,
    ring_bonds: Vec<Vec<usize>>,
    bond_in_ring: Vec<bool>,
    atom_in_ring: Vec<bool>,
    cyclomatic_number: usize,
}

impl RingInfo {
    pub fn perceive(atom_count: usize, bonds: &[Bond], adjacency: &[Vec<(usize, usize)>]) -> Self {
        let bond_in_ring: Vec<bool> = find_bridges(atom_count, bonds.len(), adjacency)
            .into_iter()
            .map(|bridge| !bridge)
            .collect();
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut seen: HashSet<Vec<usize>> = HashSet::new();

        for (bond_idx, bond) in bonds.iter().enumerate() {
            if !bond_in_ring[bond_idx] {
                continue;
            }
            let Some(path) =
                shortest_path_avoiding(adjacency, &bond_in_ring, bond.begin, bond.end, bond_idx)
            else {
                continue;
            };

            let mut cycle_bonds: Vec<usize> = path.bonds.clone();
            cycle_bonds.push(bond_idx);
            cycle_bonds.sort_unstable();
            if seen.insert(cycle_bonds.clone()) {
                candidates.push(Candidate {
                    atoms: path.atoms,
                    bonds: cycle_bonds,
                });
            }
        }

        let mut atom_in_ring = vec![false; atom_count];
        for (bond_idx, bond) in bonds.iter().enumerate() {
            if bond_in_ring[bond_idx] {
                atom_in_ring[bond.begin] = true;
                atom_in_ring[bond.end] = true;
            }
        }

        let components = count_components(atom_count, adjacency);
        let cyclomatic_number = (bonds.len() + components).saturating_sub(atom_count);

        candidates.sort_by(|a, b| a.bonds.len().cmp(&b.bonds.len()).then(a.bonds.cmp(&b.bonds)));

        let mut basis = CycleBasis::new(bonds.len());
        let mut rings = Vec::new();
        let mut ring_bonds = Vec::new();
        for candidate in candidates {
            if rings.len() == cyclomatic_number {
                break;
            }
            if basis.insert(&candidate.bonds) {
                rings.push(candidate.atoms);
                ring_bonds.push(candidate.bonds);
            }
        }

        Self {
            rings,
            ring_bonds,
            bond_in_ring,
            atom_in_ring,
            cyclomatic_number,
        }
    }

    /// Atom cycles of the SSSR, each listed in traversal order.
    pub fn rings(&self) -> &[Vec<usize>] {
        &self.rings
    }

    /// Bond indices of each SSSR ring, parallel to [`RingInfo::rings`].
    pub fn ring_bonds(&self) -> &[Vec<usize>] {
        &self.ring_bonds
    }

    /// Number of independent rings (the cyclomatic number of the graph).
    pub fn ring_count(&self) -> usize {
        self.cyclomatic_number
    }

    pub fn is_atom_in_ring(&self, atom: usize) -> bool {
        self.atom_in_ring.get(atom).copied().unwrap_or(false)
    }

    pub fn is_bond_in_ring(&self, bond: usize) -> bool {
        self.bond_in_ring.get(bond).copied().unwrap_or(false)
    }

    /// Number of SSSR rings the atom belongs to.
    pub fn atom_ring_membership(&self, atom: usize) -> usize {
        self.rings.iter().filter(|r| r.contains(&atom)).count()
    }

    pub fn is_atom_in_ring_of_size(&self, atom: usize, size: usize) -> bool {
        self.rings
            .iter()
            .any(|r| r.len() == size && r.contains(&atom))
    }

    pub fn smallest_ring_size(&self, atom: usize) -> Option<usize> {
        self.rings
            .iter()
            .filter(|r| r.contains(&atom))
            .map(|r| r.len())
            .min()
    }
}

struct Candidate {
    atoms: Vec<usize>,
    bonds: Vec<usize>,
}

struct Path {
    atoms: Vec<usize>,
    bonds: Vec<usize>,
}

/// Marks bridges (bonds whose removal disconnects the graph) with an iterative
/// low-link depth-first search. Every other bond lies on a cycle.
fn find_bridges(
    atom_count: usize,
    bond_count: usize,
    adjacency: &[Vec<(usize, usize)>],
) -> Vec<bool> {
    const UNSEEN: usize = usize::MAX;
    let mut discovered = vec![UNSEEN; atom_count];
    let mut low = vec![0; atom_count];
    let mut bridge = vec![false; bond_count];
    let mut timer = 0;

    for root in 0..atom_count {
        if discovered[root] != UNSEEN {
            continue;
        }
        discovered[root] = timer;
        low[root] = timer;
        timer += 1;
        // (atom, bond it was entered through, next adjacency slot)
        let mut stack: Vec<(usize, usize, usize)> = vec![(root, UNSEEN, 0)];

        while let Some(top) = stack.last_mut() {
            let (atom, via) = (top.0, top.1);
            match adjacency[atom].get(top.2) {
                Some(&(neighbor, bond)) => {
                    top.2 += 1;
                    if bond == via {
                        continue;
                    }
                    if discovered[neighbor] == UNSEEN {
                        discovered[neighbor] = timer;
                        low[neighbor] = timer;
                        timer += 1;
                        stack.push((neighbor, bond, 0));
                    } else {
                        low[atom] = low[atom].min(discovered[neighbor]);
                    }
                }
                None => {
                    stack.pop();
                    if let Some(&(parent, _, _)) = stack.last() {
                        low[parent] = low[parent].min(low[atom]);
                        if low[atom] > discovered[parent] {
                            bridge[via] = true;
                        }
                    }
                }
            }
        }
    }
    bridge
}

fn shortest_path_avoiding(
    adjacency: &[Vec<(usize, usize)>],
    usable: &[bool],
    from: usize,
    to: usize,
    excluded_bond: usize,
) -> Option<Path> {
    let mut previous: Vec<Option<(usize, usize)>> = vec![None; adjacency.len()];
    let mut visited = vec![false; adjacency.len()];
    let mut queue = VecDeque::new();
    visited[from] = true;
    queue.push_back(from);

    while let Some(current) = queue.pop_front() {
        if current == to {
            break;
        }
        for &(neighbor, bond_idx) in &adjacency[current] {
            if bond_idx == excluded_bond || !usable[bond_idx] || visited[neighbor] {
                continue;
            }
            visited[neighbor] = true;
            previous[neighbor] = Some((current, bond_idx));
            queue.push_back(neighbor);
        }
    }

    if !visited[to] {
        return None;
    }

    let mut atoms = vec![to];
    let mut bonds = Vec::new();
    let mut cursor = to;
    while let Some((prev, bond_idx)) = previous[cursor] {
        atoms.push(prev);
        bonds.push(bond_idx);
        cursor = prev;
    }
    atoms.reverse();
    bonds.reverse();
    Some(Path { atoms, bonds })
}

fn count_components(atom_count: usize, adjacency: &[Vec<(usize, usize)>]) -> usize {
    let mut visited = vec![false; atom_count];
    let mut components = 0;
    for start in 0..atom_count {
        if visited[start] {
            continue;
        }
        components += 1;
        let mut stack = vec![start];
        visited[start] = true;
        while let Some(current) = stack.pop() {
            for &(neighbor, _) in &adjacency[current] {
                if !visited[neighbor] {
                    visited[neighbor] = true;
                    stack.push(neighbor);
                }
            }
        }
    }
    components
}

/// Incremental GF(2) basis over bond-incidence vectors, used to keep only
/// linearly independent cycles.
struct CycleBasis {
    words: usize,
    rows: Vec<(usize, Vec<u64>)>,
}

impl CycleBasis {
    fn new(bond_count: usize) -> Self {
        Self {
            words: bond_count.div_ceil(64).max(1),
            rows: Vec::new(),
        }
    }

    fn insert(&mut self, bonds: &[usize]) -> bool {
        let mut vector = vec![0u64; self.words];
        for &b in bonds {
            vector[b / 64] |= 1 << (b % 64);
        }
        for (pivot, row) in &self.rows {
            if vector[pivot / 64] & (1 << (pivot % 64)) != 0 {
                for (v, r) in vector.iter_mut().zip(row) {
                    *v ^= r;
                }
            }
        }
        match highest_bit(&vector) {
            Some(pivot) => {
                for (_, row) in self.rows.iter_mut() {
                    if row[pivot / 64] & (1 << (pivot % 64)) != 0 {
                        for (r, v) in row.iter_mut().zip(&vector) {
                            *r ^= v;
                        }
                    }
                }
                self.rows.push((pivot, vector));
                true
            }
            None => false,
        }
    }
}

fn highest_bit(vector: &[u64]) -> Option<usize> {
    vector
        .iter()
        .enumerate()
        .rev()
        .find(|(_, w)| **w != 0)
        .map(|(i, w)| i * 64 + 63 - w.leading_zeros() as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::bond::BondOrder;

    fn graph(atom_count: usize, edges: &[(usize, usize)]) -> (Vec<Bond>, Vec<Vec<(usize, usize)>>) {
        let bonds: Vec<Bond> = edges
            .iter()
            .map(|&(a, b)| Bond::new(a, b, BondOrder::Single))
            .collect();
        let mut adjacency = vec![Vec::new(); atom_count];
        for (i, bond) in bonds.iter().enumerate() {
            adjacency[bond.begin].push((bond.end, i));
            adjacency[bond.end].push((bond.begin, i));
        }
        (bonds, adjacency)
    }

    #[test]
    fn acyclic_chain_has_no_rings() {
        let (bonds, adjacency) = graph(4, &[(0, 1), (1, 2), (2, 3)]);
        let info = RingInfo::perceive(4, &bonds, &adjacency);
        assert_eq!(info.ring_count(), 0);
        assert!(info.rings().is_empty());
        assert!(!info.is_atom_in_ring(1));
        assert!(!info.is_bond_in_ring(0));
    }

    #[test]
    fn six_membered_ring_is_found() {
        let (bonds, adjacency) = graph(7, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0), (5, 6)]);
        let info = RingInfo::perceive(7, &bonds, &adjacency);
        assert_eq!(info.ring_count(), 1);
        assert_eq!(info.rings()[0].len(), 6);
        assert!(info.is_atom_in_ring(0));
        assert!(!info.is_atom_in_ring(6));
        assert!(!info.is_bond_in_ring(6));
        assert!(info.is_atom_in_ring_of_size(3, 6));
        assert_eq!(info.smallest_ring_size(3), Some(6));
    }

    #[test]
    fn fused_bicycle_yields_two_smallest_rings() {
        // Naphthalene skeleton: two six-membered rings sharing the 0-5 bond.
        let (bonds, adjacency) = graph(
            10,
            &[
                (0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0),
                (5, 6), (6, 7), (7, 8), (8, 9), (9, 0),
            ],
        );
        let info = RingInfo::perceive(10, &bonds, &adjacency);
        assert_eq!(info.ring_count(), 2);
        assert_eq!(info.rings().len(), 2);
        assert!(info.rings().iter().all(|r| r.len() == 6));
        assert_eq!(info.atom_ring_membership(0), 2);
        assert_eq!(info.atom_ring_membership(2), 1);
    }

    #[test]
    fn ring_with_pendant_chain_flags_only_cycle_bonds() {
        // Cyclopropane carrying an ethyl group, with a second ring joined by a bridge bond.
        let (bonds, adjacency) = graph(
            8,
            &[(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 5), (5, 6), (6, 7), (7, 5)],
        );
        let info = RingInfo::perceive(8, &bonds, &adjacency);
        let flags: Vec<bool> = (0..bonds.len()).map(|b| info.is_bond_in_ring(b)).collect();
        assert_eq!(
            flags,
            vec![true, true, true, false, false, false, true, true, true]
        );
        assert_eq!(info.ring_count(), 2);
        assert!(!info.is_atom_in_ring(3));
        assert!(info.is_atom_in_ring(5));
    }

    #[test]
    fn long_chain_is_perceived_without_recursion() {
        let n = 50_000;
        let edges: Vec<(usize, usize)> = (1..n).map(|i| (i - 1, i)).collect();
        let (bonds, adjacency) = graph(n, &edges);
        let info = RingInfo::perceive(n, &bonds, &adjacency);
        assert_eq!(info.ring_count(), 0);
        assert!((0..bonds.len()).all(|b| !info.is_bond_in_ring(b)));
    }

    #[test]
    fn disconnected_fragments_count_rings_per_component() {
        let (bonds, adjacency) = graph(6, &[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)]);
        let info = RingInfo::perceive(6, &bonds, &adjacency);
        assert_eq!(info.ring_count(), 2);
        assert!(info.rings().iter().all(|r| r.len() == 3));
    }
}
