use super::implicit_hydrogen_count;
use crate::core::models::bond::BondOrder;
use crate::core::models::element;
use crate::core::models::molecule::Molecule;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt::Write;

/// Writes a canonical SMILES string for the molecule.
///
/// Atoms are ranked by partition refinement over graph invariants with deterministic
/// tie-breaking, then written by a rank-ordered depth-first traversal. Two molecules
/// with the same graph yield the same string regardless of input atom order. Both
/// passes keep their own stacks, so chain length is bounded only by memory.
pub fn write_canonical(mol: &Molecule) -> String {
    if mol.is_empty() {
        return String::new();
    }

    let ranks = canonical_ranks(mol);
    let traversal = Traversal::plan(mol, &ranks);
    traversal.render(mol, &ranks)
}

/// Ranks atoms by refining an ordered partition until it is equitable, then
/// individualizing one atom of the first tied cell and refining again.
///
/// Atoms still tied after refinement are taken to be symmetry-equivalent, so picking
/// the lowest input index among them does not change the output. Refinement separates
/// inequivalent atoms in the molecular graphs met in practice, but not in every
/// regular graph.
fn canonical_ranks(mol: &Molecule) -> Vec<usize> {
    let n = mol.atom_count();
    let invariants: Vec<_> = (0..n)
        .map(|i| {
            let atom = mol.atom(i);
            (
                atom.atomic_number,
                atom.isotope.unwrap_or(0),
                atom.charge,
                mol.total_hydrogens(i),
                mol.heavy_degree(i),
                atom.aromatic,
                mol.rings().is_atom_in_ring(i),
            )
        })
        .collect();

    let mut partition = Partition::from_invariants(&invariants);
    partition.refine(mol);

    let mut cursor = 0;
    while let Some(cell) = partition.first_tied_cell(cursor) {
        cursor = cell;
        let chosen = partition.members(cell).iter().copied().min().unwrap_or(cell);
        partition.individualize(cell, chosen);
        partition.refine(mol);
    }
    partition.cell
}

/// Weight of one bond to a splitter cell; bond kinds occupy separate 12-bit lanes.
fn bond_weight(order: BondOrder) -> u64 {
    let lane = match order {
        BondOrder::Single => 0,
        BondOrder::Double => 1,
        BondOrder::Triple => 2,
        BondOrder::Aromatic => 3,
    };
    1 << (12 * lane)
}

/// Ordered partition of the atoms. Cells are contiguous runs of `order` and are
/// named by their first slot, so a cell name also orders the cells.
struct Partition {
    order: Vec<usize>,
    position: Vec<usize>,
    cell: Vec<usize>,
    cell_end: Vec<usize>,
    queue: VecDeque<usize>,
    queued: Vec<bool>,
}

impl Partition {
    fn from_invariants<K: Ord>(keys: &[K]) -> Self {
        let n = keys.len();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| keys[a].cmp(&keys[b]));

        let mut partition = Self {
            position: vec![0; n],
            cell: vec![0; n],
            cell_end: vec![0; n],
            queue: VecDeque::new(),
            queued: vec![false; n],
            order,
        };
        let mut start = 0;
        for slot in 0..n {
            let atom = partition.order[slot];
            partition.position[atom] = slot;
            if slot > 0 && keys[partition.order[slot - 1]] != keys[atom] {
                partition.close_cell(start, slot);
                start = slot;
            }
        }
        if n > 0 {
            partition.close_cell(start, n);
        }
        partition
    }

    fn close_cell(&mut self, start: usize, end: usize) {
        self.cell_end[start] = end;
        for slot in start..end {
            self.cell[self.order[slot]] = start;
        }
        self.enqueue(start);
    }

    fn enqueue(&mut self, cell: usize) {
        if !self.queued[cell] {
            self.queued[cell] = true;
            self.queue.push_back(cell);
        }
    }

    fn members(&self, cell: usize) -> &[usize] {
        &self.order[cell..self.cell_end[cell]]
    }

    fn first_tied_cell(&self, from: usize) -> Option<usize> {
        let mut slot = from;
        while slot < self.order.len() {
            let end = self.cell_end[slot];
            if end - slot > 1 {
                return Some(slot);
            }
            slot = end;
        }
        None
    }

    fn swap_slots(&mut self, a: usize, b: usize) {
        self.order.swap(a, b);
        self.position[self.order[a]] = a;
        self.position[self.order[b]] = b;
    }

    /// Splits `atom` off into a singleton cell at the front of `cell`.
    fn individualize(&mut self, cell: usize, atom: usize) {
        let was_queued = self.queued[cell];
        let end = self.cell_end[cell];
        self.swap_slots(cell, self.position[atom]);
        self.cell_end[cell] = cell + 1;
        self.cell_end[cell + 1] = end;
        for slot in cell + 1..end {
            self.cell[self.order[slot]] = cell + 1;
        }
        self.enqueue_pieces(was_queued, &[cell, cell + 1]);
    }

    /// Queues the pieces of a split cell. When the parent was already used as a
    /// splitter, counts into its largest piece follow from the others, so that piece
    /// is skipped. This keeps refinement near-linear on long chains.
    fn enqueue_pieces(&mut self, parent_queued: bool, pieces: &[usize]) {
        let skipped = if parent_queued {
            None
        } else {
            let mut largest: Option<(usize, usize)> = None;
            for &piece in pieces {
                let size = self.cell_end[piece] - piece;
                if largest.is_none_or(|(_, best)| size > best) {
                    largest = Some((piece, size));
                }
            }
            largest.map(|(piece, _)| piece)
        };
        for &piece in pieces {
            if Some(piece) != skipped {
                self.enqueue(piece);
            }
        }
    }

    /// Splits cells by their bond counts into each queued splitter cell until no
    /// cell changes.
    fn refine(&mut self, mol: &Molecule) {
        let mut weight = vec![0u64; self.order.len()];
        let mut touched: Vec<usize> = Vec::new();

        while let Some(splitter) = self.queue.pop_front() {
            self.queued[splitter] = false;
            for &member in self.members(splitter) {
                for &(neighbor, bond) in mol.neighbors(member) {
                    if weight[neighbor] == 0 {
                        touched.push(neighbor);
                    }
                    weight[neighbor] += bond_weight(mol.bond(bond).order);
                }
            }
            touched.sort_unstable_by_key(|&a| (self.cell[a], weight[a]));

            let mut group_start = 0;
            while group_start < touched.len() {
                let cell = self.cell[touched[group_start]];
                let group_end = touched[group_start..]
                    .iter()
                    .position(|&a| self.cell[a] != cell)
                    .map_or(touched.len(), |offset| group_start + offset);
                self.split(cell, &touched[group_start..group_end], &weight);
                group_start = group_end;
            }

            for &atom in &touched {
                weight[atom] = 0;
            }
            touched.clear();
        }
    }

    /// Moves the touched atoms of `cell` to its tail in ascending weight order and
    /// cuts a new cell at every weight change. Untouched atoms keep the cell name.
    fn split(&mut self, cell: usize, touched: &[usize], weight: &[u64]) {
        let end = self.cell_end[cell];
        let size = end - cell;
        let uniform = touched
            .first()
            .is_some_and(|&a| touched.iter().all(|&b| weight[b] == weight[a]));
        if touched.len() == size && uniform {
            return;
        }

        let was_queued = self.queued[cell];
        let tail = end - touched.len();
        for (offset, &atom) in touched.iter().enumerate() {
            self.swap_slots(tail + offset, self.position[atom]);
        }

        let mut pieces = Vec::new();
        if tail > cell {
            self.cell_end[cell] = tail;
            pieces.push(cell);
        }
        let mut start = tail;
        for slot in tail..end {
            let boundary = slot + 1 == end
                || weight[self.order[slot + 1]] != weight[self.order[slot]];
            if boundary {
                self.cell_end[start] = slot + 1;
                for s in start..=slot {
                    self.cell[self.order[s]] = start;
                }
                pieces.push(start);
                start = slot + 1;
            }
        }
        self.enqueue_pieces(was_queued, &pieces);
    }
}

/// A closure bond discovered during the first pass, opened at `opener`.
struct Closure {
    bond: usize,
    opener: usize,
    closer: usize,
}

/// Depth-first spanning forest plus ring-closure bonds, in canonical order.
struct Traversal {
    roots: Vec<usize>,
    children: Vec<Vec<(usize, usize)>>,
    closures: Vec<Closure>,
}

/// One open atom of the depth-first walk.
struct Frame {
    atom: usize,
    via: Option<usize>,
    neighbors: Vec<(usize, usize)>,
    next: usize,
}

impl Frame {
    fn new(mol: &Molecule, ranks: &[usize], atom: usize, via: Option<usize>) -> Self {
        let mut neighbors: Vec<(usize, usize)> = mol.neighbors(atom).to_vec();
        neighbors.sort_by_key(|&(n, _)| ranks[n]);
        Self {
            atom,
            via,
            neighbors,
            next: 0,
        }
    }
}

enum Step {
    Enter { atom: usize, bond: Option<usize> },
    OpenBranch,
    CloseBranch,
}

impl Traversal {
    fn plan(mol: &Molecule, ranks: &[usize]) -> Self {
        let n = mol.atom_count();
        let mut by_rank: Vec<usize> = (0..n).collect();
        by_rank.sort_by_key(|&i| ranks[i]);

        let mut plan = Self {
            roots: Vec::new(),
            children: vec![Vec::new(); n],
            closures: Vec::new(),
        };
        let mut visited = vec![false; n];
        let mut tree_bonds = vec![false; mol.bond_count()];
        let mut closure_bonds = vec![false; mol.bond_count()];

        for &start in &by_rank {
            if visited[start] {
                continue;
            }
            plan.roots.push(start);
            visited[start] = true;
            let mut stack = vec![Frame::new(mol, ranks, start, None)];

            while let Some(frame) = stack.last_mut() {
                let Some(&(neighbor, bond)) = frame.neighbors.get(frame.next) else {
                    stack.pop();
                    continue;
                };
                frame.next += 1;
                let atom = frame.atom;
                if Some(bond) == frame.via || closure_bonds[bond] || tree_bonds[bond] {
                    continue;
                }
                if visited[neighbor] {
                    closure_bonds[bond] = true;
                    plan.closures.push(Closure {
                        bond,
                        opener: neighbor,
                        closer: atom,
                    });
                    continue;
                }
                visited[neighbor] = true;
                tree_bonds[bond] = true;
                plan.children[atom].push((neighbor, bond));
                stack.push(Frame::new(mol, ranks, neighbor, Some(bond)));
            }
        }
        plan
    }

    fn render(&self, mol: &Molecule, ranks: &[usize]) -> String {
        let n = mol.atom_count();
        let mut opened_at: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut closed_at: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (idx, closure) in self.closures.iter().enumerate() {
            opened_at[closure.opener].push(idx);
            closed_at[closure.closer].push(idx);
        }
        for opening in &mut opened_at {
            opening.sort_by_key(|&c| ranks[self.closures[c].closer]);
        }

        let mut out = String::new();
        let mut digits = DigitPool::default();
        let mut assigned: HashMap<usize, u16> = HashMap::new();

        for (i, &root) in self.roots.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            let mut steps = vec![Step::Enter {
                atom: root,
                bond: None,
            }];
            while let Some(step) = steps.pop() {
                let (atom, bond) = match step {
                    Step::OpenBranch => {
                        out.push('(');
                        continue;
                    }
                    Step::CloseBranch => {
                        out.push(')');
                        continue;
                    }
                    Step::Enter { atom, bond } => (atom, bond),
                };
                if let Some(bond) = bond {
                    out.push_str(bond_token(mol, bond));
                }
                out.push_str(&atom_token(mol, atom));

                let mut closing: Vec<(u16, usize)> = closed_at[atom]
                    .iter()
                    .map(|&c| self.closures[c].bond)
                    .filter_map(|b| assigned.get(&b).map(|&d| (d, b)))
                    .collect();
                closing.sort_unstable();
                let mut released = Vec::new();
                for (digit, bond) in closing {
                    push_ring_label(&mut out, digit);
                    assigned.remove(&bond);
                    released.push(digit);
                }

                for &c in &opened_at[atom] {
                    let closure = &self.closures[c];
                    let digit = digits.acquire();
                    out.push_str(bond_token(mol, closure.bond));
                    push_ring_label(&mut out, digit);
                    assigned.insert(closure.bond, digit);
                }

                for digit in released {
                    digits.release(digit);
                }

                let children = &self.children[atom];
                for (i, &(child, bond)) in children.iter().enumerate().rev() {
                    let last = i + 1 == children.len();
                    if !last {
                        steps.push(Step::CloseBranch);
                    }
                    steps.push(Step::Enter {
                        atom: child,
                        bond: Some(bond),
                    });
                    if !last {
                        steps.push(Step::OpenBranch);
                    }
                }
            }
        }
        out
    }
}

#[derive(Default)]
struct DigitPool {
    in_use: BTreeSet<u16>,
}

impl DigitPool {
    fn acquire(&mut self) -> u16 {
        let digit = (1..).find(|d| !self.in_use.contains(d)).unwrap_or(1);
        self.in_use.insert(digit);
        digit
    }

    fn release(&mut self, digit: u16) {
        self.in_use.remove(&digit);
    }
}

fn push_ring_label(out: &mut String, digit: u16) {
    if digit < 10 {
        let _ = write!(out, "{digit}");
    } else {
        let _ = write!(out, "%{digit:02}");
    }
}

fn bond_token(mol: &Molecule, bond: usize) -> &'static str {
    let b = mol.bond(bond);
    let both_aromatic = mol.atom(b.begin).aromatic && mol.atom(b.end).aromatic;
    match b.order {
        BondOrder::Single if both_aromatic => "-",
        BondOrder::Single => "",
        BondOrder::Aromatic if both_aromatic => "",
        other => other.smiles_symbol(),
    }
}

fn atom_token(mol: &Molecule, idx: usize) -> String {
    let atom = mol.atom(idx);
    let symbol = if atom.aromatic {
        atom.symbol().to_lowercase()
    } else {
        atom.symbol().to_string()
    };
    let aromatic_spelling_ok = !atom.aromatic || element::aromatic_symbol(&symbol).is_some();

    if atom.atomic_number == element::WILDCARD
        && atom.charge == 0
        && atom.isotope.is_none()
        && atom.hydrogens == 0
    {
        return "*".to_string();
    }

    let organic = atom.element().is_some_and(|e| e.is_organic_subset());
    if organic && atom.charge == 0 && atom.isotope.is_none() && aromatic_spelling_ok {
        let mut explicit = 0u32;
        let mut aromatic_bonds = 0u32;
        for &(_, b) in mol.neighbors(idx) {
            match mol.bond(b).order {
                BondOrder::Aromatic => aromatic_bonds += 1,
                order => explicit += order.integral_valence() as u32,
            }
        }
        if implicit_hydrogen_count(atom.atomic_number, atom.aromatic, explicit, aromatic_bonds)
            == Some(atom.hydrogens)
        {
            return symbol;
        }
    }

    let mut token = String::from("[");
    if let Some(isotope) = atom.isotope {
        let _ = write!(token, "{isotope}");
    }
    if aromatic_spelling_ok {
        token.push_str(&symbol);
    } else {
        token.push_str(atom.symbol());
    }
    match atom.hydrogens {
        0 => {}
        1 => token.push('H'),
        h => {
            let _ = write!(token, "H{h}");
        }
    }
    match atom.charge {
        0 => {}
        1 => token.push('+'),
        -1 => token.push('-'),
        c if c > 0 => {
            let _ = write!(token, "+{c}");
        }
        c => {
            let _ = write!(token, "-{}", -(c as i16));
        }
    }
    token.push(']');
    token
}
