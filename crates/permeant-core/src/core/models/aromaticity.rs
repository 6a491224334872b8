use super::bond::BondOrder;
use super::molecule::Molecule;
use std::collections::HashSet;

/// Perceives aromatic rings in place.
///
/// Aromatic bonds that ended up outside any ring are demoted to single bonds, then
/// each smallest ring (and each fused pair of rings) is tested against the Hückel
/// 4n+2 rule. Rings that pass have their atoms flagged aromatic and their bonds set
/// to [`BondOrder::Aromatic`], so Kekulé and aromatic spellings converge on the same graph.
pub(crate) fn perceive(mol: &mut Molecule) {
    for idx in 0..mol.bond_count() {
        if mol.bond(idx).order == BondOrder::Aromatic && !mol.rings().is_bond_in_ring(idx) {
            mol.set_bond_order(idx, BondOrder::Single);
        }
    }

    let rings: Vec<(Vec<usize>, Vec<usize>)> = mol
        .rings()
        .rings()
        .iter()
        .cloned()
        .zip(mol.rings().ring_bonds().iter().cloned())
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        for (atoms, bonds) in &rings {
            if is_fully_aromatic(mol, bonds) {
                continue;
            }
            let members: HashSet<usize> = atoms.iter().copied().collect();
            if is_huckel(pi_electrons(mol, atoms, &members)) {
                mark_aromatic(mol, atoms, bonds);
                changed = true;
            }
        }
    }

    for i in 0..rings.len() {
        for j in (i + 1)..rings.len() {
            let (atoms_a, bonds_a) = &rings[i];
            let (atoms_b, bonds_b) = &rings[j];
            if is_fully_aromatic(mol, bonds_a) || is_fully_aromatic(mol, bonds_b) {
                continue;
            }
            let shares_bond = bonds_a.iter().any(|b| bonds_b.contains(b));
            if !shares_bond {
                continue;
            }
            let members: HashSet<usize> = atoms_a.iter().chain(atoms_b).copied().collect();
            let union: Vec<usize> = members.iter().copied().collect();
            if is_huckel(pi_electrons(mol, &union, &members)) {
                mark_aromatic(mol, atoms_a, bonds_a);
                mark_aromatic(mol, atoms_b, bonds_b);
            }
        }
    }
}

fn is_fully_aromatic(mol: &Molecule, bonds: &[usize]) -> bool {
    bonds
        .iter()
        .all(|&b| mol.bond(b).order == BondOrder::Aromatic)
}

fn is_huckel(electrons: Option<u32>) -> bool {
    matches!(electrons, Some(e) if e >= 2 && (e - 2) % 4 == 0)
}

fn mark_aromatic(mol: &mut Molecule, atoms: &[usize], bonds: &[usize]) {
    for &a in atoms {
        mol.atom_mut(a).aromatic = true;
    }
    for &b in bonds {
        mol.set_bond_order(b, BondOrder::Aromatic);
    }
}

/// Counts the pi electrons a ring system would hold, or `None` when some member
/// cannot take part in a conjugated ring (sp3 centers, triple bonds, exocyclic C=C).
fn pi_electrons(mol: &Molecule, atoms: &[usize], members: &HashSet<usize>) -> Option<u32> {
    let mut total = 0;
    for &a in atoms {
        total += atom_contribution(mol, a, members)?;
    }
    Some(total)
}

fn atom_contribution(mol: &Molecule, idx: usize, members: &HashSet<usize>) -> Option<u32> {
    let atom = mol.atom(idx);
    let mut endocyclic_double = false;
    let mut exocyclic_double_to_heteroatom = false;
    let mut exocyclic_double_to_carbon = false;
    let mut has_aromatic_bond = false;

    for &(neighbor, bond) in mol.neighbors(idx) {
        match mol.bond(bond).order {
            BondOrder::Triple => return None,
            BondOrder::Double => {
                if members.contains(&neighbor) {
                    endocyclic_double = true;
                } else if matches!(mol.atom(neighbor).atomic_number, 7 | 8 | 16) {
                    exocyclic_double_to_heteroatom = true;
                } else {
                    exocyclic_double_to_carbon = true;
                }
            }
            BondOrder::Aromatic => has_aromatic_bond = true,
            BondOrder::Single => {}
        }
    }

    if endocyclic_double {
        return Some(1);
    }
    if exocyclic_double_to_heteroatom {
        return Some(0);
    }
    if exocyclic_double_to_carbon {
        return None;
    }

    let connections = mol.total_degree(idx);
    let lone_pair_donor = match (atom.atomic_number, atom.charge) {
        (7 | 15, 0) => connections == 3,
        (8 | 16 | 34 | 52, 0) => connections == 2,
        (6, -1) => true,
        _ => false,
    };

    if has_aromatic_bond || atom.aromatic {
        return Some(if lone_pair_donor { 2 } else { 1 });
    }
    if lone_pair_donor {
        return Some(2);
    }
    match (atom.atomic_number, atom.charge) {
        (6, 1) => Some(0),
        (5, 0) if connections == 3 => Some(0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::core::io::smiles::parse;
    use crate::core::models::bond::BondOrder;

    fn aromatic_atom_count(smiles: &str) -> usize {
        parse(smiles)
            .unwrap()
            .atoms()
            .iter()
            .filter(|a| a.aromatic)
            .count()
    }

    #[test]
    fn kekule_benzene_becomes_aromatic() {
        let mol = parse("C1=CC=CC=C1").unwrap();
        assert!(mol.atoms().iter().all(|a| a.aromatic));
        assert!(mol.bonds().iter().all(|b| b.order == BondOrder::Aromatic));
    }

    #[test]
    fn kekule_naphthalene_and_heteroaromatics_are_perceived() {
        assert_eq!(aromatic_atom_count("C1=CC=C2C=CC=CC2=C1"), 10);
        assert_eq!(aromatic_atom_count("C1=COC=C1"), 5);
        assert_eq!(aromatic_atom_count("C1=CNC=C1"), 5);
        assert_eq!(aromatic_atom_count("O=C1C=CC=CN1"), 6);
    }

    #[test]
    fn quinones_and_non_conjugated_rings_stay_aliphatic() {
        assert_eq!(aromatic_atom_count("O=C1C=CC(=O)C=C1"), 0);
        assert_eq!(aromatic_atom_count("C1=CCC=C1"), 0);
        assert_eq!(aromatic_atom_count("C1CCCCC1"), 0);
        assert_eq!(aromatic_atom_count("C1OC1C"), 0);
    }

    #[test]
    fn aspirin_ring_is_aromatic_but_substituents_are_not() {
        let mol = parse("CC(=O)OC1=CC=CC=C1C(=O)O").unwrap();
        assert_eq!(mol.atoms().iter().filter(|a| a.aromatic).count(), 6);
        let carbonyls = mol
            .bonds()
            .iter()
            .filter(|b| b.order == BondOrder::Double)
            .count();
        assert_eq!(carbonyls, 2);
    }

    #[test]
    fn biphenyl_linker_is_demoted_to_single() {
        let mol = parse("c1ccccc1c1ccccc1").unwrap();
        let singles = mol
            .bonds()
            .iter()
            .filter(|b| b.order == BondOrder::Single)
            .count();
        assert_eq!(singles, 1);
    }
}
