use super::bits::Fingerprint;
use crate::core::models::molecule::Molecule;
use std::collections::HashSet;

/// Folds `value` into `seed` (boost-style `hash_combine`).
fn hash_combine(seed: u32, value: u32) -> u32 {
    seed ^ value
        .wrapping_add(0x9e37_79b9)
        .wrapping_add(seed << 6)
        .wrapping_add(seed >> 2)
}

fn hash_values(values: &[u32]) -> u32 {
    values.iter().fold(0, |seed, &v| hash_combine(seed, v))
}

/// Radius-0 identifier of an atom.
fn initial_identifier(mol: &Molecule, idx: usize) -> u32 {
    let atom = mol.atom(idx);
    hash_values(&[
        atom.atomic_number as u32,
        mol.heavy_degree(idx) as u32,
        mol.total_hydrogens(idx) as u32,
        atom.charge as i32 as u32,
        atom.isotope.map(u32::from).unwrap_or(0),
        mol.rings().is_atom_in_ring(idx) as u32,
    ])
}

/// Circular (ECFP-style) identifiers for every atom environment up to `radius`.
///
/// Environments covering a bond set that has already been emitted are dropped, so
/// each distinct substructure contributes one identifier.
pub fn circular_identifiers(mol: &Molecule, radius: u32) -> Vec<u32> {
    let heavy: Vec<usize> = (0..mol.atom_count())
        .filter(|&idx| !mol.atom(idx).is_hydrogen() || mol.heavy_degree(idx) == 0)
        .collect();

    let mut ids: Vec<u32> = (0..mol.atom_count())
        .map(|idx| initial_identifier(mol, idx))
        .collect();
    let mut emitted: Vec<u32> = heavy.iter().map(|&idx| ids[idx]).collect();

    let mut environments: Vec<Vec<usize>> = vec![Vec::new(); mol.atom_count()];
    let mut seen: HashSet<Vec<usize>> = HashSet::new();
    let mut active = vec![true; mol.atom_count()];

    for iteration in 1..=radius {
        let mut next_ids = ids.clone();
        let mut next_envs = environments.clone();
        let mut candidates: Vec<(Vec<usize>, u32, usize)> = Vec::new();

        for &idx in &heavy {
            let mut neighborhood: Vec<(u32, u32)> = Vec::new();
            let mut env = environments[idx].clone();
            for &(neighbor, bond) in mol.neighbors(idx) {
                if mol.atom(neighbor).is_hydrogen() {
                    continue;
                }
                neighborhood.push((mol.bond(bond).order.code() as u32, ids[neighbor]));
                env.push(bond);
                env.extend_from_slice(&environments[neighbor]);
            }
            if neighborhood.is_empty() {
                continue;
            }
            neighborhood.sort_unstable();
            env.sort_unstable();
            env.dedup();

            let mut values = vec![iteration, ids[idx]];
            for (order, id) in neighborhood {
                values.push(order);
                values.push(id);
            }
            let id = hash_values(&values);
            next_ids[idx] = id;
            if active[idx] {
                candidates.push((env.clone(), id, idx));
            }
            next_envs[idx] = env;
        }

        candidates.sort_unstable();
        for (env, id, idx) in candidates {
            if seen.contains(&env) {
                active[idx] = false;
                continue;
            }
            seen.insert(env);
            emitted.push(id);
        }

        ids = next_ids;
        environments = next_envs;
    }

    emitted
}

/// Folds circular identifiers into an `n_bits` fingerprint.
pub fn morgan_fingerprint(mol: &Molecule, radius: u32, n_bits: usize) -> Fingerprint {
    Fingerprint::from_on_bits(
        n_bits,
        circular_identifiers(mol, radius)
            .into_iter()
            .map(|id| id as usize % n_bits.max(1)),
    )
}
