use crate::core::models::bond::BondOrder;
use crate::core::models::molecule::Molecule;

const NITROGEN: u8 = 7;
const OXYGEN: u8 = 8;

/// Topological polar surface area (Ertl et al., 2000) over nitrogen and oxygen atoms.
pub fn topological_polar_surface_area(mol: &Molecule) -> f64 {
    (0..mol.atom_count())
        .map(|idx| match mol.atom(idx).atomic_number {
            NITROGEN => nitrogen_contribution(&Environment::of(mol, idx)),
            OXYGEN => oxygen_contribution(&Environment::of(mol, idx)),
            _ => 0.0,
        })
        .sum()
}

/// Bond counts around a polar atom, ignoring bonds to hydrogen.
struct Environment {
    neighbors: usize,
    hydrogens: usize,
    charge: i8,
    single: usize,
    double: usize,
    triple: usize,
    aromatic: usize,
    in_three_ring: bool,
}

impl Environment {
    fn of(mol: &Molecule, idx: usize) -> Self {
        let mut env = Self {
            neighbors: 0,
            hydrogens: mol.total_hydrogens(idx),
            charge: mol.atom(idx).charge,
            single: 0,
            double: 0,
            triple: 0,
            aromatic: 0,
            in_three_ring: mol.rings().is_atom_in_ring_of_size(idx, 3),
        };
        for &(neighbor, bond) in mol.neighbors(idx) {
            if mol.atom(neighbor).is_hydrogen() {
                continue;
            }
            env.neighbors += 1;
            match mol.bond(bond).order {
                BondOrder::Single => env.single += 1,
                BondOrder::Double => env.double += 1,
                BondOrder::Triple => env.triple += 1,
                BondOrder::Aromatic => env.aromatic += 1,
            }
        }
        env
    }

    fn is(&self, h: usize, charge: i8, single: usize, double: usize, triple: usize, aromatic: usize) -> bool {
        self.hydrogens == h
            && self.charge == charge
            && self.single == single
            && self.double == double
            && self.triple == triple
            && self.aromatic == aromatic
    }
}

fn nitrogen_contribution(e: &Environment) -> f64 {
    let value = match e.neighbors {
        1 => {
            if e.is(0, 0, 0, 0, 1, 0) {
                Some(23.79)
            } else if e.is(1, 0, 0, 1, 0, 0) {
                Some(23.85)
            } else if e.is(2, 0, 1, 0, 0, 0) {
                Some(26.02)
            } else if e.is(2, 1, 0, 1, 0, 0) {
                Some(25.59)
            } else if e.is(3, 1, 1, 0, 0, 0) {
                Some(27.64)
            } else {
                None
            }
        }
        2 => {
            if e.is(0, 0, 1, 1, 0, 0) {
                Some(12.36)
            } else if e.is(0, 0, 0, 1, 1, 0) {
                Some(13.60)
            } else if e.is(1, 0, 2, 0, 0, 0) {
                Some(if e.in_three_ring { 21.94 } else { 12.03 })
            } else if e.is(0, 0, 0, 0, 0, 2) {
                Some(12.89)
            } else if e.is(1, 0, 0, 0, 0, 2) {
                Some(15.79)
            } else if e.is(0, 1, 1, 0, 1, 0) {
                Some(4.36)
            } else if e.is(1, 1, 1, 1, 0, 0) {
                Some(13.97)
            } else if e.is(2, 1, 2, 0, 0, 0) {
                Some(16.61)
            } else if e.is(1, 1, 0, 0, 0, 2) {
                Some(14.14)
            } else {
                None
            }
        }
        3 => {
            if e.is(0, 0, 3, 0, 0, 0) {
                Some(if e.in_three_ring { 3.01 } else { 3.24 })
            } else if e.is(0, 0, 1, 2, 0, 0) {
                Some(11.68)
            } else if e.is(0, 0, 0, 0, 0, 3) {
                Some(4.41)
            } else if e.is(0, 0, 1, 0, 0, 2) {
                Some(4.93)
            } else if e.is(0, 0, 0, 1, 0, 2) {
                Some(8.39)
            } else if e.is(0, 1, 2, 1, 0, 0) {
                Some(3.01)
            } else if e.is(1, 1, 3, 0, 0, 0) {
                Some(4.44)
            } else if e.is(0, 1, 0, 0, 0, 3) {
                Some(4.10)
            } else if e.is(0, 1, 1, 0, 0, 2) {
                Some(3.88)
            } else {
                None
            }
        }
        4 if e.is(0, 1, 4, 0, 0, 0) => Some(0.0),
        _ => None,
    };
    value.unwrap_or_else(|| fallback(30.5, 8.2, e))
}

fn oxygen_contribution(e: &Environment) -> f64 {
    let value = match e.neighbors {
        1 => {
            if e.is(0, 0, 0, 1, 0, 0) {
                Some(17.07)
            } else if e.is(1, 0, 1, 0, 0, 0) {
                Some(20.23)
            } else if e.is(0, -1, 1, 0, 0, 0) {
                Some(23.06)
            } else {
                None
            }
        }
        2 => {
            if e.is(0, 0, 2, 0, 0, 0) {
                Some(if e.in_three_ring { 12.53 } else { 9.23 })
            } else if e.is(0, 0, 0, 0, 0, 2) {
                Some(13.14)
            } else {
                None
            }
        }
        _ => None,
    };
    value.unwrap_or_else(|| fallback(28.5, 8.6, e))
}

/// Generic estimate for environments outside the fragment table.
fn fallback(base: f64, per_neighbor: f64, e: &Environment) -> f64 {
    (base - per_neighbor * e.neighbors as f64 + 1.5 * e.hydrogens as f64).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::smiles::parse;

    fn tpsa(smiles: &str) -> f64 {
        topological_polar_surface_area(&parse(smiles).unwrap())
    }

    #[test]
    fn aspirin_matches_reference_value() {
        assert!((tpsa("CC(=O)OC1=CC=CC=C1C(=O)O") - 63.60).abs() < 1e-6);
    }

    #[test]
    fn common_polar_groups() {
        assert!((tpsa("CCO") - 20.23).abs() < 1e-6);
        assert!((tpsa("CCN") - 26.02).abs() < 1e-6);
        assert!((tpsa("c1ccncc1") - 12.89).abs() < 1e-6);
        assert!((tpsa("c1cc[nH]c1") - 15.79).abs() < 1e-6);
        assert!((tpsa("CC#N") - 23.79).abs() < 1e-6);
    }

    #[test]
    fn three_membered_rings_use_strained_values() {
        assert!((tpsa("C1OC1C") - 12.53).abs() < 1e-6);
        assert!((tpsa("C1NC1") - 21.94).abs() < 1e-6);
    }

    #[test]
    fn hydrocarbons_have_no_polar_surface() {
        assert_eq!(tpsa("CCCCCC"), 0.0);
        assert_eq!(tpsa("c1ccccc1Cl"), 0.0);
    }
}
