use super::DescriptorError;
use crate::core::models::bond::BondOrder;
use crate::core::models::element;
use crate::core::models::molecule::Molecule;
use std::fmt::Write;

const HYDROGEN: u8 = 1;
const CARBON: u8 = 6;

/// Average molecular weight including attached hydrogens.
pub fn molecular_weight(mol: &Molecule) -> Result<f64, DescriptorError> {
    sum_masses(mol, |e| e.average_mass)
}

/// Monoisotopic mass using the most abundant isotope of every element.
pub fn exact_mass(mol: &Molecule) -> Result<f64, DescriptorError> {
    sum_masses(mol, |e| e.monoisotopic_mass)
}

fn sum_masses(
    mol: &Molecule,
    mass: impl Fn(&element::Element) -> f64,
) -> Result<f64, DescriptorError> {
    let mut total = 0.0;
    for (&z, &count) in &mol.element_counts() {
        let e = element::by_number(z).ok_or(DescriptorError::MissingElementData(z))?;
        total += mass(e) * count as f64;
    }
    Ok(total)
}

/// Molecular formula in Hill order, with the net charge appended (`C4H12N+`).
pub fn molecular_formula(mol: &Molecule) -> Result<String, DescriptorError> {
    let counts = mol.element_counts();
    let mut symbols: Vec<(&'static str, usize)> = Vec::with_capacity(counts.len());
    for (&z, &count) in &counts {
        let e = element::by_number(z).ok_or(DescriptorError::MissingElementData(z))?;
        symbols.push((e.symbol, count));
    }

    let has_carbon = counts.contains_key(&CARBON);
    symbols.sort_by(|a, b| {
        let rank = |s: &str| match s {
            "C" if has_carbon => 0,
            "H" if has_carbon => 1,
            _ => 2,
        };
        rank(a.0).cmp(&rank(b.0)).then(a.0.cmp(b.0))
    });

    let mut formula = String::new();
    for (symbol, count) in symbols {
        formula.push_str(symbol);
        if count > 1 {
            let _ = write!(formula, "{count}");
        }
    }

    match mol.formal_charge() {
        0 => {}
        1 => formula.push('+'),
        -1 => formula.push('-'),
        c if c > 0 => {
            let _ = write!(formula, "+{c}");
        }
        c => {
            let _ = write!(formula, "-{}", -c);
        }
    }
    Ok(formula)
}

/// Fraction of carbons that are sp3 (non-aromatic with only single bonds).
pub fn fraction_csp3(mol: &Molecule) -> f64 {
    let mut carbons = 0usize;
    let mut sp3 = 0usize;
    for (idx, atom) in mol.atoms().iter().enumerate() {
        if !atom.is_carbon() {
            continue;
        }
        carbons += 1;
        let saturated = mol
            .neighbors(idx)
            .iter()
            .all(|&(_, b)| mol.bond(b).order == BondOrder::Single);
        if !atom.aromatic && saturated {
            sp3 += 1;
        }
    }
    if carbons == 0 {
        0.0
    } else {
        sp3 as f64 / carbons as f64
    }
}

/// Atoms heavier than hydrogen; wildcard atoms do not count.
pub fn heavy_atom_count(mol: &Molecule) -> usize {
    mol.atoms()
        .iter()
        .filter(|a| a.atomic_number > HYDROGEN)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::smiles::parse;

    #[test]
    fn aspirin_composition() {
        let mol = parse("CC(=O)OC1=CC=CC=C1C(=O)O").unwrap();
        assert!((molecular_weight(&mol).unwrap() - 180.159).abs() < 0.01);
        assert!((exact_mass(&mol).unwrap() - 180.042).abs() < 0.01);
        assert_eq!(molecular_formula(&mol).unwrap(), "C9H8O4");
        assert_eq!(heavy_atom_count(&mol), 13);
        assert!((fraction_csp3(&mol) - 1.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn formula_without_carbon_is_alphabetical() {
        let water = parse("O").unwrap();
        assert_eq!(molecular_formula(&water).unwrap(), "H2O");
        let salt = parse("[Na+].[Cl-]").unwrap();
        assert_eq!(molecular_formula(&salt).unwrap(), "ClNa");
    }

    #[test]
    fn formula_carries_net_charge() {
        let ammonium = parse("C[N+](C)(C)C").unwrap();
        assert_eq!(molecular_formula(&ammonium).unwrap(), "C4H12N+");
        let sulfate = parse("[O-]S(=O)(=O)[O-]").unwrap();
        assert_eq!(molecular_formula(&sulfate).unwrap(), "O4S-2");
    }

    #[test]
    fn csp3_fraction_of_carbon_free_molecule_is_zero() {
        assert_eq!(fraction_csp3(&parse("N").unwrap()), 0.0);
        assert_eq!(fraction_csp3(&parse("CCCC").unwrap()), 1.0);
    }
}
