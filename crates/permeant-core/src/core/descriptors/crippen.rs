use crate::core::models::bond::BondOrder;
use crate::core::models::molecule::Molecule;
use crate::core::smarts::{SmartsError, SmartsPattern};

/// Wildman–Crippen heavy-atom types: label, SMARTS, logP and molar refractivity
/// contributions. Earlier rows take precedence.
const HEAVY_ATOM_TYPES: &[(&str, &str, f64, f64)] = &[
    ("C1", "[CH4]", 0.1441, 2.503),
    ("C1", "[CH3]C", 0.1441, 2.503),
    ("C1", "[CH2](C)C", 0.1441, 2.503),
    ("C2", "[CH](C)(C)C", 0.0, 2.433),
    ("C2", "[C](C)(C)(C)C", 0.0, 2.433),
    ("C3", "[CH3][N,O,P,S,F,Cl,Br,I]", -0.2035, 2.753),
    ("C3", "[CH2X4]([N,O,P,S,F,Cl,Br,I])[A;!#1]", -0.2035, 2.753),
    ("C4", "[CH1X4]([N,O,P,S,F,Cl,Br,I])[A;!#1][A;!#1]", -0.2051, 2.731),
    ("C4", "[CH0X4]([N,O,P,S,F,Cl,Br,I])[A;!#1]([A;!#1])[A;!#1]", -0.2051, 2.731),
    ("C5", "[C]=[!C;A;!#1]", -0.2783, 5.007),
    ("C6", "[CH2]=C", 0.1551, 3.513),
    ("C6", "[CH1](=C)[A;!#1]", 0.1551, 3.513),
    ("C6", "[CH0](=C)([A;!#1])[A;!#1]", 0.1551, 3.513),
    ("C6", "[C](=C)=C", 0.1551, 3.513),
    ("C7", "[CX2]#[A]", 0.0017, 3.888),
    ("C8", "[CH3]c", 0.08452, 2.464),
    ("C9", "[CH3]a", -0.1444, 2.412),
    ("C10", "[CH2X4]a", -0.0516, 2.488),
    ("C11", "[CHX4]a", 0.1193, 2.582),
    ("C12", "[CH0X4]a", -0.0967, 2.576),
    ("C13", "[cH0]-[A;!C;!N;!O;!S;!F;!Cl;!Br;!I;!#1]", -0.5443, 4.041),
    ("C14", "[c][#9]", 0.0, 3.257),
    ("C15", "[c][#17]", 0.245, 3.564),
    ("C16", "[c][#35]", 0.198, 3.18),
    ("C17", "[c][#53]", 0.0, 3.104),
    ("C18", "[cH]", 0.1581, 3.35),
    ("C19", "[c](:a)(:a):a", 0.2955, 4.346),
    ("C20", "[c](:a)(:a)-a", 0.2713, 3.904),
    ("C21", "[c](:a)(:a)-C", 0.136, 3.509),
    ("C22", "[c](:a)(:a)-N", 0.4619, 4.067),
    ("C23", "[c](:a)(:a)-O", 0.5437, 3.853),
    ("C24", "[c](:a)(:a)-S", 0.1893, 2.673),
    ("C25", "[c](:a)(:a)=[C,N,O]", -0.8186, 3.135),
    ("C26", "[C](=C)(a)[A;!#1]", 0.264, 4.305),
    ("C26", "[C](=C)(c)a", 0.264, 4.305),
    ("C26", "[CH1](=C)a", 0.264, 4.305),
    ("C26", "[C]=c", 0.264, 4.305),
    ("C27", "[CX4][A;!C;!N;!O;!P;!S;!F;!Cl;!Br;!I;!#1]", 0.2148, 2.693),
    ("CS", "[#6]", 0.08129, 3.243),
    ("N1", "[NH2+0][A;!#1]", -1.019, 2.262),
    ("N2", "[NH+0]([A;!#1])[A;!#1]", -0.7096, 2.173),
    ("N3", "[NH2+0]a", -1.027, 2.827),
    ("N4", "[NH+0](a)[A;!#1]", -0.5188, 3.0),
    ("N5", "[NH+0]=[A;!#1]", 0.08387, 1.757),
    ("N5", "[N+0](=[A;!#1])[A;!#1]", 0.08387, 1.757),
    ("N6", "[N+0]([A;!#1])([A;!#1])[A;!#1]", 0.1836, 2.428),
    ("N7", "[N+0](a)([A;!#1])[A;!#1]", -0.3187, 1.839),
    ("N8", "[N+0](a)(a)[A;!#1]", -0.4458, 2.819),
    ("N8", "[N+0](a)(a)a", -0.4458, 2.819),
    ("N9", "[N+0]#[A;!#1]", 0.01508, 1.725),
    ("N10", "[NH3,NH2,NH;+,+2,+3]", -1.95, 0.0),
    ("N11", "[n+0]", -0.3239, 2.202),
    ("N12", "[n;+,+2,+3]", -1.119, 0.0),
    ("N13", "[NH0;+,+2,+3]([A;!#1])([A;!#1])([A;!#1])[A;!#1]", -0.3396, 0.2604),
    ("N13", "[NH0;+,+2,+3](=[A])([A;!#1])[!#1]", -0.3396, 0.2604),
    ("N13", "[NH0;+,+2,+3](=[#6])=[#7]", -0.3396, 0.2604),
    ("N14", "[N;+,+2,+3]#[A]", 0.2887, 3.359),
    ("N14", "[N;-,-2,-3]", 0.2887, 3.359),
    ("N14", "[N;+,+2,+3](=[N;-,-2,-3])=N", 0.2887, 3.359),
    ("NS", "[#7]", -0.4806, 2.134),
    ("O1", "[o]", 0.1552, 1.08),
    ("O2", "[OH,OH2]", -0.2893, 0.8238),
    ("O3", "[O]([A;!#1])[A;!#1]", -0.0684, 1.085),
    ("O4", "[O](a)[A;!#1]", -0.4195, 1.182),
    ("O4", "[O](a)a", -0.4195, 1.182),
    ("O5", "[O]=[#7,#8]", 0.0335, 3.367),
    ("O5", "[OX1;-;$([OX1;-][#7])]", 0.0335, 3.367),
    ("O6", "[OX1;-;$([OX1;-][#16])]", -0.3339, 0.7774),
    ("O6", "[O]=[#16]", -0.3339, 0.7774),
    ("O12", "[O-]C(=O)", -1.326, 0.0),
    ("O7", "[OX1;-;$([OX1;-][!#7;!#16])]", -1.189, 0.0),
    ("O8", "[O]=c", 0.1788, 3.135),
    ("O9", "[O]=[CH]C", -0.1526, 0.0),
    ("O9", "[O]=C(C)C", -0.1526, 0.0),
    ("O9", "[O]=C(C)[A;!#1]", -0.1526, 0.0),
    ("O9", "[O]=[CH]N", -0.1526, 0.0),
    ("O9", "[O]=[CH]O", -0.1526, 0.0),
    ("O9", "[O]=[CH2]", -0.1526, 0.0),
    ("O9", "[O]=[CX2]=O", -0.1526, 0.0),
    ("O10", "[O]=[CH]c", 0.1129, 0.2215),
    ("O10", "[O]=C([C,c])[a;!#1]", 0.1129, 0.2215),
    ("O10", "[O]=C(c)[A;!#1]", 0.1129, 0.2215),
    ("O11", "[O]=C([!#1;!#6])[!#1;!#6]", 0.4833, 0.389),
    ("OS", "[#8]", -0.1188, 0.6865),
    ("F", "[#9-0]", 0.4202, 1.108),
    ("Cl", "[#17-0]", 0.6895, 5.853),
    ("Br", "[#35-0]", 0.8456, 8.927),
    ("I", "[#53-0]", 0.8857, 14.02),
    ("Hal", "[#9,#17,#35,#53;-]", -2.996, 0.0),
    ("Hal", "[#53;+,+2,+3]", -2.996, 0.0),
    ("Hal", "[+;#3,#11,#19,#37,#55]", -2.996, 0.0),
    ("P", "[#15]", 0.8612, 6.92),
    ("S2", "[S;-,-2,-3,-4,+1,+2,+3,+5,+6]", -0.0024, 7.365),
    ("S1", "[S-0]", 0.6482, 7.591),
    ("S3", "[s]", 0.6237, 6.691),
];

/// Hydrogen types, keyed by the environment of the heavy atom carrying them.
#[derive(Debug, Clone, Copy, PartialEq)]
enum HydrogenType {
    /// H1: on carbon (hydrocarbon).
    Hydrocarbon,
    /// H2: alcohol, phenol and hydrogens on other heteroatoms.
    Alcohol,
    /// H3: amine, or hydroxyl on nitrogen.
    Amine,
    /// H4: acid or enol.
    Acid,
    /// HS: anything else, such as water.
    Other,
}

impl HydrogenType {
    fn contributions(self) -> (f64, f64) {
        match self {
            Self::Hydrocarbon => (0.123, 1.057),
            Self::Alcohol => (-0.2677, 1.395),
            Self::Amine => (0.2142, 0.9627),
            Self::Acid => (0.298, 1.805),
            Self::Other => (0.1125, 1.112),
        }
    }
}

/// Wildman–Crippen logP and molar refractivity contributions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrippenContribs {
    pub logp: f64,
    pub molar_refractivity: f64,
}

/// Compiled Wildman–Crippen atom typing rules.
#[derive(Debug, Clone)]
pub struct CrippenModel {
    types: Vec<AtomType>,
}

#[derive(Debug, Clone)]
struct AtomType {
    label: &'static str,
    pattern: SmartsPattern,
    logp: f64,
    mr: f64,
}

impl CrippenModel {
    pub fn new() -> Result<Self, SmartsError> {
        let types = HEAVY_ATOM_TYPES
            .iter()
            .map(|&(label, smarts, logp, mr)| {
                Ok(AtomType {
                    label,
                    pattern: SmartsPattern::parse(smarts)?,
                    logp,
                    mr,
                })
            })
            .collect::<Result<Vec<_>, SmartsError>>()?;
        Ok(Self { types })
    }

    /// Type label assigned to each atom, `None` for hydrogens and untyped atoms.
    pub fn atom_types(&self, mol: &Molecule) -> Vec<Option<&'static str>> {
        self.assign(mol)
            .into_iter()
            .map(|t| t.map(|t| t.label))
            .collect()
    }

    pub fn compute(&self, mol: &Molecule) -> CrippenContribs {
        let assigned = self.assign(mol);
        let mut logp = 0.0;
        let mut mr = 0.0;

        for (idx, atom) in mol.atoms().iter().enumerate() {
            if atom.is_hydrogen() {
                let carrier = mol.neighbors(idx).first().map(|&(n, _)| n);
                let (h_logp, h_mr) = match carrier {
                    Some(heavy) => hydrogen_type(mol, heavy).contributions(),
                    None => HydrogenType::Other.contributions(),
                };
                logp += h_logp;
                mr += h_mr;
                continue;
            }

            if let Some(t) = assigned[idx] {
                logp += t.logp;
                mr += t.mr;
            }

            if atom.hydrogens > 0 {
                let (h_logp, h_mr) = hydrogen_type(mol, idx).contributions();
                logp += h_logp * atom.hydrogens as f64;
                mr += h_mr * atom.hydrogens as f64;
            }
        }

        CrippenContribs {
            logp,
            molar_refractivity: mr,
        }
    }

    fn assign(&self, mol: &Molecule) -> Vec<Option<&AtomType>> {
        let mut assigned: Vec<Option<&AtomType>> = vec![None; mol.atom_count()];
        let mut remaining = mol
            .atoms()
            .iter()
            .filter(|a| !a.is_hydrogen())
            .count();

        for t in &self.types {
            if remaining == 0 {
                break;
            }
            for idx in t.pattern.matching_atoms(mol) {
                if assigned[idx].is_none() && !mol.atom(idx).is_hydrogen() {
                    assigned[idx] = Some(t);
                    remaining -= 1;
                }
            }
        }
        assigned
    }
}

fn hydrogen_type(mol: &Molecule, heavy: usize) -> HydrogenType {
    match mol.atom(heavy).atomic_number {
        6 => HydrogenType::Hydrocarbon,
        7 => HydrogenType::Amine,
        8 => oxygen_hydrogen_type(mol, heavy),
        _ => HydrogenType::Alcohol,
    }
}

fn oxygen_hydrogen_type(mol: &Molecule, oxygen: usize) -> HydrogenType {
    let Some(&(partner, _)) = mol
        .neighbors(oxygen)
        .iter()
        .find(|&&(n, _)| !mol.atom(n).is_hydrogen())
    else {
        return HydrogenType::Other;
    };
    let atom = mol.atom(partner);
    match atom.atomic_number {
        6 if atom.aromatic => HydrogenType::Alcohol,
        6 => {
            let saturated = mol.total_degree(partner) == 4
                && mol
                    .neighbors(partner)
                    .iter()
                    .all(|&(_, b)| mol.bond(b).order == BondOrder::Single);
            if saturated {
                return HydrogenType::Alcohol;
            }
            let doubly_bonded = mol.neighbors(partner).iter().any(|&(n, b)| {
                mol.bond(b).order == BondOrder::Double
                    && matches!(mol.atom(n).atomic_number, 6 | 7 | 8 | 16)
            });
            if doubly_bonded {
                HydrogenType::Acid
            } else {
                HydrogenType::Other
            }
        }
        7 => HydrogenType::Amine,
        8 | 16 => HydrogenType::Acid,
        _ => HydrogenType::Alcohol,
    }
}
