use crate::core::models::molecule::Molecule;
use crate::core::smarts::{SmartsError, SmartsPattern};

const DONOR_SMARTS: &str = "[N&!H0&v3,N&!H0&+1&v4,O&H1&+0,S&H1&+0,n&H1&+0]";

const ACCEPTOR_SMARTS: &str = "[$([O,S;H1;v2]-[!$(*=[O,N,P,S])]),$([O,S;H0;v2]),$([O,S;-]),\
$([N;v3;!$(N-*=!@[O,N,P,S])]),$([nH0,o,s;+0]),$([F])]";

const ROTATABLE_SMARTS: &str = "[!$(*#*)&!D1&!$(C(F)(F)F)&!$(C(Cl)(Cl)Cl)&!$(C(Br)(Br)Br)\
&!$(C([CH3])([CH3])[CH3])&!$([CD3](=[N,O,S])-!@[#7,O,S!D1])&!$([#7,O,S!D1]-!@[CD3]=[N,O,S])\
&!$([CD3](=[N+])-!@[#7!D1])&!$([#7!D1]-!@[CD3]=[N+])]-,:;!@[!$(*#*)&!D1&!$(C(F)(F)F)\
&!$(C(Cl)(Cl)Cl)&!$(C(Br)(Br)Br)&!$(C([CH3])([CH3])[CH3])]";

/// Hydrogen-bond donor/acceptor and rotatable-bond counters.
#[derive(Debug, Clone)]
pub struct LipinskiCounter {
    donors: SmartsPattern,
    acceptors: SmartsPattern,
    rotatable: SmartsPattern,
}

impl LipinskiCounter {
    pub fn new() -> Result<Self, SmartsError> {
        Ok(Self {
            donors: SmartsPattern::parse(DONOR_SMARTS)?,
            acceptors: SmartsPattern::parse(ACCEPTOR_SMARTS)?,
            rotatable: SmartsPattern::parse(ROTATABLE_SMARTS)?,
        })
    }

    pub fn h_donors(&self, mol: &Molecule) -> usize {
        self.donors.matching_atoms(mol).len()
    }

    pub fn h_acceptors(&self, mol: &Molecule) -> usize {
        self.acceptors.matching_atoms(mol).len()
    }

    /// Strict rotatable bonds: each bond counts once however many ways it embeds.
    pub fn rotatable_bonds(&self, mol: &Molecule) -> usize {
        self.rotatable.count_unique_matches(mol)
    }
}
