//! Built-in alert catalogs.
//!
//! PAINS (Baell & Holloway, 2010) is shipped as its three frequency families, merged
//! into one catalog. Brenk (Brenk et al., 2008) lists unwanted reactive, toxic or
//! metabolically unstable groups.

use super::catalog::{AlertCatalog, CatalogError};

pub const PAINS_NAME: &str = "PAINS";
pub const BRENK_NAME: &str = "Brenk";

pub const PAINS_A: &[(&str, &str)] = &[
    ("quinone_A", "[#6]1(=[#8])[#6]=,:[#6][#6](=[#8])[#6]=,:[#6]1"),
    ("ene_one_ene_A", "[#6]=[#6;!a][#6](=[#8])[#6;!a]=[#6]"),
    ("ene_rhod_A", "[#6]=[#6]1[#16][#6](=[#16,#8])[#7][#6]1=[#8]"),
    ("catechol_A", "c([OH])c[OH]"),
    ("hzone_phenol_A", "[OH]c1ccccc1[#6]=[#7][#7]"),
    ("azo_A", "c[#7]=[#7]c"),
    ("anil_di_alk_A", "c[#7X3;!$([#7][#6]=[#8])]([CX4])[CX4]"),
    ("mannich_A", "[OH]c1ccccc1[CH2][#7X3;!$([#7][#6]=[#8])]"),
    ("indol_3yl_alk", "c1ccc2c(c1)c(c[nH]2)[CH2][#7X3]"),
    ("ene_cyano_A", "[#6]=[#6]([#6]#[#7])[#6]#[#7]"),
];

pub const PAINS_B: &[(&str, &str)] = &[
    ("hydroquinone_A", "[OH]c1ccc([OH])cc1"),
    ("quinone_B", "[#8]=[#6]1[#6]=,:[#6][#6](=[#8])c2ccccc12"),
    ("thio_ketone", "[#6][#6](=[#16])[#6]"),
    ("hzone_anil", "c[#7H][#7]=[#6]"),
    ("rhod_sat_A", "[#16]1[#6](=[#16])[#7][#6](=[#8])[#6]1"),
    ("imine_one_A", "[#6][#6](=[#8])[#6]=[#7][#6]"),
    ("cyano_ene_amine_A", "[#7X3][#6]=[#6][#6]#[#7]"),
    ("thiophene_amino_Aa", "[NH2]c1sccc1[#6]=[#8]"),
];

pub const PAINS_C: &[(&str, &str)] = &[
    ("anthranil_acid_A", "[OH][#6](=[#8])c1ccccc1[NH]c"),
    ("phenol_sulfonamide", "[OH]c1ccc(cc1)[NH][#16](=[#8])=[#8]"),
    ("keto_keto_beta_A", "[#6](=[#8])[CH2][#6](=[#8])[#6](=[#8])"),
    ("ene_five_one_A", "[#6]=[#6]1[#6](=[#8])[#6]=,:[#6][#6]1=[#8]"),
    ("amino_acridine_A", "[NH2]c1c2ccccc2nc2ccccc12"),
    ("dyes_coumarin_A", "[#7X3]c1ccc2ccc(=O)oc2c1"),
];

pub const BRENK: &[(&str, &str)] = &[
    ("2-halo_pyridine", "n1c([F,Cl,Br,I])cccc1"),
    ("acid_halide", "C(=O)[Cl,Br,I,F]"),
    ("aldehyde", "[CX3H1](=O)[#6]"),
    ("aliphatic_long_chain", "[R0;D2][R0;D2][R0;D2][R0;D2][R0;D2][R0;D2][R0;D2]"),
    ("alkyl_halide", "[CX4][Cl,Br,I]"),
    ("aniline", "c[NH2]"),
    ("azide", "N=[N+]=[N-]"),
    ("azo_group", "N=N"),
    ("aziridine", "C1NC1"),
    ("beta-keto/anhydride", "[C,c](=O)[CX4,CR0X3,O][C,c](=O)"),
    ("catechol", "c([OH])c([OH])"),
    ("diketo_group", "[C,c](=O)[C,c](=O)"),
    ("disulphide", "SS"),
    ("enamine", "[CX3;!$(C=O)]=[CX3][NX3;!$(NC=O)]"),
    ("epoxide", "C1OC1"),
    ("heavy_metal", "[Hg,Fe,As,Sb,Zn,Se,Te,B,Si,Na,Ca,Ge,Ag,Mg,K,Ba,Sr,Be,Ti,Mo,Mn,Ru,Pd,Ni,Cu,Au,Cd,Al,Ga,Sn,Rh,Tl,Bi,Li,Pb]"),
    ("hydrazine", "N[NH2]"),
    ("hydroxamic_acid", "C(=O)N[OH]"),
    ("isocyanate", "N=C=O"),
    ("isothiocyanate", "N=C=S"),
    ("Michael_acceptor_1", "[C;H1](=[C,N])C=O"),
    ("Michael_acceptor_2", "C=!@CC=[O,S]"),
    ("N_oxide", "[NX2,nX3][OX1]"),
    ("nitro_group", "[N+](=O)[O-]"),
    ("Oxygen-nitrogen_single_bond", "[OR0,NR0][OR0,NR0]"),
    ("peroxide", "OO"),
    ("phenol_ester", "c1ccccc1OC(=O)[#6]"),
    ("phosphor", "P"),
    ("polyene", "[CR0]=[CR0][CR0]=[CR0]"),
    ("quaternary_nitrogen", "[s,S,c,C,n,N,o,O]~[nX3+,NX4+](~[s,S,c,C,n,N])~[s,S,c,C,n,N]"),
    ("stilbene", "c1ccccc1C=Cc1ccccc1"),
    ("sulfonic_acid", "S(=O)(=O)[OH]"),
    ("thiol", "[SH]"),
    ("thiocarbonyl_group", "[C,c]=S"),
    ("three-membered_heterocycle", "*1[O,S,N]*1"),
    ("triflate", "OS(=O)(=O)C(F)(F)F"),
    ("triple_bond", "C#C"),
];

/// PAINS families A, B and C as a single catalog.
pub fn pains() -> Result<AlertCatalog, CatalogError> {
    AlertCatalog::from_entries(
        PAINS_NAME,
        PAINS_A
            .iter()
            .chain(PAINS_B)
            .chain(PAINS_C)
            .map(|&(name, smarts)| (name, smarts)),
    )
}

pub fn brenk() -> Result<AlertCatalog, CatalogError> {
    AlertCatalog::from_entries(BRENK_NAME, BRENK.iter().map(|&(name, smarts)| (name, smarts)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::smiles::parse;
    use crate::core::smarts::SmartsPattern;

    #[test]
    fn every_builtin_pattern_compiles() {
        for (name, smarts) in PAINS_A.iter().chain(PAINS_B).chain(PAINS_C).chain(BRENK) {
            assert!(SmartsPattern::parse(smarts).is_ok(), "{name}: {smarts}");
        }
        assert_eq!(
            pains().unwrap().len(),
            PAINS_A.len() + PAINS_B.len() + PAINS_C.len()
        );
        assert_eq!(brenk().unwrap().len(), BRENK.len());
    }

    #[test]
    fn benzoquinone_triggers_both_catalogs() {
        let mol = parse("O=C1C=CC(=O)C=C1").unwrap();
        let pains_hits = pains().unwrap().matched_names(&mol).len();
        let brenk_hits = brenk().unwrap().matched_names(&mol).len();
        assert!(pains_hits > 0);
        assert!(brenk_hits > 0);
    }

    #[test]
    fn propylene_oxide_is_brenk_only() {
        let mol = parse("C1OC1C").unwrap();
        assert_eq!(pains().unwrap().count_matches(&mol), 0);
        assert!(brenk().unwrap().matched_names(&mol).contains(&"epoxide"));
    }

    #[test]
    fn aspirin_is_pains_clean_but_flags_phenol_ester() {
        let mol = parse("CC(=O)OC1=CC=CC=C1C(=O)O").unwrap();
        assert_eq!(pains().unwrap().count_matches(&mol), 0);
        assert!(brenk().unwrap().matched_names(&mol).contains(&"phenol_ester"));
    }

    #[test]
    fn catechol_is_flagged() {
        let mol = parse("Oc1ccccc1O").unwrap();
        assert!(pains().unwrap().matched_names(&mol).contains(&"catechol_A"));
    }
}
