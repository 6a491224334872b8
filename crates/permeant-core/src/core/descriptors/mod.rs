//! # Descriptors Module
//!
//! Physicochemical descriptors and rule-based drug-likeness flags computed from a parsed
//! [`Molecule`].
//!
//! ## Overview
//!
//! - **Composition** ([`composition`]) - Molecular weight, exact mass, Hill formula, sp3 fraction
//! - **Lipophilicity** ([`crippen`]) - Wildman–Crippen logP and molar refractivity
//! - **Polarity** ([`tpsa`]) - Ertl topological polar surface area
//! - **Counts** ([`lipinski`]) - Hydrogen-bond donors/acceptors and strict rotatable bonds
//! - **Rules** ([`rules`]) - ESOL solubility, GI absorption and the Rule of Five
//!
//! [`DescriptorEngine`] compiles the SMARTS-based typing tables once and is then shared
//! read-only across scoring calls. A missing structure, or a failure anywhere in the
//! computation, yields [`DescriptorSet::default`] rather than an error.

pub mod composition;
pub mod crippen;
pub mod lipinski;
pub mod rules;
pub mod tpsa;

use crate::core::models::molecule::Molecule;
use crate::core::smarts::SmartsError;
use crippen::CrippenModel;
use lipinski::LipinskiCounter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub use rules::GiAbsorption;

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("No element data for atomic number {0}")]
    MissingElementData(u8),
    #[error("Descriptor '{0}' evaluated to a non-finite value")]
    NonFinite(&'static str),
    #[error("Count for '{0}' does not fit the descriptor range")]
    CountOverflow(&'static str),
}

/// Every descriptor reported for one molecule. Fields are `None` when no structure was
/// available or the computation failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptorSet {
    pub mw: Option<f64>,
    pub logp: Option<f64>,
    pub tpsa: Option<f64>,
    pub rot_bonds: Option<u32>,
    pub h_acceptors: Option<u32>,
    pub h_donors: Option<u32>,
    pub frac_csp3: Option<f64>,
    pub molar_refractivity: Option<f64>,
    pub log_s_esol: Option<f64>,
    pub gi_absorption: GiAbsorption,
    pub lipinski_passes: Option<bool>,
    pub pains_alerts: u32,
    pub brenk_alerts: u32,
    pub heavy_atoms: Option<u32>,
    pub mol_formula: Option<String>,
    pub exact_mw: Option<f64>,
    pub formal_charge: Option<i32>,
    pub num_rings: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct DescriptorEngine {
    crippen: CrippenModel,
    lipinski: LipinskiCounter,
}

impl DescriptorEngine {
    pub fn new() -> Result<Self, SmartsError> {
        Ok(Self {
            crippen: CrippenModel::new()?,
            lipinski: LipinskiCounter::new()?,
        })
    }

    /// Computes the full descriptor set. Alert counts are left at zero; they are filled in
    /// by the alert scanner.
    pub fn compute(&self, mol: Option<&Molecule>) -> DescriptorSet {
        let Some(mol) = mol else {
            return DescriptorSet::default();
        };
        match self.try_compute(mol) {
            Ok(set) => set,
            Err(e) => {
                warn!(error = %e, "Descriptor computation failed; reporting empty descriptors");
                DescriptorSet::default()
            }
        }
    }

    pub fn try_compute(&self, mol: &Molecule) -> Result<DescriptorSet, DescriptorError> {
        let mw = finite("mw", composition::molecular_weight(mol)?)?;
        let exact_mw = finite("exact_mw", composition::exact_mass(mol)?)?;
        let crippen = self.crippen.compute(mol);
        let logp = finite("logp", crippen.logp)?;
        let molar_refractivity = finite("molar_refractivity", crippen.molar_refractivity)?;
        let tpsa = finite("tpsa", tpsa::topological_polar_surface_area(mol))?;
        let frac_csp3 = composition::fraction_csp3(mol);

        let rot_bonds = count("rot_bonds", self.lipinski.rotatable_bonds(mol))?;
        let h_donors = count("h_donors", self.lipinski.h_donors(mol))?;
        let h_acceptors = count("h_acceptors", self.lipinski.h_acceptors(mol))?;
        let heavy_atoms = count("heavy_atoms", composition::heavy_atom_count(mol))?;
        let num_rings = count("num_rings", mol.rings().ring_count())?;

        Ok(DescriptorSet {
            mw: Some(mw),
            logp: Some(logp),
            tpsa: Some(tpsa),
            rot_bonds: Some(rot_bonds),
            h_acceptors: Some(h_acceptors),
            h_donors: Some(h_donors),
            frac_csp3: Some(frac_csp3),
            molar_refractivity: Some(molar_refractivity),
            log_s_esol: rules::esol_log_s(Some(logp), Some(mw), Some(rot_bonds), Some(frac_csp3)),
            gi_absorption: rules::gi_absorption(Some(tpsa), Some(rot_bonds)),
            lipinski_passes: rules::lipinski_passes(
                Some(h_donors),
                Some(h_acceptors),
                Some(mw),
                Some(logp),
            ),
            pains_alerts: 0,
            brenk_alerts: 0,
            heavy_atoms: Some(heavy_atoms),
            mol_formula: Some(composition::molecular_formula(mol)?),
            exact_mw: Some(exact_mw),
            formal_charge: Some(mol.formal_charge()),
            num_rings: Some(num_rings),
        })
    }
}

fn finite(name: &'static str, value: f64) -> Result<f64, DescriptorError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DescriptorError::NonFinite(name))
    }
}

fn count(name: &'static str, value: usize) -> Result<u32, DescriptorError> {
    u32::try_from(value).map_err(|_| DescriptorError::CountOverflow(name))
}
