//! # Fingerprint Module
//!
//! Fixed-length circular (Morgan/ECFP-style) fingerprints and structure content hashes.
//!
//! ## Overview
//!
//! - [`bits`] - The [`Fingerprint`] bit vector with dense, sparse and Tanimoto views
//! - [`morgan`] - Circular environment identifiers folded into `n_bits` positions
//! - [`hash`] - SHA-256 content hash of the canonical SMILES
//!
//! Fingerprints are a pure function of the structure and [`FingerprintParams`]; the
//! same inputs always produce bit-identical output.

pub mod bits;
pub mod hash;
pub mod morgan;

pub use bits::Fingerprint;
pub use hash::content_hash;

use crate::core::models::molecule::Molecule;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_RADIUS: u32 = 2;
pub const DEFAULT_N_BITS: usize = 2048;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FingerprintError {
    #[error("Fingerprint length must be greater than zero")]
    ZeroLength,
    #[error("Structure has no atoms")]
    EmptyStructure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FingerprintParams {
    pub radius: u32,
    pub n_bits: usize,
}

impl Default for FingerprintParams {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            n_bits: DEFAULT_N_BITS,
        }
    }
}

impl FingerprintParams {
    pub fn validate(&self) -> Result<(), FingerprintError> {
        if self.n_bits == 0 {
            Err(FingerprintError::ZeroLength)
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FingerprintEngine {
    params: FingerprintParams,
}

impl FingerprintEngine {
    pub fn new(params: FingerprintParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> FingerprintParams {
        self.params
    }

    pub fn try_compute(&self, mol: &Molecule) -> Result<Fingerprint, FingerprintError> {
        self.params.validate()?;
        if mol.is_empty() {
            return Err(FingerprintError::EmptyStructure);
        }
        Ok(morgan::morgan_fingerprint(
            mol,
            self.params.radius,
            self.params.n_bits,
        ))
    }

    /// `None` when there is no structure or generation fails; failures are logged.
    pub fn compute(&self, mol: Option<&Molecule>) -> Option<Fingerprint> {
        let mol = mol?;
        match self.try_compute(mol) {
            Ok(fp) => Some(fp),
            Err(e) => {
                warn!(error = %e, "Fingerprint generation failed");
                None
            }
        }
    }
}
