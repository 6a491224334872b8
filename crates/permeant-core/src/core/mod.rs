//! # Core Module
//!
//! Stateless chemistry underneath the scoring pipeline: everything needed to go from a
//! SMILES string to descriptors, alert counts, a fingerprint, a classifier probability
//! and an applicability score.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Element table, atoms, bonds, rings and aromaticity
//! - **File I/O** ([`io`]) - SMILES reading and canonical SMILES writing
//! - **Substructure Search** ([`smarts`]) - SMARTS compilation and subgraph matching
//! - **Properties** ([`descriptors`]) - Physicochemical descriptors and drug-likeness rules
//! - **Structural Alerts** ([`alerts`]) - PAINS and Brenk catalogs
//! - **Fingerprints** ([`fingerprint`]) - Morgan bit vectors and content hashes
//! - **Applicability Domain** ([`applicability`]) - Similarity to the training population
//! - **Prediction** ([`classifier`]) - Random-forest permeability model
//!
//! Every type here is immutable once built and safe to share across threads.

pub mod alerts;
pub mod applicability;
pub mod classifier;
pub mod descriptors;
pub mod fingerprint;
pub mod io;
pub mod models;
pub mod smarts;
