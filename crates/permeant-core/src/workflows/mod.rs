//! # Workflows Module
//!
//! The user-facing entry point of the library: a scoring service that turns SMILES
//! strings into blood-brain-barrier permeability predictions.
//!
//! ## Overview
//!
//! [`score::ScoringPipeline`] owns the classifier, alert catalogs and reference
//! fingerprints. It loads them once, then scores molecules without further I/O. Each call
//! runs structure parsing, descriptors, alerts, hashing, fingerprinting, classification and
//! applicability scoring in that order, and always yields a
//! [`PredictionResult`](crate::engine::result::PredictionResult).
//!
//! ## Architecture
//!
//! - **Scoring Workflow** ([`score`]) - Single and batch scoring with progress reporting

pub mod score;
