//! # Applicability Domain
//!
//! A read-only set of reference (training population) fingerprints, and the maximum
//! Tanimoto similarity of a query against it as a domain-applicability proxy.

use crate::core::fingerprint::{Fingerprint, FingerprintEngine, FingerprintParams};
use crate::core::io::smiles;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

const SMILES_COLUMN: &str = "smiles";

#[derive(Debug, Error)]
pub enum ReferenceSetError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Column '{column}' not found in '{path}'")]
    MissingColumn { path: String, column: &'static str },
}

#[derive(Debug, Clone)]
pub struct ReferenceSet {
    params: FingerprintParams,
    fingerprints: Vec<Fingerprint>,
    skipped: usize,
}

impl ReferenceSet {
    pub fn empty(params: FingerprintParams) -> Self {
        Self {
            params,
            fingerprints: Vec::new(),
            skipped: 0,
        }
    }

    /// Fingerprints every SMILES with `params`; unparseable entries are skipped.
    pub fn from_smiles<S: AsRef<str> + Sync>(entries: &[S], params: FingerprintParams) -> Self {
        let engine = FingerprintEngine::new(params);

        #[cfg(not(feature = "parallel"))]
        let iterator = entries.iter();

        #[cfg(feature = "parallel")]
        let iterator = entries.par_iter();

        let computed: Vec<Option<Fingerprint>> = iterator
            .map(|entry| {
                let text = entry.as_ref().trim();
                match smiles::parse(text) {
                    Ok(mol) => engine.try_compute(&mol).ok(),
                    Err(e) => {
                        debug!(smiles = text, error = %e, "Skipping reference entry");
                        None
                    }
                }
            })
            .collect();

        let skipped = computed.iter().filter(|fp| fp.is_none()).count();
        Self {
            params,
            fingerprints: computed.into_iter().flatten().collect(),
            skipped,
        }
    }

    /// Reads the `smiles` column of a CSV file; other columns are ignored.
    pub fn load(path: &Path, params: FingerprintParams) -> Result<Self, ReferenceSetError> {
        let path_str = path.to_string_lossy().to_string();
        let file = std::fs::File::open(path).map_err(|e| ReferenceSetError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        let mut reader = csv::Reader::from_reader(file);

        let headers = reader.headers().map_err(|e| ReferenceSetError::Csv {
            path: path_str.clone(),
            source: e,
        })?;
        let column = headers
            .iter()
            .position(|h| h.trim() == SMILES_COLUMN)
            .ok_or_else(|| ReferenceSetError::MissingColumn {
                path: path_str.clone(),
                column: SMILES_COLUMN,
            })?;

        let mut entries = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| ReferenceSetError::Csv {
                path: path_str.clone(),
                source: e,
            })?;
            entries.push(record.get(column).unwrap_or_default().to_string());
        }

        let set = Self::from_smiles(&entries, params);
        info!(
            path = %path_str,
            loaded = set.len(),
            skipped = set.skipped,
            "Reference fingerprints loaded"
        );
        Ok(set)
    }

    /// Like [`ReferenceSet::load`], but any failure yields an empty set.
    pub fn load_or_empty(path: &Path, params: FingerprintParams) -> Self {
        match Self::load(path, params) {
            Ok(set) => set,
            Err(e) => {
                warn!(error = %e, "Reference set unavailable; applicability scoring disabled");
                Self::empty(params)
            }
        }
    }

    pub fn params(&self) -> FingerprintParams {
        self.params
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Maximum Tanimoto similarity to any reference, rounded to 4 decimals.
    ///
    /// `None` for a missing query, an empty set, or a query of a different length.
    pub fn score(&self, query: Option<&Fingerprint>) -> Option<f64> {
        let query = query?;
        if self.fingerprints.is_empty() || query.len() != self.params.n_bits {
            return None;
        }
        let best = self
            .fingerprints
            .iter()
            .map(|reference| query.tanimoto(reference))
            .fold(0.0_f64, f64::max);
        Some((best * 10_000.0).round() / 10_000.0)
    }
}
