//! # Structural Alerts Module
//!
//! Flags substructures associated with assay interference (PAINS) or undesirable
//! reactivity and toxicity (Brenk).
//!
//! ## Overview
//!
//! - [`catalog`] - Named lists of compiled SMARTS alerts, built in or read from CSV
//! - [`builtin`] - The curated PAINS and Brenk catalogs shipped with the library
//!
//! [`AlertScanner`] owns both catalogs. Each catalog is loaded once; a catalog that
//! cannot be loaded stays unavailable and reports zero hits for every molecule.

pub mod builtin;
pub mod catalog;

use crate::core::models::molecule::Molecule;
use catalog::{AlertCatalog, CatalogError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Hits per catalog for one molecule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertCounts {
    pub pains: u32,
    pub brenk: u32,
}

#[derive(Debug, Clone, Default)]
pub struct AlertScanner {
    pains: Option<AlertCatalog>,
    brenk: Option<AlertCatalog>,
}

impl AlertScanner {
    pub fn new(pains: Option<AlertCatalog>, brenk: Option<AlertCatalog>) -> Self {
        Self { pains, brenk }
    }

    /// Scanner over the built-in catalogs.
    pub fn builtin() -> Self {
        Self {
            pains: available(builtin::PAINS_NAME, builtin::pains()),
            brenk: available(builtin::BRENK_NAME, builtin::brenk()),
        }
    }

    /// Loads each catalog from its CSV path when one is given, otherwise uses the
    /// built-in list. Failures leave that catalog unavailable.
    pub fn load(pains_path: Option<&Path>, brenk_path: Option<&Path>) -> Self {
        let pains = match pains_path {
            Some(path) => AlertCatalog::load(builtin::PAINS_NAME, path),
            None => builtin::pains(),
        };
        let brenk = match brenk_path {
            Some(path) => AlertCatalog::load(builtin::BRENK_NAME, path),
            None => builtin::brenk(),
        };
        Self {
            pains: available(builtin::PAINS_NAME, pains),
            brenk: available(builtin::BRENK_NAME, brenk),
        }
    }

    pub fn pains(&self) -> Option<&AlertCatalog> {
        self.pains.as_ref()
    }

    pub fn brenk(&self) -> Option<&AlertCatalog> {
        self.brenk.as_ref()
    }

    pub fn scan(&self, mol: Option<&Molecule>) -> AlertCounts {
        let Some(mol) = mol else {
            return AlertCounts::default();
        };
        AlertCounts {
            pains: hits(self.pains.as_ref(), mol),
            brenk: hits(self.brenk.as_ref(), mol),
        }
    }
}

fn available(name: &str, loaded: Result<AlertCatalog, CatalogError>) -> Option<AlertCatalog> {
    match loaded {
        Ok(catalog) => {
            info!(catalog = name, entries = catalog.len(), "Alert catalog loaded");
            Some(catalog)
        }
        Err(e) => {
            warn!(catalog = name, error = %e, "Alert catalog unavailable; its counts will be 0");
            None
        }
    }
}

fn hits(catalog: Option<&AlertCatalog>, mol: &Molecule) -> u32 {
    catalog
        .map(|c| u32::try_from(c.count_matches(mol)).unwrap_or(u32::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::smiles::parse;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn missing_structure_has_no_alerts() {
        assert_eq!(AlertScanner::builtin().scan(None), AlertCounts::default());
    }

    #[test]
    fn builtin_scanner_counts_both_catalogs() {
        let scanner = AlertScanner::builtin();
        let counts = scanner.scan(Some(&parse("O=C1C=CC(=O)C=C1").unwrap()));
        assert!(counts.pains > 0);
        assert!(counts.brenk > 0);
    }

    #[test]
    fn unreadable_catalog_degrades_to_zero() {
        let dir = tempdir().unwrap();
        let scanner = AlertScanner::load(Some(&dir.path().join("missing.csv")), None);
        assert!(scanner.pains().is_none());
        assert!(scanner.brenk().is_some());

        let counts = scanner.scan(Some(&parse("O=C1C=CC(=O)C=C1").unwrap()));
        assert_eq!(counts.pains, 0);
        assert!(counts.brenk > 0);
    }

    #[test]
    fn custom_catalog_replaces_builtin() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("brenk.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "name,smarts").unwrap();
        writeln!(file, "hydroxyl,[OX2H]").unwrap();

        let scanner = AlertScanner::load(None, Some(&path));
        assert_eq!(scanner.brenk().map(AlertCatalog::len), Some(1));
        let counts = scanner.scan(Some(&parse("CCO").unwrap()));
        assert_eq!(counts.brenk, 1);
    }
}
