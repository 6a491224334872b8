use crate::core::models::molecule::Molecule;
use crate::core::smarts::SmartsPattern;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Catalog '{name}' contains no usable patterns")]
    Empty { name: String },
}

/// One named substructure alert.
#[derive(Debug, Clone)]
pub struct AlertEntry {
    pub name: String,
    pub smarts: String,
    pattern: SmartsPattern,
}

impl AlertEntry {
    pub fn pattern(&self) -> &SmartsPattern {
        &self.pattern
    }
}

#[derive(Debug, Deserialize)]
struct EntryRecord {
    name: String,
    smarts: String,
}

/// A named list of compiled substructure alerts.
#[derive(Debug, Clone)]
pub struct AlertCatalog {
    name: String,
    entries: Vec<AlertEntry>,
}

impl AlertCatalog {
    /// Compiles `(name, smarts)` pairs, skipping entries that fail to compile.
    ///
    /// Fails only when no entry survives.
    pub fn from_entries<N, S>(
        name: &str,
        entries: impl IntoIterator<Item = (N, S)>,
    ) -> Result<Self, CatalogError>
    where
        N: Into<String>,
        S: Into<String>,
    {
        let mut compiled = Vec::new();
        for (entry_name, smarts) in entries {
            let entry_name = entry_name.into();
            let smarts = smarts.into();
            match SmartsPattern::parse(&smarts) {
                Ok(pattern) => compiled.push(AlertEntry {
                    name: entry_name,
                    smarts,
                    pattern,
                }),
                Err(e) => warn!(
                    catalog = name,
                    entry = %entry_name,
                    error = %e,
                    "Skipping alert with invalid SMARTS"
                ),
            }
        }

        if compiled.is_empty() {
            return Err(CatalogError::Empty {
                name: name.to_string(),
            });
        }
        Ok(Self {
            name: name.to_string(),
            entries: compiled,
        })
    }

    /// Reads a catalog from a CSV file with `name` and `smarts` columns.
    pub fn load(name: &str, path: &Path) -> Result<Self, CatalogError> {
        let path_str = path.to_string_lossy().to_string();
        let file = std::fs::File::open(path).map_err(|e| CatalogError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

        let mut records = Vec::new();
        for result in reader.deserialize::<EntryRecord>() {
            let record = result.map_err(|e| CatalogError::Csv {
                path: path_str.clone(),
                source: e,
            })?;
            records.push((record.name, record.smarts));
        }
        Self::from_entries(name, records)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[AlertEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of catalog entries present in the molecule.
    pub fn count_matches(&self, mol: &Molecule) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.pattern.matches(mol))
            .count()
    }

    /// Names of the entries present in the molecule, in catalog order.
    pub fn matched_names(&self, mol: &Molecule) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.pattern.matches(mol))
            .map(|entry| entry.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::smiles::parse;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn invalid_entries_are_skipped() {
        let catalog =
            AlertCatalog::from_entries("test", [("epoxide", "C1OC1"), ("broken", "C((")]).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entries()[0].name, "epoxide");
    }

    #[test]
    fn catalog_without_usable_entries_is_rejected() {
        let result = AlertCatalog::from_entries("test", [("broken", "[C")]);
        assert!(matches!(result, Err(CatalogError::Empty { .. })));
    }

    #[test]
    fn counts_each_matching_entry_once() {
        let catalog = AlertCatalog::from_entries(
            "test",
            [("carbonyl", "C=O"), ("hydroxyl", "[OH]"), ("nitrile", "C#N")],
        )
        .unwrap();
        let acid = parse("OC(=O)CC(=O)O").unwrap();
        assert_eq!(catalog.count_matches(&acid), 2);
        assert_eq!(catalog.matched_names(&acid), vec!["carbonyl", "hydroxyl"]);
    }

    #[test]
    fn load_reads_name_and_smarts_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("alerts.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "name,smarts").unwrap();
        writeln!(file, "epoxide,C1OC1").unwrap();
        writeln!(file, "thiol,[SH]").unwrap();

        let catalog = AlertCatalog::load("custom", &path).unwrap();
        assert_eq!(catalog.name(), "custom");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.count_matches(&parse("CC1OC1").unwrap()), 1);
    }

    #[test]
    fn load_fails_for_missing_file() {
        let dir = tempdir().unwrap();
        let result = AlertCatalog::load("custom", &dir.path().join("missing.csv"));
        assert!(matches!(result, Err(CatalogError::Io { .. })));
    }

    #[test]
    fn load_fails_for_malformed_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("alerts.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "name,smarts").unwrap();
        writeln!(file, "only_one_column").unwrap();

        let result = AlertCatalog::load("custom", &path);
        assert!(matches!(result, Err(CatalogError::Csv { .. })));
    }
}
