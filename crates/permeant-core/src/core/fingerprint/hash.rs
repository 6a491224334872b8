use super::FingerprintError;
use crate::core::models::molecule::Molecule;
use sha2::{Digest, Sha256};
use std::fmt::Write;

/// Lowercase hex SHA-256 digest of the canonical SMILES.
///
/// Independent of fingerprint parameters; chemically identical inputs share a hash.
pub fn content_hash(mol: &Molecule) -> Result<String, FingerprintError> {
    let canonical = mol.canonical_smiles();
    if canonical.is_empty() {
        return Err(FingerprintError::EmptyStructure);
    }
    Ok(hex_digest(canonical.as_bytes()))
}

fn hex_digest(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::smiles::parse;

    #[test]
    fn digest_of_known_input() {
        assert_eq!(
            hex_digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn equivalent_spellings_share_a_hash() {
        let a = content_hash(&parse("CCO").unwrap()).unwrap();
        let b = content_hash(&parse("OCC").unwrap()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn different_molecules_have_different_hashes() {
        let a = content_hash(&parse("CCO").unwrap()).unwrap();
        let b = content_hash(&parse("CCN").unwrap()).unwrap();
        assert_ne!(a, b);
    }
}
